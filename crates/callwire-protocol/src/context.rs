//! Ambient per-call context.
//!
//! A [`CallContext`] travels with every call. It carries the metadata headers
//! the caller wants propagated and a cancellation/deadline signal. The client
//! only reads headers from it; the signal is honored by channel
//! implementations inside their blocking operations.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::{ProtocolError, ProtocolResult};

/// Headers, cancellation and deadline for a single call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    headers: HashMap<String, String>,
    write_header_keys: Vec<String>,
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl CallContext {
    /// Creates an empty context with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a header value without marking it for propagation.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Builder: append `key` to the ordered write-header list.
    pub fn propagate_header(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !self.write_header_keys.contains(&key) {
            self.write_header_keys.push(key);
        }
        self
    }

    /// Builder: set a header value and mark it for propagation.
    pub fn with_write_header(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.with_header(key.clone(), value).propagate_header(key)
    }

    /// Builder: set an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Builder: set a deadline relative to now.
    ///
    /// A timeout too large to represent leaves the context without a deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    /// Keys whose values should be written as outbound headers, in order.
    pub fn write_header_keys(&self) -> &[String] {
        &self.write_header_keys
    }

    /// Current value for a header key.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    /// Returns the deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns a handle that can cancel this context from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    /// Returns true once the context was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fails once the cancellation or deadline signal has fired.
    pub fn check(&self) -> ProtocolResult<()> {
        if self.is_cancelled() {
            return Err(ProtocolError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ProtocolError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

/// Cloneable handle that fires a context's cancellation signal.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Cancels every context sharing this signal.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_header_keys_keep_order() {
        let ctx = CallContext::new()
            .with_write_header("trace-id", "abc")
            .propagate_header("tenant")
            .with_write_header("user", "bob")
            .propagate_header("trace-id");

        assert_eq!(ctx.write_header_keys(), ["trace-id", "tenant", "user"]);
        assert_eq!(ctx.header("trace-id"), Some("abc"));
        assert_eq!(ctx.header("tenant"), None);
    }

    #[test]
    fn with_header_does_not_propagate() {
        let ctx = CallContext::new().with_header("local", "1");
        assert!(ctx.write_header_keys().is_empty());
        assert_eq!(ctx.header("local"), Some("1"));
    }

    #[test]
    fn cancel_handle_fires_signal() {
        let ctx = CallContext::new();
        assert!(ctx.check().is_ok());

        let handle = ctx.cancel_handle();
        let copy = ctx.clone();
        handle.cancel();

        assert!(ctx.is_cancelled());
        assert!(matches!(copy.check(), Err(ProtocolError::Cancelled)));
    }

    #[test]
    fn past_deadline_fails_check() {
        let ctx = CallContext::new().with_deadline(Instant::now());
        assert!(matches!(ctx.check(), Err(ProtocolError::DeadlineExceeded)));

        let ctx = CallContext::new().with_timeout(Duration::from_secs(60));
        assert!(ctx.check().is_ok());
        assert!(ctx.deadline().is_some());
    }

    #[test]
    fn unrepresentable_timeout_means_no_deadline() {
        let ctx = CallContext::new().with_timeout(Duration::MAX);
        assert_eq!(ctx.deadline(), None);
        assert!(ctx.check().is_ok());
    }
}
