//! Per-client sequence id allocation.

use std::sync::{Mutex, MutexGuard};

/// Acquire the counter guard, ignoring poisoning.
///
/// The guarded state is a single integer with no invariant a panicking
/// holder could break.
fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Monotonically increasing call identifier.
///
/// The counter is the only client state shared across call sites, so it is
/// the only thing guarded. It wraps from `i32::MAX` to `i32::MIN`.
#[derive(Debug, Default)]
pub struct SequenceAllocator {
    last: Mutex<i32>,
}

impl SequenceAllocator {
    /// Creates an allocator whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator that last handed out `last`.
    pub fn starting_at(last: i32) -> Self {
        Self {
            last: Mutex::new(last),
        }
    }

    /// Increments the counter and returns the new value.
    pub fn next_id(&self) -> i32 {
        let mut last = lock_ignore_poison(&self.last);
        *last = last.wrapping_add(1);
        *last
    }

    /// Most recently allocated id (0 before the first call).
    pub fn last(&self) -> i32 {
        *lock_ignore_poison(&self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn ids_strictly_increase() {
        let seq = SequenceAllocator::new();
        assert_eq!(seq.last(), 0);
        assert_eq!(seq.next_id(), 1);
        assert_eq!(seq.next_id(), 2);
        assert_eq!(seq.next_id(), 3);
        assert_eq!(seq.last(), 3);
    }

    #[test]
    fn wraps_on_overflow() {
        let seq = SequenceAllocator::starting_at(i32::MAX - 1);
        assert_eq!(seq.next_id(), i32::MAX);
        assert_eq!(seq.next_id(), i32::MIN);
        assert_eq!(seq.next_id(), i32::MIN + 1);
    }

    #[test]
    fn concurrent_allocation_never_duplicates() {
        let seq = Arc::new(SequenceAllocator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let seq = Arc::clone(&seq);
                thread::spawn(move || (0..500).map(|_| seq.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 4000);
        assert_eq!(seq.last(), 4000);
    }
}
