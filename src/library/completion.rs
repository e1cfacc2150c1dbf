//! Fan-in barrier for the extraction phase.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};

/// Counts finished decode attempts against the number of files found.
///
/// The total is fixed when the tracker is created, before any decode is
/// started. Success and failure both count. The increment and the
/// comparison happen in one atomic step, so the tracker can be shared
/// between threads and still reports completion exactly once.
#[derive(Debug)]
pub struct CompletionTracker {
    total: usize,
    completed: AtomicUsize,
}

impl CompletionTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    #[cfg(test)]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire).min(self.total)
    }

    /// Record one finished decode.
    ///
    /// Returns `true` only for the call that accounts for the last file.
    pub fn record_completion(&self) -> bool {
        let previous = self.completed.fetch_add(1, Ordering::AcqRel);
        if previous >= self.total {
            tracing::warn!(total = self.total, "Completion recorded past the file count");
            return false;
        }
        previous + 1 == self.total
    }

    /// True once every file has reported. Trivially true for zero files.
    pub fn is_complete(&self) -> bool {
        self.completed.load(Ordering::Acquire) >= self.total
    }

    /// Pass the barrier. Consumes the tracker so the caller can only
    /// finalize once.
    pub fn release(self) -> Result<()> {
        let completed = self.completed.into_inner();
        if completed == self.total {
            Ok(())
        } else {
            Err(Error::Incomplete {
                completed,
                total: self.total,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_zero_files_is_complete() {
        let tracker = CompletionTracker::new(0);
        assert!(tracker.is_complete());
        assert!(tracker.release().is_ok());
    }

    #[test]
    fn test_triggers_on_last_completion() {
        let tracker = CompletionTracker::new(3);
        assert!(!tracker.record_completion());
        assert!(!tracker.record_completion());
        assert!(!tracker.is_complete());
        assert!(tracker.record_completion());
        assert!(tracker.is_complete());
        assert_eq!(tracker.completed(), 3);
    }

    #[test]
    fn test_extra_completion_does_not_retrigger() {
        let tracker = CompletionTracker::new(1);
        assert!(tracker.record_completion());
        assert!(!tracker.record_completion());
        assert_eq!(tracker.completed(), 1);
    }

    #[test]
    fn test_release_before_complete_fails() {
        let tracker = CompletionTracker::new(2);
        tracker.record_completion();
        match tracker.release() {
            Err(Error::Incomplete { completed, total }) => {
                assert_eq!(completed, 1);
                assert_eq!(total, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_concurrent_completions_trigger_once() {
        let total = 64;
        let tracker = Arc::new(CompletionTracker::new(total));
        let handles: Vec<_> = (0..total)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || tracker.record_completion())
            })
            .collect();

        let triggers = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&fired| fired)
            .count();
        assert_eq!(triggers, 1);
        assert!(tracker.is_complete());
    }

    proptest! {
        #[test]
        fn prop_fires_exactly_once_after_n(total in 0usize..200) {
            let tracker = CompletionTracker::new(total);
            let mut fired_at = Vec::new();
            for i in 0..total {
                if tracker.record_completion() {
                    fired_at.push(i + 1);
                }
            }
            if total == 0 {
                prop_assert!(fired_at.is_empty());
            } else {
                prop_assert_eq!(fired_at, vec![total]);
            }
            prop_assert!(tracker.is_complete());
            prop_assert!(tracker.release().is_ok());
        }
    }
}
