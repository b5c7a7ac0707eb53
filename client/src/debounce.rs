//! Search-input debouncing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Collapses a burst of calls into the trailing one, bounding request volume
/// from rapid typing before a search string folds into the query key.
pub struct Debouncer {
    delay: Duration,
    epoch: AtomicU64,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            epoch: AtomicU64::new(0),
        }
    }

    /// Wait out the debounce window. Returns `true` only for the caller that
    /// is still the latest when the window closes; superseded callers should
    /// drop their pending work.
    pub async fn settle(&self) -> bool {
        let turn = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        self.epoch.load(Ordering::SeqCst) == turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_caller_settles() {
        let debouncer = Debouncer::default();
        let (first, second) = tokio::join!(debouncer.settle(), debouncer.settle());
        assert!(!first);
        assert!(second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_calls_each_settle() {
        let debouncer = Debouncer::default();
        assert!(debouncer.settle().await);
        assert!(debouncer.settle().await);
    }
}
