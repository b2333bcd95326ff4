use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::CompletionError;

/// Whether a catalog read may go to the database or must be answered from
/// the local metadata cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadScope {
    #[default]
    Live,
    CacheOnly,
}

/// Carried through every catalog call. Cancellation is cooperative: the
/// engine checks the flag between calls and bails with
/// [`CompletionError::Canceled`].
#[derive(Debug, Clone, Default)]
pub struct ProgressMonitor {
    canceled: Arc<AtomicBool>,
    scope: ReadScope,
}

impl ProgressMonitor {
    pub fn live() -> Self {
        ProgressMonitor::default()
    }

    pub fn cache_only() -> Self {
        ProgressMonitor {
            canceled: Arc::new(AtomicBool::new(false)),
            scope: ReadScope::CacheOnly,
        }
    }

    pub fn with_flag(flag: Arc<AtomicBool>, scope: ReadScope) -> Self {
        ProgressMonitor {
            canceled: flag,
            scope,
        }
    }

    /// The same cancellation flag, demoted to cache-only reads.
    pub fn cache_only_view(&self) -> Self {
        ProgressMonitor {
            canceled: Arc::clone(&self.canceled),
            scope: ReadScope::CacheOnly,
        }
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Relaxed)
    }

    pub fn check_canceled(&self) -> Result<(), CompletionError> {
        if self.is_canceled() {
            Err(CompletionError::Canceled)
        } else {
            Ok(())
        }
    }

    pub fn is_cache_only(&self) -> bool {
        self.scope == ReadScope::CacheOnly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_shared_with_cache_view() {
        let monitor = ProgressMonitor::live();
        let view = monitor.cache_only_view();
        assert!(view.is_cache_only());
        assert!(!monitor.is_cache_only());

        monitor.cancel();
        assert!(view.is_canceled());
        assert!(view.check_canceled().is_err());
    }
}
