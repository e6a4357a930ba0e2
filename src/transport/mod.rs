//! Byte transports used by the content cache: HTTP downloads and local
//! filesystem staging.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Local filesystem helpers for staging and publishing cache files.
pub mod fs;
/// Blocking HTTP downloads.
pub mod http;

/// Cloneable flag a caller can raise to abort in-flight downloads and extractions.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the "not cancelled" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once [`cancel`](Self::cancel) was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
