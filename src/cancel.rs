//! Cooperative cancellation shared between the caller and a running render.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flag raised by UI or lifecycle code to abandon an in-flight sweep.
///
/// Clones share the same flag. The pipeline polls it between segments and
/// returns what it has so far; cancelling is never an error.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Calling it again has no further effect.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
