//! Cooperative cancellation for long container reads and writes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag checked between parts while a container is opened or written.
///
/// Clones observe the same flag, so a caller can hand one clone to a worker
/// and keep the other to abort it. A cancelled write never leaves a file at
/// the destination.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a flag that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every operation holding a clone of this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
