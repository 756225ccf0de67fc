//! Cooperative cancellation
//!
//! Waits inside the sequencer are sliced, and the cancellation source is
//! polled between slices and before every energizing write.

use core::sync::atomic::{AtomicBool, Ordering};

/// Source of a cancellation request
pub trait Cancellation {
    /// Check if cancellation has been requested
    fn is_cancelled(&self) -> bool;
}

impl<C: Cancellation + ?Sized> Cancellation for &C {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Cancellation that never fires
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Cancellation for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Cancellation flag that can be raised from another thread or an
/// interrupt handler
#[derive(Debug, Default)]
pub struct CancelFlag {
    raised: AtomicBool,
}

impl CancelFlag {
    /// Create a flag in the lowered state
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.raised.store(true, Ordering::Release);
    }
}

impl Cancellation for CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());

        flag.cancel();
        assert!(flag.is_cancelled());
        assert!((&flag).is_cancelled());

        // Stays raised
        flag.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn test_never_cancel() {
        assert!(!NeverCancel.is_cancelled());
    }
}
