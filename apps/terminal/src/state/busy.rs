//! # Busy Flag
//!
//! Rejects a second submission while a remote call is still in flight.
//!
//! ```text
//! submit_text("2 bread")  ──► try_acquire() = Some(guard) ──► classifier…
//! submit_text("milk")     ──► try_acquire() = None        ──► Busy error
//!                                  guard dropped ──► flag cleared
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    busy: Arc<AtomicBool>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the flag busy, or returns `None` if it already is.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Clears the flag when dropped.
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
