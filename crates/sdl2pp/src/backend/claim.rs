//! Exclusive ownership of a process-global native library

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};

/// One holder's claim on a process-wide flag.
///
/// At most one claim over the same flag is held at a time. Releasing a claim
/// that is not held does nothing, so it never frees another holder's flag.
#[derive(Debug)]
pub(crate) struct ProcessClaim {
    flag: &'static AtomicBool,
    held: Cell<bool>,
}

impl ProcessClaim {
    pub(crate) const fn new(flag: &'static AtomicBool) -> Self {
        Self {
            flag,
            held: Cell::new(false),
        }
    }

    pub(crate) fn is_held(&self) -> bool {
        self.held.get()
    }

    /// Take the flag, or keep it if already held. `false` when another
    /// holder owns it.
    pub(crate) fn acquire(&self) -> bool {
        if self.held.get() {
            return true;
        }
        let won = self
            .flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        self.held.set(won);
        won
    }

    pub(crate) fn release(&self) {
        if self.held.replace(false) {
            self.flag.store(false, Ordering::Release);
        }
    }
}

impl Drop for ProcessClaim {
    fn drop(&mut self) {
        self.release();
    }
}
