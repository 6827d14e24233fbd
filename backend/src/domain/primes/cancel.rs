//! Cooperative cancellation for long scans.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag polled by the scanner between segments.
///
/// Clones observe the same flag. Raising it is sticky.
///
/// # Examples
/// ```
/// use sieve::domain::primes::CancelFlag;
///
/// let flag = CancelFlag::new();
/// let observer = flag.clone();
/// flag.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a flag that is not yet raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the flag has been raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Raises the wrapped flag when dropped, unless disarmed first.
///
/// Async callers hold one across the await on a blocking lookup: if the
/// awaiting future is dropped (the client went away), the worker stops at its
/// next segment boundary.
#[derive(Debug)]
pub struct CancelOnDrop {
    flag: CancelFlag,
    armed: bool,
}

impl CancelOnDrop {
    /// Arm a guard over `flag`.
    #[must_use]
    pub fn new(flag: CancelFlag) -> Self {
        Self { flag, armed: true }
    }

    /// Let the guard drop without raising the flag.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.flag.cancel();
        }
    }
}
