//! Keep-awake capability
//!
//! A dimming or sleeping display would corrupt the optical signal, so the
//! transmitter holds a wake lock for the length of a transmission.

use core::fmt;

/// Errors that can occur when requesting a wake lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeLockError {
    /// Platform has no wake lock facility
    Unsupported,
    /// Platform refused the request
    Denied,
}

impl fmt::Display for WakeLockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WakeLockError::Unsupported => write!(f, "wake lock not supported"),
            WakeLockError::Denied => write!(f, "wake lock request denied"),
        }
    }
}

/// Trait for keeping the display awake
///
/// Implementations must not block: platforms with an asynchronous request
/// should start it and return, reporting failures they can detect up front.
pub trait WakeLock {
    /// Request that the display stays on
    fn acquire(&mut self) -> Result<(), WakeLockError>;

    /// Drop a previously acquired request
    ///
    /// Only called after a successful `acquire`, and once per acquisition.
    fn release(&mut self);
}

/// Wake lock for platforms without one
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWakeLock;

impl WakeLock for NoWakeLock {
    fn acquire(&mut self) -> Result<(), WakeLockError> {
        Err(WakeLockError::Unsupported)
    }

    fn release(&mut self) {}
}
