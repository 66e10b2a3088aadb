//! Platform abstraction traits
//!
//! These traits define the interface between the transmitter and the
//! platform it runs on.

pub mod wake_lock;

pub use wake_lock::{NoWakeLock, WakeLock, WakeLockError};
