//! Timed lamp transmission
//!
//! A `TransmissionSession` walks one light sequence bit by bit; the
//! `Transmitter` owns at most one session together with the lamp state,
//! progress and wake lock.

pub mod session;
pub mod transmitter;

pub use session::{SessionStep, TransmissionSession};
pub use transmitter::{SignalLevel, TransmissionState, TransmitError, Transmitter, TxEvent};
