//! Lamp transmitter
//!
//! Drives one transmission at a time from an external refresh tick and
//! exposes what the display needs to draw: lamp level and progress.
//!
//! State flow: `Idle → Sending → Completed`, or `Sending → Idle` on cancel.
//! `Completed` accepts a new `start` just like `Idle`.

use core::fmt;

use vlcfg_protocol::LightSequence;

use super::session::{SessionStep, TransmissionSession};
use crate::config::{TimingError, TransmitterConfig};
use crate::traits::{WakeLock, WakeLockError};

/// Transmitter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmissionState {
    /// Nothing to send
    Idle,
    /// A sequence is being sent
    Sending,
    /// The last sequence was sent completely
    Completed,
}

/// Terminal events reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxEvent {
    /// Every bit was sent
    Completed,
    /// The caller stopped the transmission
    Cancelled,
}

/// What the lamp region should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalLevel {
    /// Not transmitting (neutral gray)
    Idle,
    /// Bit 0
    Dark,
    /// Bit 1
    Lit,
}

impl From<bool> for SignalLevel {
    fn from(level: bool) -> Self {
        if level {
            SignalLevel::Lit
        } else {
            SignalLevel::Dark
        }
    }
}

/// Errors that can occur when starting a transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitError {
    /// A transmission is already in progress
    AlreadySending,
    /// The sequence has no commands
    EmptySequence,
    /// Timing configuration is unusable
    InvalidTiming(TimingError),
}

impl fmt::Display for TransmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransmitError::AlreadySending => write!(f, "transmission already in progress"),
            TransmitError::EmptySequence => write!(f, "nothing to transmit"),
            TransmitError::InvalidTiming(err) => write!(f, "invalid timing: {}", err),
        }
    }
}

/// Timed lamp transmitter
///
/// `tick` is meant to be called once per display refresh and never blocks.
pub struct Transmitter<L: WakeLock> {
    config: TransmitterConfig,
    wake_lock: L,
    session: Option<TransmissionSession>,
    state: TransmissionState,
    signal: SignalLevel,
    progress: f32,
    wake_lock_held: bool,
    wake_lock_result: Option<Result<(), WakeLockError>>,
}

impl<L: WakeLock> Transmitter<L> {
    /// Create an idle transmitter
    pub fn new(config: TransmitterConfig, wake_lock: L) -> Result<Self, TransmitError> {
        config.validate().map_err(TransmitError::InvalidTiming)?;
        Ok(Self {
            config,
            wake_lock,
            session: None,
            state: TransmissionState::Idle,
            signal: SignalLevel::Idle,
            progress: 0.0,
            wake_lock_held: false,
            wake_lock_result: None,
        })
    }

    /// Get current state
    pub fn state(&self) -> TransmissionState {
        self.state
    }

    /// Fraction of the sequence sent, 0.0 to 1.0
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Progress in whole percent
    pub fn progress_percent(&self) -> u8 {
        (self.progress * 100.0) as u8
    }

    /// Current lamp level
    pub fn signal(&self) -> SignalLevel {
        self.signal
    }

    /// Timing in use
    pub fn config(&self) -> &TransmitterConfig {
        &self.config
    }

    /// Session in flight, if any
    pub fn session(&self) -> Option<&TransmissionSession> {
        self.session.as_ref()
    }

    /// True while the wake lock is held
    pub fn wake_lock_held(&self) -> bool {
        self.wake_lock_held
    }

    /// Outcome of the most recent wake lock request
    pub fn wake_lock_result(&self) -> Option<Result<(), WakeLockError>> {
        self.wake_lock_result
    }

    /// Access the wake lock implementation
    pub fn wake_lock(&self) -> &L {
        &self.wake_lock
    }

    /// Start sending `sequence`
    ///
    /// The first bit is committed by the first `tick` at or after
    /// `now_ms + lead_in_ms`.
    pub fn start(&mut self, sequence: LightSequence, now_ms: u64) -> Result<(), TransmitError> {
        if self.state == TransmissionState::Sending {
            return Err(TransmitError::AlreadySending);
        }
        if sequence.is_empty() {
            return Err(TransmitError::EmptySequence);
        }

        let bits = sequence.bit_count();
        let air_time_ms = sequence.duration_ms(self.config.bit_period_ms);
        self.session = Some(TransmissionSession::new(sequence, now_ms, &self.config));
        self.state = TransmissionState::Sending;
        self.signal = SignalLevel::Idle;
        self.progress = 0.0;
        log_info!("Transmission started: {} bits, {} ms", bits, air_time_ms);

        self.acquire_wake_lock();
        Ok(())
    }

    /// Advance the transmission
    ///
    /// Returns `Some(TxEvent::Completed)` when the final bit is committed.
    pub fn tick(&mut self, now_ms: u64) -> Option<TxEvent> {
        let session = self.session.as_mut()?;

        match session.step(now_ms) {
            SessionStep::Wait => None,
            SessionStep::Commit { level, progress } => {
                self.signal = level.into();
                self.progress = progress;
                None
            }
            SessionStep::Finished { .. } => {
                self.finish();
                Some(TxEvent::Completed)
            }
        }
    }

    /// Stop the current transmission
    ///
    /// Returns `Some(TxEvent::Cancelled)` if a transmission was stopped and
    /// `None` if there was nothing to cancel.
    pub fn cancel(&mut self) -> Option<TxEvent> {
        if self.state != TransmissionState::Sending {
            return None;
        }

        let sent = self.session.as_ref().map_or(0, |s| s.cursor());
        self.session = None;
        self.state = TransmissionState::Idle;
        self.signal = SignalLevel::Idle;
        self.progress = 0.0;
        self.release_wake_lock();
        log_info!("Transmission cancelled after {} bits", sent);

        Some(TxEvent::Cancelled)
    }

    fn finish(&mut self) {
        self.session = None;
        self.state = TransmissionState::Completed;
        self.signal = SignalLevel::Idle;
        self.progress = 1.0;
        self.release_wake_lock();
        log_info!("Transmission completed");
    }

    fn acquire_wake_lock(&mut self) {
        let result = self.wake_lock.acquire();
        match result {
            Ok(()) => self.wake_lock_held = true,
            Err(e) => log_warn!("Wake lock unavailable: {}", e),
        }
        self.wake_lock_result = Some(result);
    }

    fn release_wake_lock(&mut self) {
        if self.wake_lock_held {
            self.wake_lock_held = false;
            self.wake_lock.release();
        }
    }
}

impl<L: WakeLock> Drop for Transmitter<L> {
    fn drop(&mut self) {
        self.release_wake_lock();
    }
}
