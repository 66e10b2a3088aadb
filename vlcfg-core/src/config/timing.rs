//! Transmitter timing
//!
//! The bit period is agreed with the receiver out-of-band; the receiver
//! firmware samples at 10 baud by default.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default bit period in milliseconds
pub const DEFAULT_BIT_PERIOD_MS: u32 = 100;

/// Default delay between `start` and the first bit, in milliseconds
pub const DEFAULT_LEAD_IN_MS: u32 = 100;

/// Invalid timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingError {
    /// Bit period of zero
    ZeroBitPeriod,
}

impl fmt::Display for TimingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingError::ZeroBitPeriod => write!(f, "bit period must be non-zero"),
        }
    }
}

/// Lamp timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransmitterConfig {
    /// Duration of one bit
    #[cfg_attr(feature = "serde", serde(default = "default_bit_period_ms"))]
    pub bit_period_ms: u32,
    /// Delay before the first bit is committed
    #[cfg_attr(feature = "serde", serde(default = "default_lead_in_ms"))]
    pub lead_in_ms: u32,
}

#[cfg(feature = "serde")]
fn default_bit_period_ms() -> u32 {
    DEFAULT_BIT_PERIOD_MS
}

#[cfg(feature = "serde")]
fn default_lead_in_ms() -> u32 {
    DEFAULT_LEAD_IN_MS
}

impl Default for TransmitterConfig {
    fn default() -> Self {
        Self {
            bit_period_ms: DEFAULT_BIT_PERIOD_MS,
            lead_in_ms: DEFAULT_LEAD_IN_MS,
        }
    }
}

impl TransmitterConfig {
    /// Check the configuration
    pub fn validate(&self) -> Result<(), TimingError> {
        if self.bit_period_ms == 0 {
            return Err(TimingError::ZeroBitPeriod);
        }
        Ok(())
    }
}
