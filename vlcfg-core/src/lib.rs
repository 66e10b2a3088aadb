//! Board-agnostic core logic for optical configuration transfer
//!
//! This crate contains everything between the configuration form and the
//! lamp, independent of how either is drawn:
//!
//! - Entry schema and live configuration entries
//! - Typed value validation and payload encoding
//! - The timed lamp transmitter and its session state machine
//! - The keep-awake capability trait
//! - Transmitter timing configuration

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod log;

pub mod codec;
pub mod config;
pub mod traits;
pub mod transmit;

pub use codec::{encode_entries, EncodeError, EncodeErrorKind};
pub use config::{
    ConfigEntry, EntryKind, EntrySchema, EntryValue, FormDefinition, SchemaError, TimingError,
    TransmitterConfig,
};
pub use traits::{NoWakeLock, WakeLock, WakeLockError};
pub use transmit::{SignalLevel, TransmissionState, TransmitError, Transmitter, TxEvent};

pub use vlcfg_protocol::{LightCommand, LightSequence, Payload};

/// Encode `entries` and frame the result, ready for [`Transmitter::start`]
pub fn prepare(entries: &[ConfigEntry]) -> Result<LightSequence, EncodeError> {
    let payload = encode_entries(entries)?;
    let sequence = vlcfg_protocol::frame(payload.as_bytes()).map_err(EncodeError::payload)?;
    log_debug!("Framed {} bytes into {} bits", payload.len(), sequence.len());
    Ok(sequence)
}
