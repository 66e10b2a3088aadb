//! Visible-light configuration protocol
//!
//! This crate defines the send side of the optical link between a display
//! device (the "lamp") and a sensor that has no network connection. The
//! sender flashes a bright region of its screen; the sensor samples the
//! light level and decodes the same bitstream.
//!
//! # Protocol Overview
//!
//! Configuration entries are packed into a CBOR-like payload with a CRC-32
//! trailer:
//! ```text
//! ┌────────┬─────────────────────┬──────────┐
//! │ HEADER │ KEY/VALUE ITEMS     │ CRC-32   │
//! │ 1B     │ variable            │ 4B (BE)  │
//! └────────┴─────────────────────┴──────────┘
//! ```
//!
//! The payload is then framed as 5-bit symbols, one lamp state per bit:
//! ```text
//! ┌──────────────────┬─────────┬──────────────────────┬─────────┬──────────┐
//! │ 7 × (CTRL, SYNC) │ CTRL SOF│ hi/lo nibble symbols │ CTRL EOF│ CTRL SYNC│
//! └──────────────────┴─────────┴──────────────────────┴─────────┴──────────┘
//! ```
//!
//! There is no back channel: the sensor never acknowledges.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod crc;
pub mod frame;
pub mod item;
pub mod symbol;

pub use crate::crc::{crc32, crc32_matches};
pub use frame::{
    frame, frame_symbols, sequence_len, FrameError, FrameSymbols, LightCommand, LightSequence,
    MAX_SEQUENCE_LEN,
};
pub use item::{ItemWriter, MajorType, Payload, MAX_HEADER_ENTRIES, MAX_PAYLOAD_SIZE};
pub use symbol::{Symbol, SymbolKind, DATA_SYMBOLS, SYMBOL_BITS};
