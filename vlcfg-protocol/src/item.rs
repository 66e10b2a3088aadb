//! CBOR-like item encoding for the configuration payload
//!
//! Every item starts with a tag byte: the top three bits select the major
//! type, the low five bits carry the argument (a length or an integer).
//! Arguments of 24 or more spill into 1, 2, 4 or 8 big-endian bytes that
//! follow the tag.
//!
//! Payload layout:
//! - HEADER (1 byte): `0xA0 | entry_count` (a map with up to 15 pairs)
//! - ITEMS: alternating key (text string) and value items
//! - CRC (4 bytes): big-endian CRC-32 over HEADER and ITEMS

use core::fmt;

use heapless::Vec;

use crate::crc::crc32;
use crate::frame::FrameError;

/// Maximum payload size in bytes, CRC trailer included
pub const MAX_PAYLOAD_SIZE: usize = 512;

/// Highest entry count the header byte can carry
pub const MAX_HEADER_ENTRIES: u8 = 15;

/// Size of the CRC-32 trailer
pub const CRC_SIZE: usize = 4;

/// Arguments below this value fit into the tag byte
const INLINE_ARGUMENT_LIMIT: u64 = 24;

// Additional-information values announcing a trailing argument
const ARGUMENT_1_BYTE: u8 = 24;
const ARGUMENT_2_BYTES: u8 = 25;
const ARGUMENT_4_BYTES: u8 = 26;
const ARGUMENT_8_BYTES: u8 = 27;

// Simple values
const SIMPLE_FALSE: u64 = 20;
const SIMPLE_TRUE: u64 = 21;

/// Major type tag bases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MajorType {
    /// Non-negative integer, argument is the value
    UnsignedInt = 0x00,
    /// Negative integer, argument is `-1 - value`
    NegativeInt = 0x20,
    /// Byte string, argument is the length
    ByteString = 0x40,
    /// Text string, argument is the length
    TextString = 0x60,
    /// Map, argument is the number of key/value pairs
    Map = 0xA0,
    /// Simple value (booleans)
    Simple = 0xE0,
}

impl MajorType {
    /// Tag base byte
    pub const fn base(self) -> u8 {
        self as u8
    }

    /// Major type of a tag byte (None for types this protocol never emits)
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag & 0xE0 {
            0x00 => Some(MajorType::UnsignedInt),
            0x20 => Some(MajorType::NegativeInt),
            0x40 => Some(MajorType::ByteString),
            0x60 => Some(MajorType::TextString),
            0xA0 => Some(MajorType::Map),
            0xE0 => Some(MajorType::Simple),
            _ => None,
        }
    }
}

/// A finished payload: header, items and CRC trailer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    bytes: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Payload {
    /// Raw payload bytes including the CRC trailer
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the payload holds no bytes (never the case for a finished payload)
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of entries announced by the header byte
    pub fn entry_count(&self) -> u8 {
        self.bytes.first().map_or(0, |header| header & 0x1F)
    }

    /// Split into the checksummed body and the trailer value
    pub fn split_crc(&self) -> (&[u8], u32) {
        let body_len = self.bytes.len().saturating_sub(CRC_SIZE);
        let (body, trailer) = self.bytes.split_at(body_len);
        let mut crc = [0u8; CRC_SIZE];
        crc[CRC_SIZE - trailer.len()..].copy_from_slice(trailer);
        (body, u32::from_be_bytes(crc))
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.bytes.iter() {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

/// Incremental payload builder
///
/// The header byte is reserved up front and completed by [`ItemWriter::finish`]
/// once the number of emitted entries is known.
#[derive(Debug, Clone)]
pub struct ItemWriter {
    buffer: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for ItemWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemWriter {
    /// Create a writer with the map header reserved
    pub fn new() -> Self {
        let mut buffer = Vec::new();
        // Capacity is far above one byte
        let _ = buffer.push(MajorType::Map.base());
        Self { buffer }
    }

    /// Bytes written so far, header included
    pub fn written(&self) -> &[u8] {
        &self.buffer
    }

    /// Emit a tag byte for `major` carrying `param`
    pub fn major(&mut self, major: MajorType, param: u64) -> Result<(), FrameError> {
        let base = major.base();
        if param < INLINE_ARGUMENT_LIMIT {
            self.push(base + param as u8)
        } else if param <= u8::MAX as u64 {
            self.push(base + ARGUMENT_1_BYTE)?;
            self.push(param as u8)
        } else if param <= u16::MAX as u64 {
            self.push(base + ARGUMENT_2_BYTES)?;
            self.extend(&(param as u16).to_be_bytes())
        } else if param <= u32::MAX as u64 {
            self.push(base + ARGUMENT_4_BYTES)?;
            self.extend(&(param as u32).to_be_bytes())
        } else {
            self.push(base + ARGUMENT_8_BYTES)?;
            self.extend(&param.to_be_bytes())
        }
    }

    /// Emit a text string item from raw bytes
    pub fn text(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        self.major(MajorType::TextString, bytes.len() as u64)?;
        self.extend(bytes)
    }

    /// Emit a text string item, one byte per character
    ///
    /// Only characters up to U+00FF are representable.
    pub fn latin1_text(&mut self, text: &str) -> Result<(), FrameError> {
        let len = text.chars().count();
        if text.chars().any(|c| c as u32 > 0xFF) {
            return Err(FrameError::ByteOutOfRange);
        }
        self.major(MajorType::TextString, len as u64)?;
        for c in text.chars() {
            self.push(c as u32 as u8)?;
        }
        Ok(())
    }

    /// Emit a byte string item
    pub fn bytes(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        self.major(MajorType::ByteString, bytes.len() as u64)?;
        self.extend(bytes)
    }

    /// Emit a non-negative integer
    pub fn unsigned(&mut self, value: u64) -> Result<(), FrameError> {
        self.major(MajorType::UnsignedInt, value)
    }

    /// Emit a negative integer given its encoded argument `-1 - value`
    pub fn negative(&mut self, argument: u64) -> Result<(), FrameError> {
        self.major(MajorType::NegativeInt, argument)
    }

    /// Emit a boolean simple value (0xF4 / 0xF5)
    pub fn boolean(&mut self, value: bool) -> Result<(), FrameError> {
        self.major(
            MajorType::Simple,
            if value { SIMPLE_TRUE } else { SIMPLE_FALSE },
        )
    }

    /// Complete the header and append the CRC trailer
    pub fn finish(mut self, entry_count: u8) -> Result<Payload, FrameError> {
        if entry_count > MAX_HEADER_ENTRIES {
            return Err(FrameError::TooManyEntries);
        }
        self.buffer[0] |= entry_count;

        let crc = crc32(&self.buffer);
        self.extend(&crc.to_be_bytes())?;

        Ok(Payload {
            bytes: self.buffer,
        })
    }

    fn push(&mut self, byte: u8) -> Result<(), FrameError> {
        self.buffer
            .push(byte)
            .map_err(|_| FrameError::PayloadTooLarge)
    }

    fn extend(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        self.buffer
            .extend_from_slice(bytes)
            .map_err(|_| FrameError::PayloadTooLarge)
    }
}
