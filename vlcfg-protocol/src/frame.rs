//! Optical frame encoding
//!
//! Frame format, in symbols:
//! - PREAMBLE: 7 × (CONTROL, SYNC) for receiver clock recovery
//! - START: CONTROL, START_OF_FRAME
//! - DATA: two data symbols per payload byte, high nibble first
//! - END: CONTROL, END_OF_FRAME
//! - TRAILER: CONTROL, SYNC to return the channel to idle
//!
//! Each symbol expands to five lamp states of one bit period each.

use heapless::Vec;

use crate::item::MAX_PAYLOAD_SIZE;
use crate::symbol::{Symbol, SYMBOL_BITS};

/// Number of (CONTROL, SYNC) pairs before the start marker
pub const PREAMBLE_PAIRS: usize = 7;

/// Symbols in a frame that do not carry payload
pub const FRAME_OVERHEAD_SYMBOLS: usize = 2 * PREAMBLE_PAIRS + 2 + 2 + 2;

/// Maximum number of light commands in one sequence
pub const MAX_SEQUENCE_LEN: usize = sequence_len(MAX_PAYLOAD_SIZE);

/// Errors that can occur while building a payload or a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Character cannot be sent as a single byte
    ByteOutOfRange,
    /// More entries than the header can count
    TooManyEntries,
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::PayloadTooLarge => write!(f, "payload exceeds {} bytes", MAX_PAYLOAD_SIZE),
            FrameError::ByteOutOfRange => write!(f, "character does not fit in one byte"),
            FrameError::TooManyEntries => write!(f, "too many entries for the payload header"),
        }
    }
}

/// Number of light commands needed to send a payload of `payload_len` bytes
pub const fn sequence_len(payload_len: usize) -> usize {
    SYMBOL_BITS as usize * (FRAME_OVERHEAD_SYMBOLS + 2 * payload_len)
}

/// One lamp state held for a whole number of bit periods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LightCommand {
    /// Lamp lit (bit 1) or dark (bit 0)
    pub level: bool,
    /// Duration in bit periods
    pub duration: u8,
}

impl LightCommand {
    /// One bit period at the given level
    pub const fn bit(level: bool) -> Self {
        Self { level, duration: 1 }
    }
}

/// Fully materialized lamp sequence for one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightSequence {
    commands: Vec<LightCommand, MAX_SEQUENCE_LEN>,
}

impl LightSequence {
    /// Commands in transmission order
    pub fn commands(&self) -> &[LightCommand] {
        &self.commands
    }

    /// Command at `index`
    pub fn get(&self, index: usize) -> Option<&LightCommand> {
        self.commands.get(index)
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if the sequence holds no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Total number of bit periods
    pub fn bit_count(&self) -> u32 {
        self.commands.iter().map(|c| c.duration as u32).sum()
    }

    /// Nominal air time at the given bit period
    pub fn duration_ms(&self, bit_period_ms: u32) -> u64 {
        self.bit_count() as u64 * bit_period_ms as u64
    }
}

/// Iterator over the symbols of a frame
#[derive(Debug, Clone)]
pub struct FrameSymbols<'a> {
    payload: &'a [u8],
    index: usize,
}

impl<'a> FrameSymbols<'a> {
    fn total(&self) -> usize {
        FRAME_OVERHEAD_SYMBOLS + 2 * self.payload.len()
    }

    fn symbol_at(&self, index: usize) -> Symbol {
        let preamble_end = 2 * PREAMBLE_PAIRS;
        let data_start = preamble_end + 2;
        let data_end = data_start + 2 * self.payload.len();

        if index < preamble_end {
            if index % 2 == 0 {
                Symbol::CONTROL
            } else {
                Symbol::SYNC
            }
        } else if index < data_start {
            if index == preamble_end {
                Symbol::CONTROL
            } else {
                Symbol::START_OF_FRAME
            }
        } else if index < data_end {
            let offset = index - data_start;
            let byte = self.payload[offset / 2];
            if offset % 2 == 0 {
                Symbol::data(byte >> 4)
            } else {
                Symbol::data(byte & 0x0F)
            }
        } else {
            match index - data_end {
                0 | 2 => Symbol::CONTROL,
                1 => Symbol::END_OF_FRAME,
                _ => Symbol::SYNC,
            }
        }
    }
}

impl Iterator for FrameSymbols<'_> {
    type Item = Symbol;

    fn next(&mut self) -> Option<Symbol> {
        if self.index >= self.total() {
            return None;
        }
        let symbol = self.symbol_at(self.index);
        self.index += 1;
        Some(symbol)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameSymbols<'_> {}

/// Symbols of the frame carrying `payload`
pub fn frame_symbols(payload: &[u8]) -> FrameSymbols<'_> {
    FrameSymbols { payload, index: 0 }
}

/// Build the complete lamp sequence for `payload`
pub fn frame(payload: &[u8]) -> Result<LightSequence, FrameError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }

    let mut commands = Vec::new();
    for symbol in frame_symbols(payload) {
        for level in symbol.levels() {
            commands
                .push(LightCommand::bit(level))
                .map_err(|_| FrameError::PayloadTooLarge)?;
        }
    }

    Ok(LightSequence { commands })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolKind;
    use proptest::prelude::*;
    use std::vec::Vec as StdVec;

    fn symbols_from_levels(sequence: &LightSequence) -> StdVec<u8> {
        sequence
            .commands()
            .chunks(SYMBOL_BITS as usize)
            .map(|bits| bits.iter().fold(0u8, |acc, c| (acc << 1) | c.level as u8))
            .collect()
    }

    #[test]
    fn test_empty_payload_frame() {
        let symbols: StdVec<Symbol> = frame_symbols(&[]).collect();
        assert_eq!(symbols.len(), FRAME_OVERHEAD_SYMBOLS);
        for pair in symbols[..14].chunks(2) {
            assert_eq!(pair, [Symbol::CONTROL, Symbol::SYNC]);
        }
        assert_eq!(
            &symbols[14..],
            &[
                Symbol::CONTROL,
                Symbol::START_OF_FRAME,
                Symbol::CONTROL,
                Symbol::END_OF_FRAME,
                Symbol::CONTROL,
                Symbol::SYNC,
            ]
        );
    }

    #[test]
    fn test_data_symbols_high_nibble_first() {
        let symbols: StdVec<Symbol> = frame_symbols(&[0x3C]).collect();
        assert_eq!(symbols[16], Symbol::data(0x3));
        assert_eq!(symbols[17], Symbol::data(0xC));
        assert_eq!(symbols[18], Symbol::CONTROL);
        assert_eq!(symbols[19], Symbol::END_OF_FRAME);
    }

    #[test]
    fn test_sequence_length() {
        assert_eq!(frame(&[]).unwrap().len(), 100);
        assert_eq!(frame(&[0u8; 13]).unwrap().len(), 230);
        assert_eq!(sequence_len(13), 230);
        assert_eq!(frame_symbols(&[1, 2, 3]).len(), 26);
    }

    #[test]
    fn test_every_command_is_one_bit() {
        let sequence = frame(&[0xA0, 0x04, 0xD4, 0x4C, 0x65]).unwrap();
        assert!(sequence.commands().iter().all(|c| c.duration == 1));
        assert_eq!(sequence.bit_count() as usize, sequence.len());
        assert_eq!(sequence.duration_ms(100), 100 * sequence.len() as u64);
    }

    #[test]
    fn test_levels_follow_symbols() {
        let payload = [0xA1, 0x62, 0x69, 0x70];
        let sequence = frame(&payload).unwrap();
        let expected: StdVec<u8> = frame_symbols(&payload).map(|s| s.bits()).collect();
        assert_eq!(symbols_from_levels(&sequence), expected);
    }

    #[test]
    fn test_payload_too_large() {
        let payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(frame(&payload), Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_max_payload_fits() {
        let payload = [0xFFu8; MAX_PAYLOAD_SIZE];
        let sequence = frame(&payload).unwrap();
        assert_eq!(sequence.len(), MAX_SEQUENCE_LEN);
    }

    proptest! {
        #[test]
        fn prop_byte_maps_to_two_data_symbols(byte in any::<u8>()) {
            let sequence = frame(&[byte]).unwrap();
            let symbols = symbols_from_levels(&sequence);
            let high = Symbol::decode(symbols[16]);
            let low = Symbol::decode(symbols[17]);
            prop_assert_eq!(high, Some(SymbolKind::Data(byte >> 4)));
            prop_assert_eq!(low, Some(SymbolKind::Data(byte & 0x0F)));
        }

        #[test]
        fn prop_sequence_length(payload in proptest::collection::vec(any::<u8>(), 0..64)) {
            let sequence = frame(&payload).unwrap();
            prop_assert_eq!(sequence.len(), 5 * (14 + 2 + 2 * payload.len() + 2 + 2));
        }
    }
}
