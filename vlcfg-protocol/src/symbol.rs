//! 5-bit line symbols
//!
//! Four codes are reserved for control and sixteen carry one nibble each.
//! Every code has two or three set bits, so the lamp never stays dark or
//! lit long enough for the receiver to lose bit clock.

/// Bits per symbol
pub const SYMBOL_BITS: u8 = 5;

const SYMBOL_MASK: u8 = (1 << SYMBOL_BITS) - 1;

const CODE_CONTROL: u8 = 0b01010;
const CODE_SYNC: u8 = 0b10001;
const CODE_SOF: u8 = 0b00011;
const CODE_EOF: u8 = 0b00111;

/// Nibble to data symbol code
pub const DATA_SYMBOLS: [u8; 16] = [
    0b00101, 0b00110, 0b01001, 0b01011, //
    0b01100, 0b01101, 0b01110, 0b10010, //
    0b10011, 0b10100, 0b10101, 0b10110, //
    0b11000, 0b11001, 0b11010, 0b11100, //
];

/// Meaning of a symbol code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SymbolKind {
    /// Escape; the next symbol is a control code
    Control,
    /// Bit/symbol synchronization
    Sync,
    /// Start of frame
    StartOfFrame,
    /// End of frame
    EndOfFrame,
    /// Data nibble (0-15)
    Data(u8),
}

/// A single 5-bit line symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Symbol(u8);

impl Symbol {
    pub const CONTROL: Symbol = Symbol(CODE_CONTROL);
    pub const SYNC: Symbol = Symbol(CODE_SYNC);
    pub const START_OF_FRAME: Symbol = Symbol(CODE_SOF);
    pub const END_OF_FRAME: Symbol = Symbol(CODE_EOF);

    /// Data symbol for the low four bits of `nibble`
    pub const fn data(nibble: u8) -> Self {
        Symbol(DATA_SYMBOLS[(nibble & 0x0F) as usize])
    }

    /// Raw 5-bit code
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Look up the meaning of a raw code
    ///
    /// Returns `None` for the twelve codes that are never transmitted.
    pub fn decode(bits: u8) -> Option<SymbolKind> {
        match bits {
            CODE_CONTROL => Some(SymbolKind::Control),
            CODE_SYNC => Some(SymbolKind::Sync),
            CODE_SOF => Some(SymbolKind::StartOfFrame),
            CODE_EOF => Some(SymbolKind::EndOfFrame),
            _ if bits > SYMBOL_MASK => None,
            _ => DATA_SYMBOLS
                .iter()
                .position(|&code| code == bits)
                .map(|nibble| SymbolKind::Data(nibble as u8)),
        }
    }

    /// Meaning of this symbol
    pub fn kind(self) -> SymbolKind {
        // Symbols are only built from the constants above and the data table
        Self::decode(self.0).unwrap_or(SymbolKind::Control)
    }

    /// Lamp states for this symbol, most significant bit first
    pub fn levels(self) -> impl Iterator<Item = bool> {
        let bits = self.0;
        (0..SYMBOL_BITS).rev().map(move |i| (bits >> i) & 1 != 0)
    }
}
