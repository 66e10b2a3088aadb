//! Payload encoder
//!
//! Entries are visited in schema order. Entries without a value are
//! skipped and not counted in the header. Each entry is validated in full
//! before any of its bytes are written, and any failure aborts the whole
//! payload.

use core::fmt;

use vlcfg_protocol::{FrameError, ItemWriter, Payload, MAX_HEADER_ENTRIES};

use super::value::{parse_integer, parse_ipv4, IntegerValue};
use crate::config::{ConfigEntry, EntryKind, EntryValue};

/// Reason an encode failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeErrorKind {
    /// Address is not a dotted quad of values 0-255
    InvalidIpv4Address,
    /// Numeric text has a fractional part or is not a number
    NotAnInteger,
    /// Character does not fit in a single byte
    ByteOutOfRange,
    /// Integer does not fit in a 64-bit argument
    ParameterTooLarge,
    /// Value type does not match the entry type
    ValueKindMismatch,
    /// More than 15 entries carry a value
    TooManyEntries,
    /// Encoded entries exceed the payload buffer
    PayloadTooLarge,
}

impl fmt::Display for EncodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeErrorKind::InvalidIpv4Address => write!(f, "invalid IPv4 address"),
            EncodeErrorKind::NotAnInteger => write!(f, "not an integer"),
            EncodeErrorKind::ByteOutOfRange => write!(f, "character out of byte range"),
            EncodeErrorKind::ParameterTooLarge => write!(f, "number too large"),
            EncodeErrorKind::ValueKindMismatch => write!(f, "value does not match entry type"),
            EncodeErrorKind::TooManyEntries => {
                write!(f, "more than {} entries", MAX_HEADER_ENTRIES)
            }
            EncodeErrorKind::PayloadTooLarge => write!(f, "payload too large"),
        }
    }
}

/// Encode failure, with the index of the offending entry when there is one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncodeError {
    /// Position of the entry in the schema
    pub entry: Option<usize>,
    /// What went wrong
    pub kind: EncodeErrorKind,
}

impl EncodeError {
    /// Failure caused by one entry's value
    pub fn at(entry: usize, kind: EncodeErrorKind) -> Self {
        Self {
            entry: Some(entry),
            kind,
        }
    }

    /// Failure of the payload as a whole
    pub fn payload(err: FrameError) -> Self {
        Self {
            entry: None,
            kind: match err {
                FrameError::ByteOutOfRange => EncodeErrorKind::ByteOutOfRange,
                FrameError::TooManyEntries => EncodeErrorKind::TooManyEntries,
                FrameError::PayloadTooLarge => EncodeErrorKind::PayloadTooLarge,
            },
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entry {
            Some(index) => write!(f, "entry {}: {}", index, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// A validated entry value
enum ItemValue<'a> {
    Text(&'a str),
    Address([u8; 4]),
    Integer(IntegerValue),
    Boolean(bool),
}

impl<'a> ItemValue<'a> {
    /// Validate an entry's value; `None` if the entry is left out
    fn from_entry(entry: &'a ConfigEntry) -> Result<Option<Self>, EncodeErrorKind> {
        let text = match (entry.kind(), entry.value()) {
            (_, EntryValue::Unset) => return Ok(None),
            (EntryKind::Boolean, EntryValue::Checked(checked)) => {
                return Ok(Some(ItemValue::Boolean(*checked)))
            }
            (EntryKind::Boolean, EntryValue::Text(_)) => {
                return Err(EncodeErrorKind::ValueKindMismatch)
            }
            (_, EntryValue::Checked(_)) => return Err(EncodeErrorKind::ValueKindMismatch),
            (_, EntryValue::Text(text)) if text.is_empty() => return Ok(None),
            (_, EntryValue::Text(text)) => text.as_str(),
        };

        let value = match entry.kind() {
            EntryKind::Text | EntryKind::Password => {
                if !is_single_byte(text) {
                    return Err(EncodeErrorKind::ByteOutOfRange);
                }
                ItemValue::Text(text)
            }
            EntryKind::Ipv4Address => ItemValue::Address(parse_ipv4(text)?),
            EntryKind::Integer => ItemValue::Integer(parse_integer(text)?),
            EntryKind::Boolean => return Err(EncodeErrorKind::ValueKindMismatch),
        };
        Ok(Some(value))
    }

    fn write(&self, writer: &mut ItemWriter) -> Result<(), FrameError> {
        match self {
            ItemValue::Text(text) => writer.latin1_text(text),
            ItemValue::Address(octets) => writer.bytes(octets),
            ItemValue::Integer(IntegerValue::Unsigned(value)) => writer.unsigned(*value),
            ItemValue::Integer(IntegerValue::Negative(argument)) => writer.negative(*argument),
            ItemValue::Boolean(value) => writer.boolean(*value),
        }
    }
}

fn is_single_byte(text: &str) -> bool {
    text.chars().all(|c| (c as u32) <= 0xFF)
}

/// Serialize entries into a checksummed payload
pub fn encode_entries(entries: &[ConfigEntry]) -> Result<Payload, EncodeError> {
    let mut writer = ItemWriter::new();
    let mut count: u8 = 0;

    for (index, entry) in entries.iter().enumerate() {
        let Some(value) =
            ItemValue::from_entry(entry).map_err(|kind| EncodeError::at(index, kind))?
        else {
            continue;
        };
        if !is_single_byte(entry.key()) {
            return Err(EncodeError::at(index, EncodeErrorKind::ByteOutOfRange));
        }

        if count >= MAX_HEADER_ENTRIES {
            return Err(EncodeError::payload(FrameError::TooManyEntries));
        }
        count += 1;

        writer.latin1_text(entry.key()).map_err(EncodeError::payload)?;
        value.write(&mut writer).map_err(EncodeError::payload)?;
    }

    let payload = writer.finish(count).map_err(EncodeError::payload)?;
    log_debug!(
        "Payload ({} entries, {} bytes): {:X}",
        count,
        payload.len(),
        payload.as_bytes()
    );
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EntrySchema;
    use std::vec::Vec as StdVec;
    use vlcfg_protocol::crc32;

    fn text_entry(key: &str, kind: EntryKind, text: &str) -> ConfigEntry {
        let mut entry = ConfigEntry::new(key, kind).unwrap();
        entry.set_text(text).unwrap();
        entry
    }

    fn bool_entry(key: &str, checked: bool) -> ConfigEntry {
        let mut entry = ConfigEntry::new(key, EntryKind::Boolean).unwrap();
        entry.set_checked(checked).unwrap();
        entry
    }

    /// Minimal reader for the items this encoder emits
    struct Reader<'a> {
        bytes: &'a [u8],
        pos: usize,
    }

    impl<'a> Reader<'a> {
        fn new(bytes: &'a [u8]) -> Self {
            Self { bytes, pos: 0 }
        }

        fn byte(&mut self) -> u8 {
            let b = self.bytes[self.pos];
            self.pos += 1;
            b
        }

        fn header(&mut self) -> (u8, u64) {
            let tag = self.byte();
            let info = tag & 0x1F;
            let param = match info {
                0..=23 => info as u64,
                24..=27 => {
                    let width = 1usize << (info - 24);
                    (0..width).fold(0u64, |acc, _| (acc << 8) | self.byte() as u64)
                }
                _ => panic!("unexpected additional info {}", info),
            };
            (tag & 0xE0, param)
        }

        fn string(&mut self, major: u8) -> &'a [u8] {
            let (m, len) = self.header();
            assert_eq!(m, major);
            let bytes = self.bytes;
            let start = self.pos;
            self.pos += len as usize;
            &bytes[start..self.pos]
        }

        fn integer(&mut self) -> i128 {
            match self.header() {
                (0x00, v) => v as i128,
                (0x20, arg) => -1 - arg as i128,
                (m, _) => panic!("not an integer: major {:#04X}", m),
            }
        }
    }

    #[test]
    fn test_ip_example_payload() {
        let entries = [text_entry("ip", EntryKind::Ipv4Address, "192.168.1.10")];
        let payload = encode_entries(&entries).unwrap();

        assert_eq!(
            payload.as_bytes(),
            &[0xA1, 0x62, 0x69, 0x70, 0x44, 0xC0, 0xA8, 0x01, 0x0A, 0x67, 0x8F, 0xE5, 0x38]
        );
    }

    #[test]
    fn test_empty_entries_skipped() {
        let entries = [
            ConfigEntry::new("s", EntryKind::Text).unwrap(),
            text_entry("p", EntryKind::Password, ""),
            text_entry("n", EntryKind::Integer, "5"),
        ];
        let payload = encode_entries(&entries).unwrap();

        assert_eq!(payload.entry_count(), 1);
        let (body, _) = payload.split_crc();
        assert_eq!(body, &[0xA1, 0x61, b'n', 0x05]);
    }

    #[test]
    fn test_no_entries() {
        let payload = encode_entries(&[]).unwrap();
        assert_eq!(payload.as_bytes(), &[0xA0, 0x04, 0xD4, 0x4C, 0x65]);
    }

    #[test]
    fn test_decode_mixed_payload() {
        let entries = [
            text_entry("s", EntryKind::Text, "MyNetwork"),
            text_entry("p", EntryKind::Password, "secret!"),
            text_entry("port", EntryKind::Integer, "-1000"),
            text_entry("big", EntryKind::Integer, "70000"),
            bool_entry("dhcp", true),
            bool_entry("ipv6", false),
        ];
        let payload = encode_entries(&entries).unwrap();

        let (body, crc) = payload.split_crc();
        assert_eq!(crc, crc32(body));

        let mut r = Reader::new(body);
        assert_eq!(r.header(), (0xA0, 6));

        assert_eq!(r.string(0x60), b"s");
        assert_eq!(r.string(0x60), b"MyNetwork");
        assert_eq!(r.string(0x60), b"p");
        assert_eq!(r.string(0x60), b"secret!");
        assert_eq!(r.string(0x60), b"port");
        assert_eq!(r.integer(), -1000);
        assert_eq!(r.string(0x60), b"big");
        assert_eq!(r.integer(), 70000);
        assert_eq!(r.string(0x60), b"dhcp");
        assert_eq!(r.byte(), 0xF5);
        assert_eq!(r.string(0x60), b"ipv6");
        assert_eq!(r.byte(), 0xF4);
        assert_eq!(r.pos, body.len());
    }

    #[test]
    fn test_negative_integer_argument() {
        let entries = [text_entry("t", EntryKind::Integer, "-25")];
        let payload = encode_entries(&entries).unwrap();
        // -25 encodes with argument 24, which spills into one extra byte
        assert_eq!(&payload.as_bytes()[3..5], &[0x38, 24]);
    }

    #[test]
    fn test_latin1_text_value() {
        let entries = [text_entry("s", EntryKind::Text, "Caf\u{e9}")];
        let payload = encode_entries(&entries).unwrap();
        let (body, _) = payload.split_crc();
        assert_eq!(&body[3..], &[0x64, b'C', b'a', b'f', 0xE9]);
    }

    #[test]
    fn test_invalid_ipv4_fails() {
        let entries = [
            text_entry("s", EntryKind::Text, "ok"),
            text_entry("ip", EntryKind::Ipv4Address, "999.1.1.1"),
        ];
        assert_eq!(
            encode_entries(&entries),
            Err(EncodeError::at(1, EncodeErrorKind::InvalidIpv4Address))
        );
    }

    #[test]
    fn test_fractional_integer_fails() {
        let entries = [text_entry("n", EntryKind::Integer, "3.5")];
        assert_eq!(
            encode_entries(&entries),
            Err(EncodeError::at(0, EncodeErrorKind::NotAnInteger))
        );
    }

    #[test]
    fn test_wide_character_fails() {
        let entries = [text_entry("s", EntryKind::Text, "\u{3042}")];
        assert_eq!(
            encode_entries(&entries),
            Err(EncodeError::at(0, EncodeErrorKind::ByteOutOfRange))
        );

        let entries = [text_entry("\u{3042}", EntryKind::Text, "x")];
        assert_eq!(
            encode_entries(&entries),
            Err(EncodeError::at(0, EncodeErrorKind::ByteOutOfRange))
        );
    }

    #[test]
    fn test_integer_too_large_fails() {
        let entries = [text_entry("n", EntryKind::Integer, "18446744073709551616")];
        assert_eq!(
            encode_entries(&entries),
            Err(EncodeError::at(0, EncodeErrorKind::ParameterTooLarge))
        );
    }

    #[test]
    fn test_fifteen_entries_fit_header() {
        let keys = "abcdefghijklmno";
        let entries: StdVec<ConfigEntry> = (0..keys.len())
            .map(|i| bool_entry(&keys[i..i + 1], true))
            .collect();
        assert_eq!(entries.len(), 15);
        let payload = encode_entries(&entries).unwrap();
        assert_eq!(payload.as_bytes()[0], 0xAF);
    }

    #[test]
    fn test_sixteen_entries_rejected() {
        let mut entries: StdVec<ConfigEntry> = (0..16).map(|_| bool_entry("k", true)).collect();
        assert_eq!(
            encode_entries(&entries),
            Err(EncodeError::payload(FrameError::TooManyEntries))
        );

        // Unset entries do not count
        entries[15].clear();
        assert!(encode_entries(&entries).is_ok());
    }

    #[test]
    fn test_payload_overflow() {
        let long = [b'x'; 60];
        let long = core::str::from_utf8(&long).unwrap();
        let entries: StdVec<ConfigEntry> = (0..10)
            .map(|_| text_entry("key", EntryKind::Text, long))
            .collect();
        assert_eq!(
            encode_entries(&entries),
            Err(EncodeError::payload(FrameError::PayloadTooLarge))
        );
    }

    #[test]
    fn test_entries_from_schema() {
        let schema = [
            EntrySchema::new("i", EntryKind::Ipv4Address)
                .and_then(|s| s.with_value("10.0.0.2"))
                .unwrap(),
            EntrySchema::new("c", EntryKind::Boolean).unwrap(),
        ];
        let entries: StdVec<ConfigEntry> = schema
            .iter()
            .map(|s| ConfigEntry::from_schema(s).unwrap())
            .collect();
        let payload = encode_entries(&entries).unwrap();
        let (body, _) = payload.split_crc();
        assert_eq!(
            body,
            &[0xA2, 0x61, b'i', 0x44, 10, 0, 0, 2, 0x61, b'c', 0xF4]
        );
    }

    #[test]
    fn test_error_display() {
        use std::string::ToString;
        let err = EncodeError::at(2, EncodeErrorKind::InvalidIpv4Address);
        assert_eq!(err.to_string(), "entry 2: invalid IPv4 address");
    }
}
