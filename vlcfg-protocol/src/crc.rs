//! CRC-32 trailer checksum
//!
//! Standard CRC-32 (ISO-HDLC, as used by Ethernet and ZIP) computed bit by
//! bit, LSB first. The receiver runs the exact same loop, so no lookup table
//! is kept on either side.

/// Reflected form of the 0x04C11DB7 generator polynomial
pub const CRC32_POLY: u32 = 0xEDB8_8320;

/// Initial shift register value
const CRC32_INIT: u32 = 0xFFFF_FFFF;

/// Calculate the CRC-32 of `data`
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = CRC32_INIT;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (CRC32_POLY & mask);
        }
    }
    !crc
}

/// Check `data` against an expected checksum
pub fn crc32_matches(data: &[u8], expected: u32) -> bool {
    crc32(data) == expected
}
