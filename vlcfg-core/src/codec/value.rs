//! Value parsing for typed entries

use super::encoder::EncodeErrorKind;

/// An integer ready for encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntegerValue {
    /// Zero or positive value
    Unsigned(u64),
    /// Negative value, stored as its encoded argument `-1 - value`
    Negative(u64),
}

impl IntegerValue {
    /// Signed value, if it fits in an `i64`
    pub fn to_i64(self) -> Option<i64> {
        match self {
            IntegerValue::Unsigned(v) => i64::try_from(v).ok(),
            IntegerValue::Negative(arg) => i64::try_from(arg).ok().map(|a| -1 - a),
        }
    }
}

impl From<i64> for IntegerValue {
    fn from(value: i64) -> Self {
        if value >= 0 {
            IntegerValue::Unsigned(value as u64)
        } else {
            // -1 - value is non-negative and at most i64::MAX
            IntegerValue::Negative((-1 - value) as u64)
        }
    }
}

/// Parse a strict dotted-quad IPv4 address
///
/// Each part is one to three ASCII digits with a value of at most 255.
pub fn parse_ipv4(text: &str) -> Result<[u8; 4], EncodeErrorKind> {
    let mut octets = [0u8; 4];
    let mut parts = text.split('.');

    for octet in octets.iter_mut() {
        let part = parts.next().ok_or(EncodeErrorKind::InvalidIpv4Address)?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EncodeErrorKind::InvalidIpv4Address);
        }
        let value = part
            .bytes()
            .fold(0u16, |acc, b| acc * 10 + (b - b'0') as u16);
        *octet = u8::try_from(value).map_err(|_| EncodeErrorKind::InvalidIpv4Address)?;
    }

    if parts.next().is_some() {
        return Err(EncodeErrorKind::InvalidIpv4Address);
    }
    Ok(octets)
}

/// Parse integer text
///
/// Accepts surrounding whitespace, an optional sign, decimal digits with an
/// optional fractional part and an optional exponent (`e`/`E`). The number
/// must be whole: "3.0", "1e3" and "2.5e1" are accepted, "3.5" and "15e-1"
/// are not. Values must be representable as a 64-bit argument:
/// `-2^64 ..= 2^64 - 1`.
pub fn parse_integer(text: &str) -> Result<IntegerValue, EncodeErrorKind> {
    let text = text.trim();
    let (negative, number) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (mantissa, exponent) = match number.find(|c: char| c == 'e' || c == 'E') {
        Some(pos) => (&number[..pos], parse_exponent(&number[pos + 1..])?),
        None => (number, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let digits = whole.bytes().chain(fraction.bytes());
    if (whole.is_empty() && fraction.is_empty()) || !digits.clone().all(|b| b.is_ascii_digit()) {
        return Err(EncodeErrorKind::NotAnInteger);
    }

    // Trailing zeros move into the exponent, so the last significant digit
    // is non-zero and a negative scale always leaves a fraction
    let trailing_zeros = digits.clone().rev().take_while(|&b| b == b'0').count();
    let significant = whole.len() + fraction.len() - trailing_zeros;
    if significant == 0 {
        return Ok(IntegerValue::Unsigned(0));
    }
    let scale = exponent
        .saturating_sub(fraction.len() as i64)
        .saturating_add(trailing_zeros as i64);
    if scale < 0 {
        return Err(EncodeErrorKind::NotAnInteger);
    }

    let mut magnitude: u128 = 0;
    for b in digits.take(significant) {
        magnitude = magnitude
            .checked_mul(10)
            .and_then(|m| m.checked_add((b - b'0') as u128))
            .ok_or(EncodeErrorKind::ParameterTooLarge)?;
    }
    for _ in 0..scale {
        magnitude = magnitude
            .checked_mul(10)
            .ok_or(EncodeErrorKind::ParameterTooLarge)?;
    }

    if negative {
        u64::try_from(magnitude - 1)
            .map(IntegerValue::Negative)
            .map_err(|_| EncodeErrorKind::ParameterTooLarge)
    } else {
        u64::try_from(magnitude)
            .map(IntegerValue::Unsigned)
            .map_err(|_| EncodeErrorKind::ParameterTooLarge)
    }
}

/// Exponent after `e`, saturating far outside any usable range
fn parse_exponent(text: &str) -> Result<i64, EncodeErrorKind> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EncodeErrorKind::NotAnInteger);
    }

    let value = digits
        .bytes()
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add((b - b'0') as i64));
    Ok(if negative { -value } else { value })
}
