use std::fmt::Write as _;

use crate::core::{Result, TypeError, Value};

/// bytea in either output format: `\x0a0b` (hex) or `a\\b\012` (escape).
pub fn decode_bytea(text: &str) -> Result<Value> {
    if let Some(digits) = text.strip_prefix("\\x") {
        return hex::decode(digits)
            .map(Value::Binary)
            .map_err(|_| TypeError::malformed("bytea", text));
    }

    let raw = text.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] != b'\\' {
            bytes.push(raw[i]);
            i += 1;
            continue;
        }
        match raw.get(i + 1..i + 4) {
            Some([b'\\', ..]) => {
                bytes.push(b'\\');
                i += 2;
            }
            Some(&[a, b, c]) if [a, b, c].iter().all(|d| (b'0'..=b'7').contains(d)) => {
                let byte = u32::from(a - b'0') * 64 + u32::from(b - b'0') * 8 + u32::from(c - b'0');
                bytes.push(u8::try_from(byte).map_err(|_| TypeError::malformed("bytea", text))?);
                i += 4;
            }
            _ if raw.get(i + 1) == Some(&b'\\') => {
                bytes.push(b'\\');
                i += 2;
            }
            _ => return Err(TypeError::malformed("bytea", text)),
        }
    }
    Ok(Value::Binary(bytes))
}

#[must_use]
pub fn format_bytea(bytes: &[u8]) -> String {
    format!("\\x{}", hex::encode(bytes))
}

/// `\ooo` for every byte; the bytea escape format understood by servers
/// without hex support.
#[must_use]
pub fn octal_escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4);
    for byte in bytes {
        let _ = write!(out, "\\{byte:03o}");
    }
    out
}

/// Bit strings are kept as their `0`/`1` digits. A `0x` prefix marks a hex
/// rendering, which is expanded to binary digits without leading zeros.
pub fn decode_bit(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if let Some(digits) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        let mut bits = String::with_capacity(digits.len() * 4);
        for ch in digits.chars() {
            let nibble = ch.to_digit(16).ok_or_else(|| TypeError::malformed("bit", text))?;
            let _ = write!(bits, "{nibble:04b}");
        }
        let significant = bits.trim_start_matches('0');
        return Ok(Value::Bit(if significant.is_empty() { "0".to_string() } else { significant.to_string() }));
    }

    if trimmed.chars().all(|c| c == '0' || c == '1') {
        Ok(Value::Bit(trimmed.to_string()))
    } else {
        Err(TypeError::malformed("bit", text))
    }
}

/// `B'0101'` for binary digits, `X'1F'` for hex digits.
pub fn encode_bit(digits: &str) -> Result<String> {
    if digits.chars().all(|c| c == '0' || c == '1') {
        Ok(format!("B'{digits}'"))
    } else if digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(format!("X'{digits}'"))
    } else {
        Err(TypeError::mismatch("bit string", format!("{digits:?}")))
    }
}
