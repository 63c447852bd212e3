use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::core::{Result, TypeError, Value};

// Money output depends on lc_monetary: "$1,234.56", "1.234,56 €", "($2.25)"
static NEGATIVE_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A\((.+)\)\z").unwrap_or_else(|e| panic!("{e}")));
static DOT_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A-?\D*[\d,]+\.\d{2}\z").unwrap_or_else(|e| panic!("{e}")));
static COMMA_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A-?\D*[\d.]+,\d{2}\z").unwrap_or_else(|e| panic!("{e}")));

pub fn decode_integer(text: &str) -> Result<Value> {
    text.trim()
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|_| TypeError::malformed("integer", text))
}

pub fn decode_float(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    let special = match trimmed.to_ascii_lowercase().as_str() {
        "nan" => Some(f64::NAN),
        "infinity" | "inf" | "+infinity" => Some(f64::INFINITY),
        "-infinity" | "-inf" => Some(f64::NEG_INFINITY),
        _ => None,
    };
    if let Some(special) = special {
        return Ok(Value::Float(special));
    }
    trimmed
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|_| TypeError::malformed("float", text))
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// numeric also has NaN and (since PostgreSQL 14) infinities; those come back as floats.
pub fn decode_decimal(text: &str) -> Result<Value> {
    if let Some(value) = parse_decimal(text) {
        return Ok(Value::Decimal(value));
    }
    match decode_float(text) {
        Ok(Value::Float(f)) if !f.is_finite() => Ok(Value::Float(f)),
        _ => Err(TypeError::malformed("decimal", text)),
    }
}

/// numeric(p,0): an integer when it fits, a decimal otherwise.
pub fn decode_decimal_without_scale(text: &str) -> Result<Value> {
    match decode_decimal(text)? {
        Value::Decimal(d) => Ok(d.trunc().to_i64().map_or(Value::Decimal(d.trunc()), Value::Integer)),
        other => Ok(other),
    }
}

pub fn decode_money(text: &str) -> Result<Value> {
    let mut normalized = text.trim().to_string();
    if let Some(caps) = NEGATIVE_PARENS.captures(&normalized) {
        normalized = format!("-{}", &caps[1]);
    }

    let digits: String = if DOT_DECIMAL.is_match(&normalized) {
        normalized.chars().filter(|c| *c == '-' || *c == '.' || c.is_ascii_digit()).collect()
    } else if COMMA_DECIMAL.is_match(&normalized) {
        normalized
            .chars()
            .filter(|c| *c == '-' || *c == ',' || c.is_ascii_digit())
            .map(|c| if c == ',' { '.' } else { c })
            .collect()
    } else {
        normalized
    };

    parse_decimal(&digits)
        .map(Value::Money)
        .ok_or_else(|| TypeError::malformed("money", text))
}

/// Range check for an integer column `limit` bytes wide.
pub fn check_integer_limit(value: i64, limit: Option<u32>) -> Result<i64> {
    let Some(bytes) = limit.filter(|b| (1..8).contains(b)) else {
        return Ok(value);
    };
    let bound = 1_i128 << (8 * bytes - 1);
    let wide = i128::from(value);
    if wide < -bound || wide >= bound {
        return Err(TypeError::mismatch(format!("{bytes}-byte integer"), value.to_string()));
    }
    Ok(value)
}

/// Coerce a value headed for an integer column.
pub fn integer_of(value: &Value) -> Result<i64> {
    match value {
        Value::Integer(i) => Ok(*i),
        Value::Decimal(d) if d.fract().is_zero() => d
            .to_i64()
            .ok_or_else(|| TypeError::mismatch("integer", d.to_string())),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => {
            Decimal::try_from(*f)
                .ok()
                .and_then(|d| d.to_i64())
                .ok_or_else(|| TypeError::mismatch("integer", f.to_string()))
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| TypeError::mismatch("integer", format!("{s:?}"))),
        other => Err(TypeError::mismatch("integer", other.kind())),
    }
}

/// Coerce a finite value headed for a decimal/money column.
pub fn decimal_of(value: &Value) -> Result<Decimal> {
    match value {
        Value::Decimal(d) | Value::Money(d) => Ok(*d),
        Value::Integer(i) => Ok(Decimal::from(*i)),
        Value::Float(f) => Decimal::try_from(*f).map_err(|_| TypeError::mismatch("decimal", f.to_string())),
        Value::String(s) => parse_decimal(s).ok_or_else(|| TypeError::mismatch("decimal", format!("{s:?}"))),
        other => Err(TypeError::mismatch("decimal", other.kind())),
    }
}

/// Coerce a value headed for a float column.
pub fn float_of(value: &Value) -> Result<f64> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Integer(i) => Decimal::from(*i)
            .to_f64()
            .ok_or_else(|| TypeError::mismatch("float", i.to_string())),
        Value::Decimal(d) => d.to_f64().ok_or_else(|| TypeError::mismatch("float", d.to_string())),
        Value::String(s) => match decode_float(s) {
            Ok(Value::Float(f)) => Ok(f),
            _ => Err(TypeError::mismatch("float", format!("{s:?}"))),
        },
        other => Err(TypeError::mismatch("float", other.kind())),
    }
}

/// PostgreSQL text form of a float, specials included.
#[must_use]
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        (if value.is_sign_positive() { "Infinity" } else { "-Infinity" }).to_string()
    } else {
        value.to_string()
    }
}
