//! Value conversion between wire text, native values and SQL literals.
//!
//! Three directions are covered:
//! - `decode`/`decode_text`: driver text (PostgreSQL output format) to [`Value`]
//! - `format_text`: [`Value`] back to that text form
//! - `encode`: [`Value`] to a SQL literal for the session's dialect, with
//!   `decode_literal` as its inverse
//!
//! Empty text decodes to `Value::Null` for every type where an empty string is
//! not itself a valid value (numbers, booleans, temporals, uuid, json, network
//! types, arrays and ranges).

pub mod text;
pub mod numeric;
pub mod temporal;
pub mod binary;
pub mod array;
pub mod range;
pub mod hstore;
pub mod network;
pub mod literal;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::{LogicalType, Result, Temporal, TypeDescriptor, TypeError, Value};
use crate::dialect::DialectProfile;
use crate::quoting::QuotingEngine;
use literal::Literal;

/// Element delimiter of an array of `element`: `box` values contain commas.
fn array_delimiter(element: &LogicalType) -> char {
    match element {
        LogicalType::SpecializedString(name) if name == "box" => ';',
        _ => ',',
    }
}

const fn empty_is_null(logical: &LogicalType) -> bool {
    logical.is_numeric()
        || logical.is_temporal()
        || matches!(
            logical,
            LogicalType::Boolean
                | LogicalType::Interval
                | LogicalType::Uuid
                | LogicalType::Json
                | LogicalType::Jsonb
                | LogicalType::Cidr
                | LogicalType::Inet
                | LogicalType::MacAddr
                | LogicalType::Array(_)
                | LogicalType::Range(_)
        )
}

pub fn decode_boolean(text: &str) -> Result<Value> {
    match text.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "1" | "y" | "yes" | "on" => Ok(Value::Boolean(true)),
        "f" | "false" | "0" | "n" | "no" | "off" => Ok(Value::Boolean(false)),
        _ => Err(TypeError::malformed("boolean", text)),
    }
}

fn bool_of(value: &Value) -> Result<bool> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Integer(0) => Ok(false),
        Value::Integer(1) => Ok(true),
        Value::String(s) => decode_boolean(s).map(|v| v == Value::Boolean(true)),
        other => Err(TypeError::mismatch("boolean", other.kind())),
    }
}

/// Converts values for one session.
#[derive(Debug, Clone)]
pub struct ValueCodec {
    profile: Arc<dyn DialectProfile>,
    quoting: Arc<QuotingEngine>,
}

impl ValueCodec {
    #[must_use]
    pub fn new(profile: Arc<dyn DialectProfile>, quoting: Arc<QuotingEngine>) -> Self {
        Self { profile, quoting }
    }

    #[must_use]
    pub fn profile(&self) -> &Arc<dyn DialectProfile> {
        &self.profile
    }

    /// Decode a driver value; `None` is SQL NULL.
    pub fn decode(&self, raw: Option<&str>, descriptor: &TypeDescriptor) -> Result<Value> {
        match raw {
            None => Ok(Value::Null),
            Some(text) => self.decode_text(text, &descriptor.logical),
        }
    }

    pub fn decode_text(&self, text: &str, logical: &LogicalType) -> Result<Value> {
        if text.is_empty() && empty_is_null(logical) {
            return Ok(Value::Null);
        }

        match logical {
            LogicalType::Integer => numeric::decode_integer(text),
            LogicalType::Float => numeric::decode_float(text),
            LogicalType::Decimal { .. } => numeric::decode_decimal(text),
            LogicalType::DecimalWithoutScale { .. } => numeric::decode_decimal_without_scale(text),
            LogicalType::Money => numeric::decode_money(text),
            LogicalType::Boolean => decode_boolean(text),
            LogicalType::Binary => binary::decode_bytea(text),
            LogicalType::Bit(_) | LogicalType::BitVarying => binary::decode_bit(text),
            LogicalType::Date => temporal::decode_date(text),
            LogicalType::Time => temporal::decode_time(text),
            LogicalType::DateTime => temporal::decode_datetime(text),
            LogicalType::Interval => temporal::decode_interval(text),
            LogicalType::Array(element) => {
                array::decode_array(text, array_delimiter(element), &|item: &str| self.decode_text(item, element))
            }
            LogicalType::Range(subtype) => range::decode_range(text, &|bound: &str| self.decode_text(bound, subtype)),
            LogicalType::Uuid => Uuid::parse_str(text.trim())
                .map(Value::Uuid)
                .map_err(|_| TypeError::malformed("uuid", text)),
            LogicalType::Json | LogicalType::Jsonb => serde_json::from_str(text)
                .map(Value::Json)
                .map_err(|_| TypeError::malformed(logical.name(), text)),
            LogicalType::Hstore => hstore::decode_hstore(text),
            LogicalType::Cidr => network::decode_inet(text, true),
            LogicalType::Inet => network::decode_inet(text, false),
            LogicalType::MacAddr => network::decode_macaddr(text),
            LogicalType::String
            | LogicalType::Text
            | LogicalType::SpecializedString(_)
            | LogicalType::Xml
            | LogicalType::Tsvector
            | LogicalType::Unknown => Ok(Value::String(text.to_string())),
        }
    }

    /// PostgreSQL text form of `value`; `None` for NULL.
    pub fn format_text(&self, value: &Value, logical: &LogicalType) -> Result<Option<String>> {
        if value.is_null() {
            return Ok(None);
        }
        self.render(value, logical).map(Some)
    }

    fn render(&self, value: &Value, logical: &LogicalType) -> Result<String> {
        Ok(match value {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => numeric::format_float(*f),
            Value::Decimal(d) | Value::Money(d) => d.to_string(),
            Value::String(s) | Value::Bit(s) => s.clone(),
            Value::Binary(bytes) => binary::format_bytea(bytes),
            Value::Boolean(b) => (if *b { "t" } else { "f" }).to_string(),
            Value::Date(date) => temporal::format_date(date),
            Value::Time(time) => temporal::format_time(time),
            Value::DateTime(stamp) => temporal::format_datetime(stamp),
            Value::Interval(interval) => temporal::format_interval(interval),
            Value::Array(items) => {
                let element = logical.element().cloned().unwrap_or(LogicalType::Unknown);
                array::format_array(items, array_delimiter(&element), &|item: &Value| self.render(item, &element))?
            }
            Value::Range(range) => {
                let subtype = logical.element().cloned().unwrap_or(LogicalType::Unknown);
                range::format_range(range, &|bound: &Value| self.render(bound, &subtype))?
            }
            Value::Uuid(uuid) => uuid.to_string(),
            Value::Json(json) => json.to_string(),
            Value::Hstore(map) => hstore::format_hstore(map),
            Value::Inet(addr) => network::format_inet(addr, *logical == LogicalType::Cidr),
        })
    }

    /// SQL literal for `value` in a column of type `descriptor`.
    pub fn encode(&self, value: &Value, descriptor: &TypeDescriptor) -> Result<String> {
        if value.is_null() {
            return Ok("NULL".to_string());
        }
        let logical = &descriptor.logical;

        match logical {
            LogicalType::Integer => {
                let integer = match value {
                    Value::Boolean(b) => i64::from(*b),
                    other => numeric::integer_of(other)?,
                };
                numeric::check_integer_limit(integer, descriptor.facets.limit).map(|i| i.to_string())
            }
            LogicalType::Float => {
                let float = numeric::float_of(value)?;
                if float.is_finite() {
                    Ok(format!("{float:?}"))
                } else {
                    self.profile.float_special(float, logical)
                }
            }
            LogicalType::Decimal { scale, .. } => self.encode_decimal(value, *scale, logical),
            LogicalType::DecimalWithoutScale { .. } => self.encode_decimal(value, Some(0), logical),
            LogicalType::Money => numeric::decimal_of(value).map(|d| d.to_string()),
            LogicalType::Boolean => Ok(if bool_of(value)? {
                self.profile.quoted_true()
            } else {
                self.profile.quoted_false()
            }
            .to_string()),
            LogicalType::Binary => match value {
                Value::Binary(bytes) => Ok(self.profile.binary_literal(bytes)),
                Value::String(s) => Ok(self.profile.binary_literal(s.as_bytes())),
                other => Err(TypeError::mismatch("binary", other.kind())),
            },
            LogicalType::Bit(_) | LogicalType::BitVarying => match value {
                Value::Bit(digits) | Value::String(digits) => binary::encode_bit(digits),
                other => Err(TypeError::mismatch("bit string", other.kind())),
            },
            LogicalType::Date => self.encode_date(value),
            LogicalType::Time => self.encode_time(value),
            LogicalType::DateTime => self.encode_datetime(value),
            LogicalType::Interval => match value {
                Value::Interval(interval) => Ok(self.quoting.quote_string(&temporal::format_interval(interval))),
                Value::String(s) => self.reencode(&temporal::decode_interval(s)?, descriptor),
                other => Err(TypeError::mismatch("interval", other.kind())),
            },
            LogicalType::Array(_) | LogicalType::Range(_) => match value {
                Value::Array(_) | Value::Range(_) => Ok(self.quoting.quote_string(&self.render(value, logical)?)),
                other => Err(TypeError::mismatch(logical.name(), other.kind())),
            },
            LogicalType::Uuid => match value {
                Value::Uuid(uuid) => Ok(self.quoting.quote_string(&uuid.to_string())),
                Value::String(s) => self.reencode(&self.decode_text(s, logical)?, descriptor),
                other => Err(TypeError::mismatch("uuid", other.kind())),
            },
            LogicalType::Json | LogicalType::Jsonb => match value {
                Value::Json(json) => Ok(self.quoting.quote_string(&json.to_string())),
                Value::String(s) => self.reencode(&self.decode_text(s, logical)?, descriptor),
                other => Err(TypeError::mismatch(logical.name(), other.kind())),
            },
            LogicalType::Hstore => match value {
                Value::Hstore(map) => Ok(self.quoting.quote_string(&hstore::format_hstore(map))),
                other => Err(TypeError::mismatch("hstore", other.kind())),
            },
            LogicalType::Cidr | LogicalType::Inet => match value {
                Value::Inet(_) => Ok(self.quoting.quote_string(&self.render(value, logical)?)),
                Value::String(s) => self.reencode(&self.decode_text(s, logical)?, descriptor),
                other => Err(TypeError::mismatch(logical.name(), other.kind())),
            },
            LogicalType::MacAddr => match value {
                Value::String(s) => match network::decode_macaddr(s)? {
                    Value::String(normalized) => Ok(self.quoting.quote_string(&normalized)),
                    other => Err(TypeError::mismatch("macaddr", other.kind())),
                },
                other => Err(TypeError::mismatch("macaddr", other.kind())),
            },
            LogicalType::String
            | LogicalType::Text
            | LogicalType::SpecializedString(_)
            | LogicalType::Xml
            | LogicalType::Tsvector
            | LogicalType::Unknown => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Integer(i) => i.to_string(),
                    Value::Decimal(d) => d.to_string(),
                    Value::Float(f) if f.is_finite() => f.to_string(),
                    Value::Uuid(uuid) => uuid.to_string(),
                    other => return Err(TypeError::mismatch(logical.name(), other.kind())),
                };
                Ok(format!("{}{}", self.profile.string_prefix(logical), self.quoting.quote_string(&text)))
            }
        }
    }

    /// Encode a value obtained by parsing a string input. A parse that yields
    /// NULL (empty input) encodes as NULL.
    fn reencode(&self, parsed: &Value, descriptor: &TypeDescriptor) -> Result<String> {
        if matches!(parsed, Value::String(_)) {
            return Err(TypeError::mismatch(descriptor.logical.name(), "string"));
        }
        self.encode(parsed, descriptor)
    }

    fn encode_decimal(&self, value: &Value, scale: Option<u32>, logical: &LogicalType) -> Result<String> {
        if let Value::Float(f) = value {
            if !f.is_finite() {
                return self.profile.float_special(*f, logical);
            }
        }
        let decimal: Decimal = numeric::decimal_of(value)?;
        let rounded = scale.map_or(decimal, |s| decimal.round_dp_with_strategy(s, RoundingStrategy::MidpointAwayFromZero));
        Ok(rounded.to_string())
    }

    fn infinite_temporal<T>(&self, value: &Temporal<T>, logical: &LogicalType) -> Result<String> {
        let marker = if matches!(value, Temporal::Infinity) { "infinity" } else { "-infinity" };
        if self.profile.supports_infinite_temporals() {
            Ok(self.quoting.quote_string(marker))
        } else {
            Err(TypeError::mismatch(
                format!("finite {logical} on {}", self.profile.kind().as_str()),
                marker,
            ))
        }
    }

    fn encode_date(&self, value: &Value) -> Result<String> {
        let date: Temporal<NaiveDate> = match value {
            Value::Date(date) => *date,
            Value::Float(f) if !f.is_finite() => return self.profile.float_special(*f, &LogicalType::Date),
            Value::DateTime(Temporal::Finite(stamp)) => Temporal::Finite(stamp.date()),
            Value::DateTime(Temporal::Infinity) => Temporal::Infinity,
            Value::DateTime(Temporal::NegInfinity) => Temporal::NegInfinity,
            Value::String(s) => match temporal::decode_date(s)? {
                Value::Date(date) => date,
                _ => return Ok("NULL".to_string()),
            },
            other => return Err(TypeError::mismatch("date", other.kind())),
        };
        match date {
            Temporal::Finite(_) => Ok(self.quoting.quote_string(&temporal::format_date(&date))),
            infinite => self.infinite_temporal(&infinite, &LogicalType::Date),
        }
    }

    fn encode_time(&self, value: &Value) -> Result<String> {
        let time: NaiveTime = match value {
            Value::Time(time) => *time,
            Value::DateTime(Temporal::Finite(stamp)) => stamp.time(),
            Value::String(s) => match temporal::decode_time(s)? {
                Value::Time(time) => time,
                _ => return Ok("NULL".to_string()),
            },
            other => return Err(TypeError::mismatch("time", other.kind())),
        };
        Ok(self.quoting.quote_string(&temporal::format_time(&time)))
    }

    fn encode_datetime(&self, value: &Value) -> Result<String> {
        let stamp: Temporal<NaiveDateTime> = match value {
            Value::DateTime(stamp) => *stamp,
            Value::Float(f) if !f.is_finite() => return self.profile.float_special(*f, &LogicalType::DateTime),
            Value::Date(Temporal::Finite(date)) => Temporal::Finite(date.and_time(NaiveTime::default())),
            Value::Date(Temporal::Infinity) => Temporal::Infinity,
            Value::Date(Temporal::NegInfinity) => Temporal::NegInfinity,
            Value::String(s) => match temporal::decode_datetime(s)? {
                Value::DateTime(stamp) => stamp,
                _ => return Ok("NULL".to_string()),
            },
            other => return Err(TypeError::mismatch("datetime", other.kind())),
        };
        match stamp {
            Temporal::Finite(_) => Ok(self.quoting.quote_string(&temporal::format_datetime(&stamp))),
            infinite => self.infinite_temporal(&infinite, &LogicalType::DateTime),
        }
    }

    /// Inverse of [`encode`](Self::encode): parse a SQL literal back into a value.
    pub fn decode_literal(&self, literal: &str, descriptor: &TypeDescriptor) -> Result<Value> {
        let logical = &descriptor.logical;
        match literal::parse_literal(literal, self.quoting.escape_mode())? {
            Literal::Null => Ok(Value::Null),
            Literal::Boolean(b) => match logical {
                LogicalType::Integer => Ok(Value::Integer(i64::from(b))),
                _ => self.decode_text(if b { "t" } else { "f" }, logical),
            },
            Literal::Number(number) => self.decode_text(&number, logical),
            Literal::Text(text) => self.decode_text(&text, logical),
            Literal::Hex(digits) => match logical {
                LogicalType::Binary => hex::decode(&digits)
                    .map(Value::Binary)
                    .map_err(|_| TypeError::malformed("binary", literal)),
                LogicalType::Bit(_) | LogicalType::BitVarying => binary::decode_bit(&format!("0x{digits}")),
                other => Err(TypeError::mismatch(other.name(), "hex literal")),
            },
            Literal::Bits(digits) => binary::decode_bit(&digits),
            Literal::Special(float) => Ok(Value::Float(float)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CodecSettings, DialectKind};
    use crate::core::{PgInterval, PgRange};
    use crate::dialect::profile_for;
    use crate::quoting::SessionFlags;

    fn codec(kind: DialectKind) -> ValueCodec {
        let settings = CodecSettings::for_dialect(kind);
        let profile = profile_for(&settings);
        let flags = Arc::new(SessionFlags::new(settings.initial_backslash_escaping()));
        let quoting = Arc::new(QuotingEngine::new(Arc::clone(&profile), flags, 16));
        ValueCodec::new(profile, quoting)
    }

    fn of(logical: LogicalType) -> TypeDescriptor {
        TypeDescriptor::of(logical)
    }

    #[test]
    fn test_empty_text_is_null_for_non_strings() {
        let pg = codec(DialectKind::Postgres);
        for logical in [LogicalType::Integer, LogicalType::Boolean, LogicalType::Date, LogicalType::Uuid] {
            assert_eq!(pg.decode_text("", &logical).unwrap(), Value::Null);
        }
        assert_eq!(pg.decode_text("", &LogicalType::Text).unwrap(), Value::String(String::new()));
        assert_eq!(pg.decode(None, &of(LogicalType::Text)).unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_driver_text() {
        let pg = codec(DialectKind::Postgres);
        assert_eq!(pg.decode(Some("t"), &of(LogicalType::Boolean)).unwrap(), Value::Boolean(true));
        assert_eq!(
            pg.decode(Some("{1,2}"), &of(LogicalType::array_of(LogicalType::Integer))).unwrap(),
            Value::Array(vec![Value::Integer(1), Value::Integer(2)])
        );
        assert!(matches!(
            pg.decode(Some("{\"a\":1}"), &of(LogicalType::Jsonb)).unwrap(),
            Value::Json(_)
        ));
        assert!(matches!(
            pg.decode(Some("nope"), &of(LogicalType::Uuid)),
            Err(TypeError::MalformedLiteral { .. })
        ));
    }

    #[test]
    fn test_format_text() {
        let pg = codec(DialectKind::Postgres);
        let array = Value::Array(vec![Value::String("a b".into()), Value::Null]);
        assert_eq!(
            pg.format_text(&array, &LogicalType::array_of(LogicalType::Text)).unwrap(),
            Some(r#"{"a b",NULL}"#.to_string())
        );
        assert_eq!(pg.format_text(&Value::Null, &LogicalType::Text).unwrap(), None);
        assert_eq!(
            pg.format_text(&Value::Boolean(false), &LogicalType::Boolean).unwrap(),
            Some("f".to_string())
        );
    }

    #[test]
    fn test_encode_booleans_per_dialect() {
        let boolean = of(LogicalType::Boolean);
        assert_eq!(codec(DialectKind::Postgres).encode(&Value::Boolean(true), &boolean).unwrap(), "TRUE");
        assert_eq!(codec(DialectKind::Mysql).encode(&Value::Boolean(true), &boolean).unwrap(), "1");
        assert_eq!(codec(DialectKind::Oracle).encode(&Value::Boolean(false), &boolean).unwrap(), "0");
    }

    #[test]
    fn test_encode_integer_limits() {
        let pg = codec(DialectKind::Postgres);
        let smallint = of(LogicalType::Integer).with_facets(crate::core::TypeFacets::limit(2));
        assert_eq!(pg.encode(&Value::Integer(32_767), &smallint).unwrap(), "32767");
        assert!(matches!(pg.encode(&Value::Integer(40_000), &smallint), Err(TypeError::TypeMismatch { .. })));
    }

    #[test]
    fn test_encode_strings() {
        let text = of(LogicalType::String);
        assert_eq!(codec(DialectKind::Postgres).encode(&Value::String("it's".into()), &text).unwrap(), "'it''s'");
        assert_eq!(codec(DialectKind::Mssql).encode(&Value::String("x".into()), &text).unwrap(), "N'x'");
        assert_eq!(codec(DialectKind::Mysql).encode(&Value::String("a\\b".into()), &text).unwrap(), "'a\\\\b'");
        assert!(matches!(
            codec(DialectKind::Postgres).encode(&Value::Boolean(true), &text),
            Err(TypeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_infinite_temporals() {
        let date = of(LogicalType::Date);
        let infinity = Value::Date(Temporal::Infinity);
        assert_eq!(codec(DialectKind::Postgres).encode(&infinity, &date).unwrap(), "'infinity'");
        assert!(matches!(codec(DialectKind::Mysql).encode(&infinity, &date), Err(TypeError::TypeMismatch { .. })));

        // float specials headed for temporal columns
        let stamp = of(LogicalType::DateTime);
        assert_eq!(codec(DialectKind::Postgres).encode(&Value::Float(f64::INFINITY), &stamp).unwrap(), "'Infinity'");
        assert!(codec(DialectKind::Oracle).encode(&Value::Float(f64::INFINITY), &stamp).is_err());
        assert!(codec(DialectKind::Sqlite).encode(&Value::Float(f64::NEG_INFINITY), &stamp).is_err());
    }

    #[test]
    fn test_decimal_encoding_rounds_to_scale() {
        let pg = codec(DialectKind::Postgres);
        let money = of(LogicalType::Decimal { precision: Some(10), scale: Some(2) });
        assert_eq!(pg.encode(&Value::Decimal(Decimal::new(12_345, 3)), &money).unwrap(), "12.35");
        assert_eq!(pg.encode(&Value::Float(f64::NAN), &money).unwrap(), "'NaN'");
    }

    #[test]
    fn test_bit_quirk() {
        let pg = codec(DialectKind::Postgres);
        let bits = of(LogicalType::BitVarying);
        assert_eq!(pg.encode(&Value::String("1F".into()), &bits).unwrap(), "X'1F'");
        assert_eq!(pg.decode_literal("X'1F'", &bits).unwrap(), Value::Bit("11111".into()));
    }

    #[test]
    fn test_literal_round_trips() {
        let pg = codec(DialectKind::Postgres);
        let cases = vec![
            (Value::Integer(-7), LogicalType::Integer),
            (Value::Float(0.1), LogicalType::Float),
            (Value::Float(f64::NEG_INFINITY), LogicalType::Float),
            (Value::Decimal(Decimal::new(1050, 2)), LogicalType::Decimal { precision: None, scale: None }),
            (Value::String("it's \\ here".into()), LogicalType::Text),
            (Value::Binary(vec![0, 1, 255]), LogicalType::Binary),
            (Value::Boolean(false), LogicalType::Boolean),
            (Value::Interval(PgInterval::new(1, 2, 3)), LogicalType::Interval),
            (
                Value::Range(Box::new(PgRange::half_open(Value::Integer(1), Value::Integer(5)))),
                LogicalType::range_of(LogicalType::Integer),
            ),
            (
                Value::Array(vec![Value::String("x,y".into()), Value::Null]),
                LogicalType::array_of(LogicalType::Text),
            ),
        ];
        for (value, logical) in cases {
            let descriptor = of(logical);
            let literal = pg.encode(&value, &descriptor).unwrap();
            assert_eq!(pg.decode_literal(&literal, &descriptor).unwrap(), value, "{literal}");
        }
    }
}
