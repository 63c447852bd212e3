use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Native in-memory value produced by decoding and consumed by encoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Null,
    // Numeric types
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Money(Decimal),
    // String types
    String(String),
    // Binary
    Binary(Vec<u8>),
    Bit(String),       // raw '0'/'1' digits
    // Boolean
    Boolean(bool),
    // Date/Time types
    Date(Temporal<NaiveDate>),
    Time(NaiveTime),
    DateTime(Temporal<NaiveDateTime>), // UTC when the source carried an offset
    Interval(PgInterval),
    // Containers
    Array(Vec<Value>),
    Range(Box<PgRange>),
    // Special types
    Uuid(Uuid),
    Json(serde_json::Value),
    Hstore(BTreeMap<String, Option<String>>),
    Inet(InetAddr),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Bit(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Variant name, used in `TypeMismatch` errors
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::Money(_) => "money",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::Bit(_) => "bit",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::DateTime(_) => "datetime",
            Self::Interval(_) => "interval",
            Self::Array(_) => "array",
            Self::Range(_) => "range",
            Self::Uuid(_) => "uuid",
            Self::Json(_) => "json",
            Self::Hstore(_) => "hstore",
            Self::Inet(_) => "inet",
        }
    }
}

/// Date/timestamp that may also be one of PostgreSQL's infinity markers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Temporal<T> {
    NegInfinity,
    Finite(T),
    Infinity,
}

impl<T> Temporal<T> {
    #[must_use]
    pub const fn finite(&self) -> Option<&T> {
        match self {
            Self::Finite(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_infinite(&self) -> bool {
        !matches!(self, Self::Finite(_))
    }
}

/// One side of a range. `Unbounded` is the "empty bound token", i.e. ±infinity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RangeBound {
    Unbounded,
    Inclusive(Value),
    Exclusive(Value),
}

impl RangeBound {
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Unbounded => None,
            Self::Inclusive(v) | Self::Exclusive(v) => Some(v),
        }
    }

    #[must_use]
    pub const fn is_inclusive(&self) -> bool {
        matches!(self, Self::Inclusive(_))
    }
}

/// Non-empty range value. Empty ranges decode to `Value::Null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PgRange {
    pub lower: RangeBound,
    pub upper: RangeBound,
}

impl PgRange {
    #[must_use]
    pub const fn new(lower: RangeBound, upper: RangeBound) -> Self {
        Self { lower, upper }
    }

    /// `lower..upper` with the end excluded
    #[must_use]
    pub const fn half_open(lower: Value, upper: Value) -> Self {
        Self::new(RangeBound::Inclusive(lower), RangeBound::Exclusive(upper))
    }

    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(RangeBound::Unbounded, RangeBound::Unbounded)
    }
}

/// Interval split the way PostgreSQL stores it: months, days and microseconds
/// do not convert into each other.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PgInterval {
    pub months: i32,
    pub days: i32,
    pub microseconds: i64,
}

impl PgInterval {
    #[must_use]
    pub const fn new(months: i32, days: i32, microseconds: i64) -> Self {
        Self { months, days, microseconds }
    }
}

/// Address with an optional network prefix (inet / cidr).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InetAddr {
    pub addr: IpAddr,
    pub prefix: u8,
}

impl InetAddr {
    #[must_use]
    pub const fn max_prefix(addr: &IpAddr) -> u8 {
        match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        }
    }

    #[must_use]
    pub const fn host(addr: IpAddr) -> Self {
        Self { addr, prefix: Self::max_prefix(&addr) }
    }

    #[must_use]
    pub const fn is_host(&self) -> bool {
        self.prefix == Self::max_prefix(&self.addr)
    }
}

impl std::fmt::Display for InetAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(r) => write!(f, "{r}"),
            Self::Decimal(d) | Self::Money(d) => write!(f, "{d}"),
            Self::String(s) | Self::Bit(s) => write!(f, "{s}"),
            Self::Binary(b) => write!(f, "\\x{}", hex::encode(b)),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Date(Temporal::Finite(d)) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(Temporal::Finite(t)) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S%.f")),
            Self::Date(Temporal::Infinity) | Self::DateTime(Temporal::Infinity) => write!(f, "infinity"),
            Self::Date(Temporal::NegInfinity) | Self::DateTime(Temporal::NegInfinity) => {
                write!(f, "-infinity")
            }
            Self::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Self::Interval(i) => write!(f, "{} mons {} days {} us", i.months, i.days, i.microseconds),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Range(r) => {
                let open = if r.lower.is_inclusive() { '[' } else { '(' };
                let close = if r.upper.is_inclusive() { ']' } else { ')' };
                write!(f, "{open}")?;
                if let Some(v) = r.lower.value() {
                    write!(f, "{v}")?;
                }
                write!(f, ",")?;
                if let Some(v) = r.upper.value() {
                    write!(f, "{v}")?;
                }
                write!(f, "{close}")
            }
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Json(j) => write!(f, "{j}"),
            Self::Hstore(h) => write!(f, "{h:?}"),
            Self::Inet(i) => write!(f, "{i}"),
        }
    }
}
