use serde::{Deserialize, Serialize};

/// Dialect-agnostic classification a native column type is mapped onto.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LogicalType {
    // Numeric types
    Integer,
    Float,
    Decimal { precision: Option<u32>, scale: Option<u32> },
    /// NUMERIC(p) / NUMERIC(p,0): integral values stored as decimal
    DecimalWithoutScale { precision: Option<u32> },
    Money,
    // String types
    String,
    Text,
    /// Opaque string-backed types (point, ltree, enums, ...), tagged by native name
    SpecializedString(String),
    // Binary
    Binary,
    Bit(Option<u32>),
    BitVarying,
    // Boolean
    Boolean,
    // Date/Time types
    Date,
    Time,
    DateTime,
    Interval,
    // Containers
    Array(Box<LogicalType>),
    Range(Box<LogicalType>),
    // Special types
    Uuid,
    Json,
    Jsonb,
    Hstore,
    Xml,
    Cidr,
    Inet,
    MacAddr,
    Tsvector,
    Unknown,
}

impl LogicalType {
    #[must_use]
    pub fn array_of(element: Self) -> Self {
        Self::Array(Box::new(element))
    }

    #[must_use]
    pub fn range_of(subtype: Self) -> Self {
        Self::Range(Box::new(subtype))
    }

    /// Element type for arrays, subtype for ranges.
    #[must_use]
    pub fn element(&self) -> Option<&Self> {
        match self {
            Self::Array(inner) | Self::Range(inner) => Some(inner),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::DateTime)
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::Float
                | Self::Decimal { .. }
                | Self::DecimalWithoutScale { .. }
                | Self::Money
        )
    }

    /// Types whose values travel as plain strings in both directions.
    #[must_use]
    pub const fn is_string_like(&self) -> bool {
        matches!(
            self,
            Self::String
                | Self::Text
                | Self::SpecializedString(_)
                | Self::Xml
                | Self::Tsvector
                | Self::Unknown
        )
    }

    /// Short name used in error messages and logs
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Integer => "integer".to_string(),
            Self::Float => "float".to_string(),
            Self::Decimal { .. } => "decimal".to_string(),
            Self::DecimalWithoutScale { .. } => "decimal (no scale)".to_string(),
            Self::Money => "money".to_string(),
            Self::String => "string".to_string(),
            Self::Text => "text".to_string(),
            Self::SpecializedString(tag) => tag.clone(),
            Self::Binary => "binary".to_string(),
            Self::Bit(_) => "bit".to_string(),
            Self::BitVarying => "bit varying".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Date => "date".to_string(),
            Self::Time => "time".to_string(),
            Self::DateTime => "datetime".to_string(),
            Self::Interval => "interval".to_string(),
            Self::Array(inner) => format!("{}[]", inner.name()),
            Self::Range(inner) => format!("range<{}>", inner.name()),
            Self::Uuid => "uuid".to_string(),
            Self::Json => "json".to_string(),
            Self::Jsonb => "jsonb".to_string(),
            Self::Hstore => "hstore".to_string(),
            Self::Xml => "xml".to_string(),
            Self::Cidr => "cidr".to_string(),
            Self::Inet => "inet".to_string(),
            Self::MacAddr => "macaddr".to_string(),
            Self::Tsvector => "tsvector".to_string(),
            Self::Unknown => "unknown".to_string(),
        }
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
