use once_cell::sync::Lazy;

use super::rules::{decimal_from_facets, quoted_capture, raw_capture, DefaultMatch, DefaultRule, FacetShape, TypeRule};
use super::{unsupported_float, DialectProfile};
use crate::config::DialectKind;
use crate::core::{LogicalType, Result};

static TYPE_RULES: Lazy<Vec<TypeRule>> = Lazy::new(|| {
    vec![
        TypeRule::new("bit", r"^bit\b", FacetShape::None, |_, _| LogicalType::Boolean),
        TypeRule::new("tinyint", r"^tinyint\b", FacetShape::FixedLimit(1), |_, _| LogicalType::Integer),
        TypeRule::new("smallint", r"^smallint\b", FacetShape::FixedLimit(2), |_, _| LogicalType::Integer),
        TypeRule::new("bigint", r"^bigint\b", FacetShape::FixedLimit(8), |_, _| LogicalType::Integer),
        TypeRule::new("int", r"^int\b", FacetShape::FixedLimit(4), |_, _| LogicalType::Integer),
        TypeRule::new("decimal", r"^(?:decimal|numeric)\b", FacetShape::PrecisionScale, decimal_from_facets),
        TypeRule::new("money", r"^(?:small)?money\b", FacetShape::None, |_, _| LogicalType::Money),
        TypeRule::new("float", r"^(?:float|real)\b", FacetShape::None, |_, _| LogicalType::Float),
        TypeRule::new(
            "datetime",
            r"^(?:datetime2|datetimeoffset|datetime|smalldatetime)\b",
            FacetShape::Precision,
            |_, _| LogicalType::DateTime,
        ),
        TypeRule::new("date", r"^date\b", FacetShape::None, |_, _| LogicalType::Date),
        TypeRule::new("time", r"^time\b", FacetShape::Precision, |_, _| LogicalType::Time),
        TypeRule::new("varchar_max", r"^n?varchar\s*\(\s*max\s*\)", FacetShape::None, |_, _| LogicalType::Text),
        TypeRule::new("varbinary_max", r"^varbinary\s*\(\s*max\s*\)", FacetShape::None, |_, _| LogicalType::Binary),
        TypeRule::new("text", r"^n?text\b", FacetShape::None, |_, _| LogicalType::Text),
        TypeRule::new("char", r"^n?(?:var)?char\b", FacetShape::Limit, |_, _| LogicalType::String),
        TypeRule::new("binary", r"^(?:var)?binary\b|^image\b", FacetShape::Limit, |_, _| LogicalType::Binary),
        TypeRule::new("rowversion", r"^(?:timestamp|rowversion)\b", FacetShape::None, |_, _| LogicalType::Binary),
        TypeRule::new("uuid", r"^uniqueidentifier\b", FacetShape::None, |_, _| LogicalType::Uuid),
        TypeRule::new("xml", r"^xml\b", FacetShape::None, |_, _| LogicalType::Xml),
        TypeRule::new(
            "clr",
            r"^(?:geography|geometry|hierarchyid|sql_variant)\b",
            FacetShape::None,
            |name, _| LogicalType::SpecializedString(name.to_string()),
        ),
    ]
});

// sys.default_constraints wraps every definition in parentheses
static DEFAULT_RULES: Lazy<Vec<DefaultRule>> = Lazy::new(|| {
    vec![
        DefaultRule::new("null", r"(?i)\A\(NULL\)\z", |_| DefaultMatch::Null),
        DefaultRule::new("quoted", r"(?s)\A\(N?'(.*)'\)\z", |caps| quoted_capture(caps, 1)),
        DefaultRule::new("numeric", r"\A\(\(?(-?\d+(?:\.\d+)?)\)?\)\z", |caps| raw_capture(caps, 1)),
    ]
});

#[derive(Debug, Clone, Copy, Default)]
pub struct MssqlProfile;

impl DialectProfile for MssqlProfile {
    fn kind(&self) -> DialectKind {
        DialectKind::Mssql
    }

    fn identifier_delimiters(&self) -> (char, char) {
        ('[', ']')
    }

    fn quoted_true(&self) -> &'static str {
        "1"
    }

    fn quoted_false(&self) -> &'static str {
        "0"
    }

    fn binary_literal(&self, bytes: &[u8]) -> String {
        format!("0x{}", hex::encode(bytes))
    }

    fn float_special(&self, value: f64, target: &LogicalType) -> Result<String> {
        Err(unsupported_float(value, target, DialectKind::Mssql))
    }

    fn string_prefix(&self, target: &LogicalType) -> &'static str {
        if target.is_string_like() { "N" } else { "" }
    }

    fn type_rules(&self) -> &'static [TypeRule] {
        &TYPE_RULES
    }

    fn default_rules(&self) -> &'static [DefaultRule] {
        &DEFAULT_RULES
    }
}
