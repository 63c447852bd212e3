use once_cell::sync::Lazy;

use super::rules::{decimal_from_facets, raw_capture, DefaultMatch, DefaultRule, FacetShape, TypeRule};
use super::{unsupported_float, DialectProfile};
use crate::config::DialectKind;
use crate::core::{LogicalType, Result};

/// Declared names first, then SQLite's column affinity rules (substring matches).
static TYPE_RULES: Lazy<Vec<TypeRule>> = Lazy::new(|| {
    vec![
        TypeRule::new("boolean", r"^bool(?:ean)?\b", FacetShape::None, |_, _| LogicalType::Boolean),
        TypeRule::new("datetime", r"^(?:datetime|timestamp)\b", FacetShape::Precision, |_, _| LogicalType::DateTime),
        TypeRule::new("date", r"^date\b", FacetShape::None, |_, _| LogicalType::Date),
        TypeRule::new("time", r"^time\b", FacetShape::Precision, |_, _| LogicalType::Time),
        TypeRule::new("decimal", r"^(?:decimal|numeric)\b", FacetShape::PrecisionScale, decimal_from_facets),
        TypeRule::new("json", r"^json\b", FacetShape::None, |_, _| LogicalType::Json),
        TypeRule::new("integer", r"int", FacetShape::FixedLimit(8), |_, _| LogicalType::Integer),
        TypeRule::new("varchar", r"^(?:var)?char|^character\b", FacetShape::Limit, |_, _| LogicalType::String),
        TypeRule::new("text", r"clob|text", FacetShape::None, |_, _| LogicalType::Text),
        TypeRule::new("blob", r"blob|^\s*$", FacetShape::None, |_, _| LogicalType::Binary),
        TypeRule::new("real", r"real|floa|doub", FacetShape::None, |_, _| LogicalType::Float),
    ]
});

static DEFAULT_RULES: Lazy<Vec<DefaultRule>> = Lazy::new(|| {
    vec![
        DefaultRule::new("null", r"(?i)\ANULL\z", |_| DefaultMatch::Null),
        DefaultRule::new("single_quoted", r"(?s)\A'(.*)'\z", |caps| {
            caps.get(1)
                .map_or(DefaultMatch::Null, |m| DefaultMatch::Literal(m.as_str().replace("''", "'")))
        }),
        DefaultRule::new("double_quoted", r#"(?s)\A"(.*)"\z"#, |caps| {
            caps.get(1)
                .map_or(DefaultMatch::Null, |m| DefaultMatch::Literal(m.as_str().replace("\"\"", "\"")))
        }),
        DefaultRule::new("numeric", r"\A-?\d+(?:\.\d*)?\z", |caps| raw_capture(caps, 0)),
        DefaultRule::new("boolean", r"(?i)\A(true|false)\z", |caps| raw_capture(caps, 1)),
        // Blob defaults surface as the bytea hex form the codec understands
        DefaultRule::new("blob", r"(?i)\Ax'([0-9a-f]*)'\z", |caps| {
            caps.get(1)
                .map_or(DefaultMatch::Null, |m| DefaultMatch::Literal(format!("\\x{}", m.as_str())))
        }),
    ]
});

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteProfile;

impl DialectProfile for SqliteProfile {
    fn kind(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn identifier_delimiters(&self) -> (char, char) {
        ('"', '"')
    }

    fn quoted_true(&self) -> &'static str {
        "1"
    }

    fn quoted_false(&self) -> &'static str {
        "0"
    }

    fn binary_literal(&self, bytes: &[u8]) -> String {
        format!("x'{}'", hex::encode(bytes))
    }

    fn float_special(&self, value: f64, target: &LogicalType) -> Result<String> {
        // SQLite stores NaN as NULL, so only the infinities have a literal
        if value.is_nan() || target.is_temporal() {
            return Err(unsupported_float(value, target, DialectKind::Sqlite));
        }
        Ok(if value.is_sign_positive() { "9e999" } else { "-9e999" }.to_string())
    }

    fn type_rules(&self) -> &'static [TypeRule] {
        &TYPE_RULES
    }

    fn default_rules(&self) -> &'static [DefaultRule] {
        &DEFAULT_RULES
    }
}
