use once_cell::sync::Lazy;
use regex::Regex;

use super::rules::{quoted_capture, raw_capture, DefaultMatch, DefaultRule, FacetShape, RuleGate, RuleOptions, TypeRule};
use super::{unsupported_float, DialectProfile};
use crate::config::DialectKind;
use crate::core::{LogicalType, Result, TypeFacets};

/// Unquoted identifiers Oracle folds to upper case
static SIMPLE_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\A[a-z][a-z0-9_$#]*\z").unwrap_or_else(|e| panic!("invalid identifier pattern: {e}"))
});

/// NUMBER(p) and NUMBER(p,0) hold integers; bare NUMBER is arbitrary precision.
fn number_type(_name: &str, facets: &TypeFacets) -> LogicalType {
    match (facets.precision, facets.scale) {
        (Some(_), Some(0)) => LogicalType::Integer,
        (precision, scale) => LogicalType::Decimal { precision, scale },
    }
}

static TYPE_RULES: Lazy<Vec<TypeRule>> = Lazy::new(|| {
    vec![
        TypeRule::new("number_bool", r"^number\(1\)\s*$", FacetShape::None, |_, _| LogicalType::Boolean)
            .gated(RuleGate::EmulatedBooleans),
        TypeRule::new("number", r"^(?:number|numeric|decimal)\b", FacetShape::PrecisionScale, number_type),
        TypeRule::new("integer", r"^(?:integer|int|smallint)\b", FacetShape::None, |_, _| LogicalType::Integer),
        TypeRule::new("float", r"^(?:binary_float|binary_double|float)\b", FacetShape::None, |_, _| LogicalType::Float),
        TypeRule::new("timestamp", r"^timestamp\b", FacetShape::Precision, |_, _| LogicalType::DateTime),
        // DATE carries a time of day
        TypeRule::new("date", r"^date\b", FacetShape::None, |_, _| LogicalType::DateTime),
        TypeRule::new("interval", r"^interval\b", FacetShape::None, |_, _| LogicalType::Interval),
        TypeRule::new("clob", r"^(?:n?clob|long)\s*$", FacetShape::None, |_, _| LogicalType::Text),
        TypeRule::new("varchar", r"^(?:n?varchar2?|n?char)\b", FacetShape::Limit, |_, _| LogicalType::String),
        TypeRule::new("raw", r"^(?:blob|raw|long raw)\b", FacetShape::Limit, |_, _| LogicalType::Binary),
        TypeRule::new("xml", r"^xmltype\b", FacetShape::None, |_, _| LogicalType::Xml),
        TypeRule::new("rowid", r"^u?rowid\b", FacetShape::None, |name, _| LogicalType::SpecializedString(name.to_string())),
    ]
});

// all_tab_columns.data_default keeps trailing whitespace/newlines
static DEFAULT_RULES: Lazy<Vec<DefaultRule>> = Lazy::new(|| {
    vec![
        DefaultRule::new("null", r"(?i)\A\s*NULL\s*\z", |_| DefaultMatch::Null),
        DefaultRule::new("quoted", r"(?s)\A\s*'(.*)'\s*\z", |caps| quoted_capture(caps, 1)),
        DefaultRule::new("numeric", r"\A\s*\(?(-?\d+(?:\.\d+)?)\)?\s*\z", |caps| raw_capture(caps, 1)),
    ]
});

#[derive(Debug, Clone, Copy)]
pub struct OracleProfile {
    emulate_booleans: bool,
}

impl OracleProfile {
    #[must_use]
    pub const fn new(emulate_booleans: bool) -> Self {
        Self { emulate_booleans }
    }
}

impl DialectProfile for OracleProfile {
    fn kind(&self) -> DialectKind {
        DialectKind::Oracle
    }

    fn identifier_delimiters(&self) -> (char, char) {
        ('"', '"')
    }

    fn fold_identifier(&self, name: &str) -> String {
        if SIMPLE_IDENTIFIER.is_match(name) {
            name.to_uppercase()
        } else {
            name.to_string()
        }
    }

    fn quoted_true(&self) -> &'static str {
        "1"
    }

    fn quoted_false(&self) -> &'static str {
        "0"
    }

    fn binary_literal(&self, bytes: &[u8]) -> String {
        format!("hextoraw('{}')", hex::encode(bytes))
    }

    fn float_special(&self, value: f64, target: &LogicalType) -> Result<String> {
        if target.is_temporal() {
            return Err(unsupported_float(value, target, DialectKind::Oracle));
        }
        let literal = if value.is_nan() {
            "BINARY_DOUBLE_NAN"
        } else if value.is_sign_positive() {
            "BINARY_DOUBLE_INFINITY"
        } else {
            "-BINARY_DOUBLE_INFINITY"
        };
        Ok(literal.to_string())
    }

    fn type_rules(&self) -> &'static [TypeRule] {
        &TYPE_RULES
    }

    fn default_rules(&self) -> &'static [DefaultRule] {
        &DEFAULT_RULES
    }

    fn rule_options(&self) -> RuleOptions {
        RuleOptions { emulate_booleans: self.emulate_booleans }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::rules::{classify, first_default_match};

    #[test]
    fn test_number_classification() {
        let options = RuleOptions::default();
        let (_, logical, _) = classify(&TYPE_RULES, "NUMBER(10)", options).unwrap();
        assert_eq!(logical, LogicalType::Integer);

        let (_, logical, _) = classify(&TYPE_RULES, "NUMBER(10,2)", options).unwrap();
        assert_eq!(logical, LogicalType::Decimal { precision: Some(10), scale: Some(2) });

        let (_, logical, _) = classify(&TYPE_RULES, "NUMBER", options).unwrap();
        assert_eq!(logical, LogicalType::Decimal { precision: None, scale: None });

        let (_, logical, _) = classify(&TYPE_RULES, "NUMBER(1)", options).unwrap();
        assert_eq!(logical, LogicalType::Boolean);

        let plain = RuleOptions { emulate_booleans: false };
        let (_, logical, _) = classify(&TYPE_RULES, "NUMBER(1)", plain).unwrap();
        assert_eq!(logical, LogicalType::Integer);
    }

    #[test]
    fn test_character_types() {
        let (_, logical, facets) = classify(&TYPE_RULES, "VARCHAR2(255 CHAR)", RuleOptions::default()).unwrap();
        assert_eq!(logical, LogicalType::String);
        assert_eq!(facets.limit, Some(255));

        let (_, logical, _) = classify(&TYPE_RULES, "CLOB", RuleOptions::default()).unwrap();
        assert_eq!(logical, LogicalType::Text);
    }

    #[test]
    fn test_identifier_folding() {
        let profile = OracleProfile::new(true);
        assert_eq!(profile.fold_identifier("users"), "USERS");
        assert_eq!(profile.fold_identifier("MixedCase"), "MixedCase");
        assert_eq!(profile.fold_identifier("with space"), "with space");
    }

    #[test]
    fn test_temporal_float_special_rejected() {
        let profile = OracleProfile::new(true);
        assert!(profile.float_special(f64::INFINITY, &LogicalType::DateTime).is_err());
    }

    #[test]
    fn test_defaults_with_trailing_whitespace() {
        let outcome = |raw: &str| first_default_match(&DEFAULT_RULES, raw).map(|(_, o)| o);
        assert_eq!(outcome("'active' \n"), Some(DefaultMatch::Literal("active".into())));
        assert_eq!(outcome("0 "), Some(DefaultMatch::Literal("0".into())));
        assert_eq!(outcome("NULL "), Some(DefaultMatch::Null));
        assert_eq!(outcome("sysdate"), None);
    }
}
