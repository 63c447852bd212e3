use once_cell::sync::Lazy;

use super::rules::{decimal_from_facets, raw_capture, DefaultMatch, DefaultRule, FacetShape, RuleGate, RuleOptions, TypeRule};
use super::{unsupported_float, DialectProfile};
use crate::config::DialectKind;
use crate::core::{LogicalType, Result};

static TYPE_RULES: Lazy<Vec<TypeRule>> = Lazy::new(|| {
    vec![
        TypeRule::new("tinyint_bool", r"^tinyint\(1\)", FacetShape::None, |_, _| LogicalType::Boolean)
            .gated(RuleGate::EmulatedBooleans),
        TypeRule::new("boolean", r"^(?:bool|boolean)\b", FacetShape::None, |_, _| LogicalType::Boolean),
        TypeRule::new("bigint", r"^bigint\b", FacetShape::FixedLimit(8), |_, _| LogicalType::Integer),
        TypeRule::new("mediumint", r"^mediumint\b", FacetShape::FixedLimit(3), |_, _| LogicalType::Integer),
        TypeRule::new("smallint", r"^smallint\b", FacetShape::FixedLimit(2), |_, _| LogicalType::Integer),
        TypeRule::new("tinyint", r"^tinyint\b", FacetShape::FixedLimit(1), |_, _| LogicalType::Integer),
        TypeRule::new("int", r"^(?:int|integer)\b", FacetShape::FixedLimit(4), |_, _| LogicalType::Integer),
        TypeRule::new("decimal", r"^(?:decimal|numeric|fixed)\b", FacetShape::PrecisionScale, decimal_from_facets),
        TypeRule::new("float", r"^(?:float|double|real)\b", FacetShape::None, |_, _| LogicalType::Float),
        TypeRule::new("datetime", r"^(?:datetime|timestamp)\b", FacetShape::Precision, |_, _| LogicalType::DateTime),
        TypeRule::new("date", r"^date\b", FacetShape::None, |_, _| LogicalType::Date),
        TypeRule::new("time", r"^time\b", FacetShape::Precision, |_, _| LogicalType::Time),
        TypeRule::new("year", r"^year\b", FacetShape::FixedLimit(2), |_, _| LogicalType::Integer),
        TypeRule::new("enum", r"^(?:enum|set)\b", FacetShape::EnumMembers, |_, _| LogicalType::String),
        TypeRule::new("text", r"^(?:tiny|medium|long)?text\b", FacetShape::None, |_, _| LogicalType::Text),
        TypeRule::new("varchar", r"^(?:var)?char\b", FacetShape::Limit, |_, _| LogicalType::String),
        TypeRule::new("blob", r"^(?:tiny|medium|long)?blob\b", FacetShape::None, |_, _| LogicalType::Binary),
        TypeRule::new("binary", r"^(?:var)?binary\b", FacetShape::Limit, |_, _| LogicalType::Binary),
        TypeRule::new("bit", r"^bit\b", FacetShape::Limit, |_, facets| LogicalType::Bit(facets.limit)),
        TypeRule::new("json", r"^json\b", FacetShape::None, |_, _| LogicalType::Json),
        TypeRule::new(
            "spatial",
            r"^(?:geometry|point|linestring|polygon|multipoint|multilinestring|multipolygon|geometrycollection)\b",
            FacetShape::None,
            |name, _| LogicalType::SpecializedString(name.to_string()),
        ),
    ]
});

static DEFAULT_RULES: Lazy<Vec<DefaultRule>> = Lazy::new(|| {
    vec![
        DefaultRule::new("null", r"(?i)\ANULL\z", |_| DefaultMatch::Null),
        DefaultRule::new("current_timestamp", r"(?i)\ACURRENT_TIMESTAMP(?:\(\d?\))?\z", |_| DefaultMatch::Expression),
        // MariaDB 10.2.7+ reports string defaults quoted
        DefaultRule::new("quoted", r"(?s)\A'(.*)'\z", |caps| {
            caps.get(1).map_or(DefaultMatch::Null, |m| {
                DefaultMatch::Literal(m.as_str().replace("\\'", "'").replace("''", "'"))
            })
        }),
        // DEFAULT_GENERATED expressions
        DefaultRule::new("parenthesized", r"(?s)\A\(.*\)\z", |_| DefaultMatch::Expression),
        DefaultRule::new("function", r"(?s)\A\w+\(.*\)\z", |_| DefaultMatch::Expression),
        // MySQL reports everything else unquoted
        DefaultRule::new("bare", r"(?s)\A(.*)\z", |caps| raw_capture(caps, 1)),
    ]
});

#[derive(Debug, Clone, Copy)]
pub struct MysqlProfile {
    emulate_booleans: bool,
}

impl MysqlProfile {
    #[must_use]
    pub const fn new(emulate_booleans: bool) -> Self {
        Self { emulate_booleans }
    }
}

impl DialectProfile for MysqlProfile {
    fn kind(&self) -> DialectKind {
        DialectKind::Mysql
    }

    fn identifier_delimiters(&self) -> (char, char) {
        ('`', '`')
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
        Err(unsupported_float(value, target, DialectKind::Mysql))
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

    fn classify_mysql(sql_type: &str) -> (&'static str, LogicalType, Option<u32>) {
        let (rule, logical, facets) = classify(&TYPE_RULES, sql_type, RuleOptions::default()).unwrap();
        (rule.label, logical, facets.limit)
    }

    #[test]
    fn test_integer_widths() {
        assert_eq!(classify_mysql("bigint(20) unsigned"), ("bigint", LogicalType::Integer, Some(8)));
        assert_eq!(classify_mysql("int(11)"), ("int", LogicalType::Integer, Some(4)));
        assert_eq!(classify_mysql("tinyint(4)"), ("tinyint", LogicalType::Integer, Some(1)));
        assert_eq!(classify_mysql("tinyint(1)"), ("tinyint_bool", LogicalType::Boolean, None));
    }

    #[test]
    fn test_string_types() {
        assert_eq!(classify_mysql("varchar(255)"), ("varchar", LogicalType::String, Some(255)));
        assert_eq!(classify_mysql("mediumtext"), ("text", LogicalType::Text, None));
        assert_eq!(classify_mysql("enum('small','medium')"), ("enum", LogicalType::String, Some(6)));
        assert_eq!(classify_mysql("varbinary(16)"), ("binary", LogicalType::Binary, Some(16)));
    }

    #[test]
    fn test_decimal_without_scale() {
        let (_, logical, _) = classify_mysql("decimal(12,0)");
        assert_eq!(logical, LogicalType::DecimalWithoutScale { precision: Some(12) });
    }

    #[test]
    fn test_defaults() {
        let outcome = |raw: &str| first_default_match(&DEFAULT_RULES, raw).map(|(_, o)| o);
        assert_eq!(outcome("CURRENT_TIMESTAMP(6)"), Some(DefaultMatch::Expression));
        assert_eq!(outcome("current_timestamp()"), Some(DefaultMatch::Expression));
        assert_eq!(outcome("'it''s'"), Some(DefaultMatch::Literal("it's".into())));
        assert_eq!(outcome("(uuid())"), Some(DefaultMatch::Expression));
        assert_eq!(outcome("hello world"), Some(DefaultMatch::Literal("hello world".into())));
        assert_eq!(outcome("0"), Some(DefaultMatch::Literal("0".into())));
        assert_eq!(outcome("NULL"), Some(DefaultMatch::Null));
    }
}
