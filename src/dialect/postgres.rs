use once_cell::sync::Lazy;
use std::fmt::Write as _;

use super::rules::{decimal_from_facets, quoted_capture, raw_capture, DefaultMatch, DefaultRule, FacetShape, TypeRule};
use super::DialectProfile;
use crate::config::DialectKind;
use crate::core::{LogicalType, Result};

/// `format_type()` spellings, used when a column arrives without an oid.
static TYPE_RULES: Lazy<Vec<TypeRule>> = Lazy::new(|| {
    vec![
        TypeRule::new("varchar", r"^(?:character varying|varchar)\b", FacetShape::Limit, |_, _| LogicalType::String),
        TypeRule::new("char", r"^(?:character|char|bpchar)\b", FacetShape::Limit, |_, _| LogicalType::String),
        TypeRule::new("numeric", r"^(?:numeric|decimal)\b", FacetShape::PrecisionScale, decimal_from_facets),
        TypeRule::new("bigint", r"^(?:bigint|int8|bigserial)\b", FacetShape::FixedLimit(8), |_, _| LogicalType::Integer),
        TypeRule::new("smallint", r"^(?:smallint|int2|smallserial)\b", FacetShape::FixedLimit(2), |_, _| LogicalType::Integer),
        TypeRule::new("integer", r"^(?:integer|int4|int|serial)\b", FacetShape::FixedLimit(4), |_, _| LogicalType::Integer),
        TypeRule::new("oid", r"^oid\b", FacetShape::FixedLimit(8), |_, _| LogicalType::Integer),
        TypeRule::new("float", r"^(?:double precision|float8|real|float4|float)\b", FacetShape::None, |_, _| LogicalType::Float),
        TypeRule::new("boolean", r"^(?:boolean|bool)\b", FacetShape::None, |_, _| LogicalType::Boolean),
        TypeRule::new("timestamp", r"^timestamp\b", FacetShape::Precision, |_, _| LogicalType::DateTime),
        TypeRule::new("interval", r"^interval\b", FacetShape::Precision, |_, _| LogicalType::Interval),
        TypeRule::new("time", r"^time\b", FacetShape::Precision, |_, _| LogicalType::Time),
        TypeRule::new("date", r"^date\b", FacetShape::None, |_, _| LogicalType::Date),
        TypeRule::new("bytea", r"^bytea\b", FacetShape::None, |_, _| LogicalType::Binary),
        TypeRule::new("varbit", r"^(?:bit varying|varbit)\b", FacetShape::Limit, |_, _| LogicalType::BitVarying),
        TypeRule::new("bit", r"^bit\b", FacetShape::Limit, |_, facets| LogicalType::Bit(facets.limit)),
        TypeRule::new("text", r"^(?:text|citext|name)\b", FacetShape::None, |_, _| LogicalType::Text),
        TypeRule::new("money", r"^money\b", FacetShape::None, |_, _| LogicalType::Money),
        TypeRule::new("uuid", r"^uuid\b", FacetShape::None, |_, _| LogicalType::Uuid),
        TypeRule::new("jsonb", r"^jsonb\b", FacetShape::None, |_, _| LogicalType::Jsonb),
        TypeRule::new("json", r"^json\b", FacetShape::None, |_, _| LogicalType::Json),
        TypeRule::new("hstore", r"^hstore\b", FacetShape::None, |_, _| LogicalType::Hstore),
        TypeRule::new("xml", r"^xml\b", FacetShape::None, |_, _| LogicalType::Xml),
        TypeRule::new("cidr", r"^cidr\b", FacetShape::None, |_, _| LogicalType::Cidr),
        TypeRule::new("inet", r"^inet\b", FacetShape::None, |_, _| LogicalType::Inet),
        TypeRule::new("macaddr", r"^macaddr8?\b", FacetShape::None, |_, _| LogicalType::MacAddr),
        TypeRule::new("tsvector", r"^tsvector\b", FacetShape::None, |_, _| LogicalType::Tsvector),
        TypeRule::new(
            "geometric",
            r"^(?:point|line|lseg|box|path|polygon|circle|ltree)\b",
            FacetShape::None,
            |name, _| LogicalType::SpecializedString(name.to_string()),
        ),
    ]
});

static DEFAULT_RULES: Lazy<Vec<DefaultRule>> = Lazy::new(|| {
    vec![
        DefaultRule::new("null", r#"(?i)\ANULL(?:::[\w ."\[\]]+)?\z"#, |_| DefaultMatch::Null),
        // 'text'::type, B'0101'::"bit", ('x')::character varying[]
        DefaultRule::new("quoted", r#"(?s)\A[(B]?'(.*)'.*::"?([\w. ]+)"?(?:\[\])?\z"#, |caps| {
            let body = caps.get(1).map_or("", |m| m.as_str());
            let cast = caps.get(2).map_or("", |m| m.as_str());
            // 'now'::date is CURRENT_DATE evaluated at insert time
            if body == "now" && cast == "date" {
                DefaultMatch::Expression
            } else {
                quoted_capture(caps, 1)
            }
        }),
        DefaultRule::new("boolean", r"\A(true|false)\z", |caps| raw_capture(caps, 1)),
        DefaultRule::new("numeric", r"\A\(?(-?\d+(?:\.\d*)?)\)?(?:::bigint)?\z", |caps| raw_capture(caps, 1)),
        DefaultRule::new(
            "function",
            r"(?s)\w+\(.*\)|\(.*\)::\w+|CURRENT_DATE|CURRENT_TIMESTAMP",
            |_| DefaultMatch::Expression,
        ),
    ]
});

#[derive(Debug, Clone, Copy)]
pub struct PostgresProfile {
    hex_bytea: bool,
}

impl PostgresProfile {
    #[must_use]
    pub const fn new(hex_bytea: bool) -> Self {
        Self { hex_bytea }
    }
}

impl DialectProfile for PostgresProfile {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn identifier_delimiters(&self) -> (char, char) {
        ('"', '"')
    }

    fn quoted_true(&self) -> &'static str {
        "TRUE"
    }

    fn quoted_false(&self) -> &'static str {
        "FALSE"
    }

    fn supports_hex_escaped_bytea(&self) -> bool {
        self.hex_bytea
    }

    fn binary_literal(&self, bytes: &[u8]) -> String {
        if self.hex_bytea {
            return format!("E'\\\\x{}'::bytea", hex::encode(bytes));
        }
        // Pre-9.0 servers only understand the escape format
        let mut octal = String::with_capacity(bytes.len() * 5);
        for byte in bytes {
            let _ = write!(octal, "\\\\{byte:03o}");
        }
        format!("E'{octal}'::bytea")
    }

    fn float_special(&self, value: f64, _target: &LogicalType) -> Result<String> {
        let token = if value.is_nan() {
            "NaN"
        } else if value.is_sign_positive() {
            "Infinity"
        } else {
            "-Infinity"
        };
        Ok(format!("'{token}'"))
    }

    fn supports_infinite_temporals(&self) -> bool {
        true
    }

    fn type_rules(&self) -> &'static [TypeRule] {
        &TYPE_RULES
    }

    fn default_rules(&self) -> &'static [DefaultRule] {
        &DEFAULT_RULES
    }

    fn uses_catalog_ids(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::rules::{classify, first_default_match, RuleOptions};

    fn default_of(raw: &str) -> Option<DefaultMatch> {
        first_default_match(&DEFAULT_RULES, raw).map(|(_, outcome)| outcome)
    }

    #[test]
    fn test_octal_bytea_for_old_servers() {
        let profile = PostgresProfile::new(false);
        assert_eq!(profile.binary_literal(&[1, 8, 255]), "E'\\\\001\\\\010\\\\377'::bytea");
        assert_eq!(profile.binary_literal(&[]), "E''::bytea");
    }

    #[test]
    fn test_format_type_names() {
        let options = RuleOptions::default();
        let (_, logical, facets) = classify(&TYPE_RULES, "character varying(255)", options).unwrap();
        assert_eq!(logical, LogicalType::String);
        assert_eq!(facets.limit, Some(255));

        let (_, logical, _) = classify(&TYPE_RULES, "numeric(10,4)", options).unwrap();
        assert_eq!(logical, LogicalType::Decimal { precision: Some(10), scale: Some(4) });

        let (rule, _, facets) = classify(&TYPE_RULES, "timestamp(6) without time zone", options).unwrap();
        assert_eq!(rule.label, "timestamp");
        assert_eq!(facets.precision, Some(6));

        let (rule, _, _) = classify(&TYPE_RULES, "time with time zone", options).unwrap();
        assert_eq!(rule.label, "time");

        let (_, logical, _) = classify(&TYPE_RULES, "bit(8)", options).unwrap();
        assert_eq!(logical, LogicalType::Bit(Some(8)));

        let (_, logical, _) = classify(&TYPE_RULES, "jsonb", options).unwrap();
        assert_eq!(logical, LogicalType::Jsonb);
    }

    #[test]
    fn test_quoted_defaults() {
        assert_eq!(default_of("'foo'::character varying"), Some(DefaultMatch::Literal("foo".into())));
        assert_eq!(default_of("'it''s'::text"), Some(DefaultMatch::Literal("it's".into())));
        assert_eq!(default_of("B'0101'::\"bit\""), Some(DefaultMatch::Literal("0101".into())));
        assert_eq!(default_of("'{}'::integer[]"), Some(DefaultMatch::Literal("{}".into())));
        assert_eq!(default_of("'now'::date"), Some(DefaultMatch::Expression));
    }

    #[test]
    fn test_scalar_defaults() {
        assert_eq!(default_of("true"), Some(DefaultMatch::Literal("true".into())));
        assert_eq!(default_of("42"), Some(DefaultMatch::Literal("42".into())));
        assert_eq!(default_of("(-1)"), Some(DefaultMatch::Literal("-1".into())));
        assert_eq!(default_of("3.25"), Some(DefaultMatch::Literal("3.25".into())));
        assert_eq!(default_of("'9223372036854775807'::bigint"), Some(DefaultMatch::Literal("9223372036854775807".into())));
        assert_eq!(default_of("NULL::character varying"), Some(DefaultMatch::Null));
    }

    #[test]
    fn test_expression_defaults() {
        assert_eq!(default_of("nextval('users_id_seq'::regclass)"), Some(DefaultMatch::Expression));
        assert_eq!(default_of("now()"), Some(DefaultMatch::Expression));
        assert_eq!(default_of("CURRENT_TIMESTAMP"), Some(DefaultMatch::Expression));
        assert_eq!(default_of("gen_random_uuid()"), Some(DefaultMatch::Expression));
        assert_eq!(default_of("some_bare_word"), None);
    }
}
