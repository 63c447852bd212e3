//! Ordered "first match wins" rule lists.
//!
//! Type rules classify a declared type string (`varchar(255)`, `NUMBER(10,2)`)
//! into a logical type plus facets. Default rules classify catalog-reported
//! column defaults. Both are plain data so rule order can be inspected and
//! tested on its own.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::core::{LogicalType, TypeFacets};

/// `(p)` or `(p, s)` right after the type name
static TYPE_PARAMS: Lazy<Regex> =
    Lazy::new(|| compile(r"\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\)"));
/// Members of `enum('a','b')` / `set(...)`
static ENUM_MEMBER: Lazy<Regex> = Lazy::new(|| compile(r"'((?:[^']|'')*)'"));

fn compile(pattern: &str) -> Regex {
    // Only ever called with string literals from this crate; every pattern is
    // exercised by the rule-order tests.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

/// Which facets the parenthesised part of a declared type carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetShape {
    None,
    Limit,
    Precision,
    PrecisionScale,
    /// Byte width implied by the type name itself (tinyint = 1, bigint = 8)
    FixedLimit(u32),
    /// Longest member of an enum/set declaration
    EnumMembers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleGate {
    Always,
    /// Only active when `tinyint(1)` / `NUMBER(1)` are read as booleans
    EmulatedBooleans,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOptions {
    pub emulate_booleans: bool,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self { emulate_booleans: true }
    }
}

type Resolve = fn(&str, &TypeFacets) -> LogicalType;

#[derive(Debug)]
pub struct TypeRule {
    pub label: &'static str,
    pub pattern: Regex,
    pub facets: FacetShape,
    pub gate: RuleGate,
    resolve: Resolve,
}

impl TypeRule {
    /// `pattern` is matched case-insensitively against the trimmed declared type.
    pub fn new(label: &'static str, pattern: &str, facets: FacetShape, resolve: Resolve) -> Self {
        Self {
            label,
            pattern: compile(&format!("(?i){pattern}")),
            facets,
            gate: RuleGate::Always,
            resolve,
        }
    }

    #[must_use]
    pub const fn gated(mut self, gate: RuleGate) -> Self {
        self.gate = gate;
        self
    }

    #[must_use]
    pub fn matches(&self, sql_type: &str, options: RuleOptions) -> bool {
        let enabled = match self.gate {
            RuleGate::Always => true,
            RuleGate::EmulatedBooleans => options.emulate_booleans,
        };
        enabled && self.pattern.is_match(sql_type.trim())
    }

    #[must_use]
    pub fn build(&self, sql_type: &str) -> (LogicalType, TypeFacets) {
        let facets = extract_facets(sql_type, self.facets);
        let logical = (self.resolve)(&base_name(sql_type), &facets);
        (logical, facets)
    }
}

/// Evaluate `rules` in order; the first enabled rule whose pattern matches wins.
#[must_use]
pub fn classify<'r>(
    rules: &'r [TypeRule],
    sql_type: &str,
    options: RuleOptions,
) -> Option<(&'r TypeRule, LogicalType, TypeFacets)> {
    rules
        .iter()
        .find(|rule| rule.matches(sql_type, options))
        .map(|rule| {
            let (logical, facets) = rule.build(sql_type);
            (rule, logical, facets)
        })
}

/// Lowercased type name without its parameter list: `NUMERIC(10, 2)` -> `numeric`
#[must_use]
pub fn base_name(sql_type: &str) -> String {
    let head = sql_type.split('(').next().unwrap_or(sql_type);
    head.trim().to_lowercase()
}

#[must_use]
pub fn extract_facets(sql_type: &str, shape: FacetShape) -> TypeFacets {
    let params = TYPE_PARAMS.captures(sql_type).map(|caps| {
        let first = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
        let second = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
        (first, second)
    });

    match shape {
        FacetShape::None => TypeFacets::none(),
        FacetShape::Limit => TypeFacets {
            limit: params.and_then(|(first, _)| first),
            ..TypeFacets::none()
        },
        FacetShape::Precision => TypeFacets {
            precision: params.and_then(|(first, _)| first),
            ..TypeFacets::none()
        },
        FacetShape::PrecisionScale => match params {
            // `decimal(10)` has an implicit scale of 0
            Some((Some(precision), scale)) => TypeFacets {
                precision: Some(precision),
                scale: Some(scale.unwrap_or(0)),
                limit: None,
            },
            _ => TypeFacets::none(),
        },
        FacetShape::FixedLimit(limit) => TypeFacets::limit(limit),
        FacetShape::EnumMembers => {
            let longest = ENUM_MEMBER
                .captures_iter(sql_type)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().replace("''", "'").chars().count())
                .max();
            TypeFacets {
                limit: longest.and_then(|n| u32::try_from(n).ok()),
                ..TypeFacets::none()
            }
        }
    }
}

/// Shared decimal resolution: an explicit scale of 0 selects the integral variant.
#[must_use]
pub fn decimal_from_facets(_name: &str, facets: &TypeFacets) -> LogicalType {
    match facets.scale {
        Some(0) => LogicalType::DecimalWithoutScale { precision: facets.precision },
        scale => LogicalType::Decimal { precision: facets.precision, scale },
    }
}

/// Outcome of a default rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultMatch {
    /// Literal text, already unquoted, ready for `ValueCodec::decode`
    Literal(String),
    /// Explicit `NULL` default
    Null,
    /// Function call or other expression; kept opaque
    Expression,
}

type Extract = fn(&Captures<'_>) -> DefaultMatch;

#[derive(Debug)]
pub struct DefaultRule {
    pub label: &'static str,
    pub pattern: Regex,
    extract: Extract,
}

impl DefaultRule {
    pub fn new(label: &'static str, pattern: &str, extract: Extract) -> Self {
        Self { label, pattern: compile(pattern), extract }
    }

    #[must_use]
    pub fn apply(&self, raw: &str) -> Option<DefaultMatch> {
        self.pattern.captures(raw).map(|caps| (self.extract)(&caps))
    }
}

#[must_use]
pub fn first_default_match<'r>(
    rules: &'r [DefaultRule],
    raw: &str,
) -> Option<(&'r DefaultRule, DefaultMatch)> {
    rules
        .iter()
        .find_map(|rule| rule.apply(raw).map(|outcome| (rule, outcome)))
}

/// Capture group `n` as a literal, with `''` unescaped
pub fn quoted_capture(caps: &Captures<'_>, n: usize) -> DefaultMatch {
    caps.get(n).map_or(DefaultMatch::Null, |m| {
        DefaultMatch::Literal(m.as_str().replace("''", "'"))
    })
}

/// Capture group `n` verbatim
pub fn raw_capture(caps: &Captures<'_>, n: usize) -> DefaultMatch {
    caps.get(n).map_or(DefaultMatch::Null, |m| DefaultMatch::Literal(m.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_precision_and_scale() {
        let facets = extract_facets("numeric(10,4)", FacetShape::PrecisionScale);
        assert_eq!(facets.precision, Some(10));
        assert_eq!(facets.scale, Some(4));

        let facets = extract_facets("decimal( 8 )", FacetShape::PrecisionScale);
        assert_eq!(facets.precision, Some(8));
        assert_eq!(facets.scale, Some(0));

        let facets = extract_facets("numeric", FacetShape::PrecisionScale);
        assert_eq!(facets, TypeFacets::none());
    }

    #[test]
    fn test_extract_limit_and_precision() {
        assert_eq!(extract_facets("varchar(255)", FacetShape::Limit).limit, Some(255));
        assert_eq!(extract_facets("varchar(max)", FacetShape::Limit).limit, None);
        assert_eq!(extract_facets("datetime2(7)", FacetShape::Precision).precision, Some(7));
        assert_eq!(extract_facets("bigint", FacetShape::FixedLimit(8)).limit, Some(8));
    }

    #[test]
    fn test_enum_members_limit() {
        let facets = extract_facets("enum('a','bcd','it''s')", FacetShape::EnumMembers);
        assert_eq!(facets.limit, Some(4));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("NUMERIC(10, 2)"), "numeric");
        assert_eq!(base_name(" character varying "), "character varying");
    }

    #[test]
    fn test_decimal_from_facets_branches() {
        let scaled = decimal_from_facets("decimal", &TypeFacets { precision: Some(10), scale: Some(2), limit: None });
        assert_eq!(scaled, LogicalType::Decimal { precision: Some(10), scale: Some(2) });

        let integral = decimal_from_facets("decimal", &TypeFacets { precision: Some(10), scale: Some(0), limit: None });
        assert_eq!(integral, LogicalType::DecimalWithoutScale { precision: Some(10) });

        let bare = decimal_from_facets("decimal", &TypeFacets::none());
        assert_eq!(bare, LogicalType::Decimal { precision: None, scale: None });
    }

    #[test]
    fn test_first_match_wins() {
        let rules = vec![
            TypeRule::new("tiny_bool", r"^tinyint\(1\)", FacetShape::None, |_, _| LogicalType::Boolean)
                .gated(RuleGate::EmulatedBooleans),
            TypeRule::new("tinyint", r"^tinyint", FacetShape::FixedLimit(1), |_, _| LogicalType::Integer),
        ];

        let (rule, logical, _) = classify(&rules, "TINYINT(1)", RuleOptions::default()).unwrap();
        assert_eq!(rule.label, "tiny_bool");
        assert_eq!(logical, LogicalType::Boolean);

        let options = RuleOptions { emulate_booleans: false };
        let (rule, logical, facets) = classify(&rules, "tinyint(1)", options).unwrap();
        assert_eq!(rule.label, "tinyint");
        assert_eq!(logical, LogicalType::Integer);
        assert_eq!(facets.limit, Some(1));

        assert!(classify(&rules, "geometry", RuleOptions::default()).is_none());
    }

    #[test]
    fn test_default_rule_captures() {
        let rules = vec![
            DefaultRule::new("null", r"(?i)\ANULL\z", |_| DefaultMatch::Null),
            DefaultRule::new("quoted", r"(?s)\A'(.*)'\z", |c| quoted_capture(c, 1)),
        ];
        let (rule, outcome) = first_default_match(&rules, "'it''s'").unwrap();
        assert_eq!(rule.label, "quoted");
        assert_eq!(outcome, DefaultMatch::Literal("it's".to_string()));
        assert_eq!(first_default_match(&rules, "null").unwrap().1, DefaultMatch::Null);
        assert!(first_default_match(&rules, "now()").is_none());
    }
}
