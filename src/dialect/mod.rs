//! Per-dialect strategy.
//!
//! Everything that differs between engines lives behind [`DialectProfile`]:
//! identifier delimiters, boolean/binary/float-special literals, declared-type
//! rules and default-value rules. A profile is picked once per session by
//! [`profile_for`]; nothing else in the crate branches on the dialect.

pub mod rules;
pub mod postgres;
pub mod mysql;
pub mod mssql;
pub mod oracle;
pub mod sqlite;

use std::sync::Arc;

use crate::config::{CodecSettings, DialectKind};
use crate::core::{LogicalType, Result, TypeError};

pub use mssql::MssqlProfile;
pub use mysql::MysqlProfile;
pub use oracle::OracleProfile;
pub use postgres::PostgresProfile;
pub use rules::{DefaultMatch, DefaultRule, FacetShape, RuleGate, RuleOptions, TypeRule};
pub use sqlite::SqliteProfile;

/// SQL syntax strategy for one database engine.
pub trait DialectProfile: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> DialectKind;

    /// Opening and closing identifier delimiter
    fn identifier_delimiters(&self) -> (char, char);

    fn schema_separator(&self) -> char {
        '.'
    }

    /// Case folding applied to a bare identifier before quoting
    fn fold_identifier(&self, name: &str) -> String {
        name.to_string()
    }

    fn quoted_true(&self) -> &'static str;

    fn quoted_false(&self) -> &'static str;

    fn supports_hex_escaped_bytea(&self) -> bool {
        false
    }

    /// SQL literal for raw bytes
    fn binary_literal(&self, bytes: &[u8]) -> String;

    /// SQL literal for an infinite or NaN float headed for a column of `target`
    fn float_special(&self, value: f64, target: &LogicalType) -> Result<String>;

    /// `date`/`timestamp` columns accept `infinity`/`-infinity`
    fn supports_infinite_temporals(&self) -> bool {
        false
    }

    /// Prefix placed in front of a quoted string literal (`N` for national strings)
    fn string_prefix(&self, _target: &LogicalType) -> &'static str {
        ""
    }

    /// Declared-type classification, first match wins
    fn type_rules(&self) -> &'static [TypeRule];

    /// Column default classification, first match wins
    fn default_rules(&self) -> &'static [DefaultRule];

    fn rule_options(&self) -> RuleOptions {
        RuleOptions::default()
    }

    /// Types are identified by catalog ids (`pg_type.oid`) rather than names
    fn uses_catalog_ids(&self) -> bool {
        false
    }
}

/// Select the profile for a session's settings.
#[must_use]
pub fn profile_for(settings: &CodecSettings) -> Arc<dyn DialectProfile> {
    match settings.dialect {
        DialectKind::Postgres => Arc::new(PostgresProfile::new(settings.supports_hex_escaped_bytea())),
        DialectKind::Mysql => Arc::new(MysqlProfile::new(settings.emulate_booleans)),
        DialectKind::Mssql => Arc::new(MssqlProfile),
        DialectKind::Oracle => Arc::new(OracleProfile::new(settings.emulate_booleans)),
        DialectKind::Sqlite => Arc::new(SqliteProfile),
    }
}

/// Shared refusal for float specials a dialect cannot represent.
pub(crate) fn unsupported_float(value: f64, target: &LogicalType, dialect: DialectKind) -> TypeError {
    TypeError::mismatch(
        format!("finite float for {target} on {}", dialect.as_str()),
        value.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_selection() {
        for kind in [
            DialectKind::Postgres,
            DialectKind::Mysql,
            DialectKind::Mssql,
            DialectKind::Oracle,
            DialectKind::Sqlite,
        ] {
            let profile = profile_for(&CodecSettings::for_dialect(kind));
            assert_eq!(profile.kind(), kind);
            assert!(!profile.default_rules().is_empty());
        }
    }

    #[test]
    fn test_boolean_literals() {
        let pg = profile_for(&CodecSettings::for_dialect(DialectKind::Postgres));
        assert_eq!(pg.quoted_true(), "TRUE");
        assert_eq!(pg.quoted_false(), "FALSE");

        for kind in [DialectKind::Mysql, DialectKind::Mssql, DialectKind::Oracle, DialectKind::Sqlite] {
            let profile = profile_for(&CodecSettings::for_dialect(kind));
            assert_eq!(profile.quoted_true(), "1");
            assert_eq!(profile.quoted_false(), "0");
        }
    }

    #[test]
    fn test_binary_literals_per_dialect() {
        let bytes = [0x01, 0xab];
        let literal = |kind| profile_for(&CodecSettings::for_dialect(kind)).binary_literal(&bytes);
        assert_eq!(literal(DialectKind::Postgres), "E'\\\\x01ab'::bytea");
        assert_eq!(literal(DialectKind::Mysql), "x'01ab'");
        assert_eq!(literal(DialectKind::Mssql), "0x01ab");
        assert_eq!(literal(DialectKind::Oracle), "hextoraw('01ab')");
        assert_eq!(literal(DialectKind::Sqlite), "x'01ab'");
    }

    #[test]
    fn test_float_specials_per_dialect() {
        let special = |kind, v: f64| {
            profile_for(&CodecSettings::for_dialect(kind)).float_special(v, &LogicalType::Float)
        };
        assert_eq!(special(DialectKind::Postgres, f64::INFINITY).unwrap(), "'Infinity'");
        assert_eq!(special(DialectKind::Postgres, f64::NAN).unwrap(), "'NaN'");
        assert_eq!(special(DialectKind::Oracle, f64::NEG_INFINITY).unwrap(), "-BINARY_DOUBLE_INFINITY");
        assert_eq!(special(DialectKind::Sqlite, f64::INFINITY).unwrap(), "9e999");
        assert!(matches!(
            special(DialectKind::Mysql, f64::INFINITY),
            Err(TypeError::TypeMismatch { .. })
        ));
        assert!(special(DialectKind::Mssql, f64::NAN).is_err());
    }
}
