//! Codec settings (v0.4.0)
//!
//! Priority: explicit overrides > ENV (`DIALECTCODEC_*`) > config file > defaults.

use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use config::builder::DefaultState;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::Result;

pub const ENV_PREFIX: &str = "DIALECTCODEC";

/// First PostgreSQL release that outputs bytea as `\x` hex (9.0)
const HEX_BYTEA_VERSION: u32 = 90_000;
/// First PostgreSQL release with range types (9.2)
const RANGE_TYPES_VERSION: u32 = 90_200;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    #[serde(alias = "mariadb")]
    Mysql,
    #[serde(alias = "sqlserver")]
    Mssql,
    Oracle,
    #[serde(alias = "sqlite3")]
    Sqlite,
}

impl DialectKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Mssql => "mssql",
            Self::Oracle => "oracle",
            Self::Sqlite => "sqlite",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodecSettings {
    #[serde(default = "default_dialect")]
    pub dialect: DialectKind,
    /// PostgreSQL-style numeric version, e.g. 160002
    #[serde(default = "default_server_version")]
    pub server_version: u32,
    #[serde(default = "default_true")]
    pub standard_conforming_strings: bool,
    /// MySQL: false when `NO_BACKSLASH_ESCAPES` is in `sql_mode`
    #[serde(default = "default_true")]
    pub backslash_escapes: bool,
    /// Overrides the version-derived hex bytea capability
    #[serde(default)]
    pub hex_bytea: Option<bool>,
    #[serde(default = "default_true")]
    pub emulate_booleans: bool,
    #[serde(default = "default_identifier_cache_capacity")]
    pub identifier_cache_capacity: usize,
}

const fn default_dialect() -> DialectKind { DialectKind::Postgres }
const fn default_server_version() -> u32 { 160_000 }
const fn default_true() -> bool { true }
const fn default_identifier_cache_capacity() -> usize { 4096 }

impl Default for CodecSettings {
    fn default() -> Self {
        Self::for_dialect(default_dialect())
    }
}

impl CodecSettings {
    #[must_use]
    pub const fn for_dialect(dialect: DialectKind) -> Self {
        Self {
            dialect,
            server_version: default_server_version(),
            standard_conforming_strings: true,
            backslash_escapes: true,
            hex_bytea: None,
            emulate_booleans: true,
            identifier_cache_capacity: default_identifier_cache_capacity(),
        }
    }

    /// Load settings: optional TOML file, then `DIALECTCODEC_*` environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        Self::from_sources(builder)
    }

    /// Build settings from an already assembled source stack
    pub fn from_sources(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings = builder.build()?.try_deserialize::<Self>()?;
        Ok(settings)
    }

    #[must_use]
    pub fn supports_hex_escaped_bytea(&self) -> bool {
        self.hex_bytea
            .unwrap_or(self.server_version >= HEX_BYTEA_VERSION)
    }

    #[must_use]
    pub const fn supports_ranges(&self) -> bool {
        self.server_version >= RANGE_TYPES_VERSION
    }

    /// Initial escaping mode of a fresh session
    #[must_use]
    pub const fn initial_backslash_escaping(&self) -> bool {
        match self.dialect {
            DialectKind::Postgres => !self.standard_conforming_strings,
            DialectKind::Mysql => self.backslash_escapes,
            DialectKind::Mssql | DialectKind::Oracle | DialectKind::Sqlite => false,
        }
    }
}
