use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypeError {
    /// Metadata query failed (permissions, connection dropped, missing catalog).
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("Malformed {type_name} literal: {text:?}")]
    MalformedLiteral { type_name: String, text: String },
    #[error("Unknown type '{0}'")]
    UnknownType(String),
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TypeError {
    pub fn malformed(type_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::MalformedLiteral {
            type_name: type_name.into(),
            text: text.into(),
        }
    }

    pub fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Errors that degrade a type to `Unknown` instead of failing the caller.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::CatalogUnavailable(_) | Self::UnknownType(_))
    }
}

pub type Result<T> = std::result::Result<T, TypeError>;
