//! Column default classification.
//!
//! Catalogs report defaults as SQL text. Literals (`'abc'::text`, `42`, `(N'x')`)
//! are decoded into values; anything else (`now()`, `nextval(...)`) is kept as
//! opaque expression text. Extraction never fails.

use std::sync::Arc;
use tracing::debug;

use crate::codec::ValueCodec;
use crate::core::{TypeDescriptor, Value};
use crate::dialect::rules::first_default_match;
use crate::dialect::{DefaultMatch, DialectProfile};

/// Classified column default
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedDefault {
    /// Decoded literal; absent for NULL, expressions and undecodable text
    pub value: Option<Value>,
    /// Raw expression text when the default is not a literal
    pub function: Option<String>,
    pub is_expression: bool,
}

impl ExtractedDefault {
    fn expression(raw: &str) -> Self {
        Self { value: None, function: Some(raw.to_string()), is_expression: true }
    }
}

#[derive(Debug, Clone)]
pub struct DefaultValueExtractor {
    profile: Arc<dyn DialectProfile>,
    codec: Arc<ValueCodec>,
}

impl DefaultValueExtractor {
    #[must_use]
    pub fn new(profile: Arc<dyn DialectProfile>, codec: Arc<ValueCodec>) -> Self {
        Self { profile, codec }
    }

    #[must_use]
    pub fn extract(&self, raw: Option<&str>, descriptor: &TypeDescriptor) -> ExtractedDefault {
        let Some(raw) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
            return ExtractedDefault::default();
        };

        match first_default_match(self.profile.default_rules(), raw) {
            Some((_, DefaultMatch::Null)) => ExtractedDefault::default(),
            Some((rule, DefaultMatch::Literal(text))) => {
                match self.codec.decode_text(&text, &descriptor.logical) {
                    Ok(Value::Null) => ExtractedDefault::default(),
                    Ok(value) => ExtractedDefault { value: Some(value), ..ExtractedDefault::default() },
                    Err(e) => {
                        debug!(rule = rule.label, default = raw, error = %e, "default literal does not decode");
                        ExtractedDefault::default()
                    }
                }
            }
            Some((_, DefaultMatch::Expression)) | None => ExtractedDefault::expression(raw),
        }
    }
}
