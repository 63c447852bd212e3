use serde::{Deserialize, Serialize};
use super::logical_type::LogicalType;
use super::value::Value;

/// Reflected column of an existing table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    pub name: String,
    pub sql_type: String,
    pub logical: LogicalType,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub limit: Option<u32>,
    pub nullable: bool,
    /// Raw default text as the catalog reported it
    pub default_literal: Option<String>,
    pub default_value: Option<Value>,
    /// Raw text of a function/expression default (`now()`, `nextval(...)`)
    pub default_function: Option<String>,
    pub is_array: bool,
    pub is_expression_default: bool,
}

impl Column {
    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.default_value.is_some() || self.default_function.is_some()
    }

    /// `nextval('..._seq'::regclass)` defaults mark serial columns
    #[must_use]
    pub fn is_serial(&self) -> bool {
        self.default_function
            .as_deref()
            .is_some_and(|f| f.starts_with("nextval("))
    }
}
