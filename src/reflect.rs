use std::sync::Arc;

use crate::core::{Column, TypeDescriptor};
use crate::defaults::DefaultValueExtractor;
use crate::registry::TypeRegistry;

/// `pg_attribute` row joined with `format_type()` and `pg_get_expr()`.
#[derive(Debug, Clone, Copy)]
pub struct PgAttribute<'a> {
    pub name: &'a str,
    pub type_oid: u32,
    /// `atttypmod`, `-1` when the column has none
    pub fmod: i32,
    /// `format_type(atttypid, atttypmod)`
    pub sql_type: &'a str,
    pub default: Option<&'a str>,
    pub not_null: bool,
}

/// Column as listed by name-based dialects (`SHOW COLUMNS`, `PRAGMA table_info`, ...)
#[derive(Debug, Clone, Copy)]
pub struct DeclaredColumn<'a> {
    pub name: &'a str,
    pub sql_type: &'a str,
    pub default: Option<&'a str>,
    pub nullable: bool,
}

/// Builds [`Column`] records for existing tables.
#[derive(Debug, Clone)]
pub struct ColumnReflector {
    registry: Arc<TypeRegistry>,
    defaults: DefaultValueExtractor,
}

impl ColumnReflector {
    #[must_use]
    pub const fn new(registry: Arc<TypeRegistry>, defaults: DefaultValueExtractor) -> Self {
        Self { registry, defaults }
    }

    #[must_use]
    pub fn reflect_pg(&self, attribute: &PgAttribute<'_>) -> Column {
        let descriptor = self.registry.lookup_column(attribute.type_oid, attribute.fmod, attribute.sql_type);
        self.build(attribute.name, attribute.sql_type, &descriptor, attribute.default, !attribute.not_null)
    }

    #[must_use]
    pub fn reflect_declared(&self, column: &DeclaredColumn<'_>) -> Column {
        let descriptor = self.registry.lookup_declared(column.sql_type);
        self.build(column.name, column.sql_type, &descriptor, column.default, column.nullable)
    }

    fn build(
        &self,
        name: &str,
        sql_type: &str,
        descriptor: &TypeDescriptor,
        default: Option<&str>,
        nullable: bool,
    ) -> Column {
        let extracted = self.defaults.extract(default, descriptor);
        Column {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            logical: descriptor.logical.clone(),
            precision: descriptor.facets.precision,
            scale: descriptor.facets.scale,
            limit: descriptor.facets.limit,
            nullable,
            default_literal: default.map(str::to_string),
            default_value: extracted.value,
            default_function: extracted.function,
            is_array: descriptor.is_array(),
            is_expression_default: extracted.is_expression,
        }
    }
}
