//! System catalog access.
//!
//! The crate never talks to a driver directly: callers hand in something that
//! implements [`Connection`], and [`TypeCatalogLoader`] turns its result rows
//! into [`CatalogType`] entries. [`ConnectionTypeCache`] keeps what was loaded
//! for the lifetime of one physical connection.

pub mod cache;
pub mod loader;

use crate::core::{CatalogType, Result};

pub use cache::{ConnectionTypeCache, LoadRequest};
pub use loader::PgCatalogLoader;

/// One result row, every column in text form (`None` is SQL NULL).
pub type CatalogRow = Vec<Option<String>>;

/// Query executor supplied by the driver layer.
pub trait Connection: Send + Sync {
    fn execute_query(&self, sql: &str) -> Result<Vec<CatalogRow>>;
}

/// Reads type metadata from the server's catalog.
pub trait TypeCatalogLoader: Send + Sync + std::fmt::Debug {
    /// `ids = None` is the initial load: every type whose name is in
    /// `known_names` plus every range, enum, domain and array type.
    /// `Some(ids)` reloads exactly those ids.
    ///
    /// Any failure surfaces as `TypeError::CatalogUnavailable`.
    fn load(
        &self,
        connection: &dyn Connection,
        ids: Option<&[u32]>,
        known_names: &[String],
    ) -> Result<Vec<CatalogType>>;
}
