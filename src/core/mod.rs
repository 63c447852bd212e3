// Module declarations
pub mod error;
pub mod value;
pub mod logical_type;
pub mod descriptor;
pub mod column;

// Re-exports for convenience
pub use error::{Result, TypeError};
pub use value::{InetAddr, PgInterval, PgRange, RangeBound, Temporal, Value};
pub use logical_type::LogicalType;
pub use descriptor::{CatalogType, TypeDescriptor, TypeFacets, TypeKind, TypeRef};
pub use column::Column;
