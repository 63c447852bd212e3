// dialectcodec - SQL type mapping and value codecs for several dialects
// Catalog-driven type registry, literal quoting and column default parsing

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::wildcard_enum_match_arm)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::type_complexity)]

// Values, logical types, descriptors, errors
pub mod core;

// Settings (TOML file + environment)
pub mod config;

// Per-dialect behavior and rule tables
pub mod dialect;

// System catalog loading and per-connection cache
pub mod catalog;

// Type lookup by catalog id or declared name
pub mod registry;

// Text <-> value conversion and SQL literal encoding
pub mod codec;

// Identifier and string quoting
pub mod quoting;

// Column default classification
pub mod defaults;

// Column reflection
pub mod reflect;

// Per-connection bundle
pub mod session;

pub use crate::core::{Column, LogicalType, Result, TypeDescriptor, TypeError, TypeFacets, Value};
pub use crate::config::{CodecSettings, DialectKind};
pub use crate::dialect::{profile_for, DialectProfile};
pub use crate::catalog::{Connection, PgCatalogLoader, TypeCatalogLoader};
pub use crate::registry::{TypeKey, TypeRegistry};
pub use crate::codec::ValueCodec;
pub use crate::quoting::{EscapeMode, QuotingEngine, SessionFlags};
pub use crate::defaults::{DefaultValueExtractor, ExtractedDefault};
pub use crate::reflect::{ColumnReflector, DeclaredColumn, PgAttribute};
pub use crate::session::Session;
