use serde::{Deserialize, Serialize};
use super::logical_type::LogicalType;

/// Reference to another type descriptor: a catalog id where the dialect has
/// one, the declared name otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Oid(u32),
    Name(String),
}

/// Precision/scale/limit carried next to a logical type
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeFacets {
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub limit: Option<u32>,
}

impl TypeFacets {
    #[must_use]
    pub const fn none() -> Self {
        Self { precision: None, scale: None, limit: None }
    }

    #[must_use]
    pub const fn limit(limit: u32) -> Self {
        Self { precision: None, scale: None, limit: Some(limit) }
    }

    #[must_use]
    pub const fn precision(precision: u32) -> Self {
        Self { precision: Some(precision), scale: None, limit: None }
    }

    /// Fills in any facet `self` leaves unset from `other`.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        Self {
            precision: if self.precision.is_some() { self.precision } else { other.precision },
            scale: if self.scale.is_some() { self.scale } else { other.scale },
            limit: if self.limit.is_some() { self.limit } else { other.limit },
        }
    }
}

/// A resolved native type.
///
/// Array and range descriptors always carry exactly one `element` reference;
/// every other descriptor carries none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeDescriptor {
    pub native_name: String,
    pub catalog_id: Option<u32>,
    pub logical: LogicalType,
    pub facets: TypeFacets,
    pub element: Option<TypeRef>,
}

impl TypeDescriptor {
    pub fn new(native_name: impl Into<String>, logical: LogicalType) -> Self {
        Self {
            native_name: native_name.into(),
            catalog_id: None,
            logical,
            facets: TypeFacets::none(),
            element: None,
        }
    }

    #[must_use]
    pub const fn with_id(mut self, id: u32) -> Self {
        self.catalog_id = Some(id);
        self
    }

    #[must_use]
    pub const fn with_facets(mut self, facets: TypeFacets) -> Self {
        self.facets = facets;
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: TypeRef) -> Self {
        self.element = Some(element);
        self
    }

    /// Stand-in used whenever a type cannot be resolved.
    pub fn unknown(native_name: impl Into<String>) -> Self {
        Self::new(native_name, LogicalType::Unknown)
    }

    /// Descriptor for a bare logical type, e.g. the element of an array.
    #[must_use]
    pub fn of(logical: LogicalType) -> Self {
        let name = logical.name();
        Self::new(name, logical)
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self.logical, LogicalType::Array(_))
    }
}

/// Kind column of a catalog type row (`pg_type.typtype`, refined by `typinput`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TypeKind {
    Base,
    Array,
    Range,
    Enum,
    Domain,
    Composite,
    Pseudo,
}

/// Row shape produced by the catalog loader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogType {
    pub id: u32,
    pub native_name: String,
    pub array_element_id: Option<u32>,
    pub range_subtype_id: Option<u32>,
    pub kind: TypeKind,
    pub base_type_id: Option<u32>,
}

impl CatalogType {
    pub fn base(id: u32, native_name: impl Into<String>) -> Self {
        Self {
            id,
            native_name: native_name.into(),
            array_element_id: None,
            range_subtype_id: None,
            kind: TypeKind::Base,
            base_type_id: None,
        }
    }

    #[must_use]
    pub fn array_of(id: u32, native_name: &str, element_id: u32) -> Self {
        Self {
            array_element_id: Some(element_id),
            kind: TypeKind::Array,
            ..Self::base(id, native_name)
        }
    }

    #[must_use]
    pub fn range_of(id: u32, native_name: &str, subtype_id: u32) -> Self {
        Self {
            range_subtype_id: Some(subtype_id),
            kind: TypeKind::Range,
            ..Self::base(id, native_name)
        }
    }
}
