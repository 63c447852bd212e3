//! Native type name / catalog id -> [`TypeDescriptor`] resolution.

mod initializer;
mod seed;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::{Connection, ConnectionTypeCache, LoadRequest, TypeCatalogLoader};
use crate::core::{CatalogType, LogicalType, Result, TypeDescriptor, TypeError, TypeFacets, TypeRef};
use crate::dialect::rules::{base_name, classify, extract_facets, FacetShape};
use crate::dialect::DialectProfile;

use initializer::resolve_catalog_rows;

/// Longest alias chain followed before giving up
const MAX_ALIAS_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Oid(u32),
    Name(String),
}

impl TypeKey {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }
}

/// How a type modifier (`pg_attribute.atttypmod`, or the parenthesised part
/// of a declared type) refines a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifier {
    #[default]
    None,
    /// varchar(n): typmod is n + 4
    Limit,
    /// bit(n): typmod is n
    BitLength,
    /// time(p)/timestamp(p): typmod is p
    Precision,
    /// numeric(p,s): typmod is ((p << 16) | s) + 4
    Numeric,
}

impl Modifier {
    fn apply(self, logical: &LogicalType, facets: TypeFacets, fmod: i32) -> (LogicalType, TypeFacets) {
        if let LogicalType::Array(element) = logical {
            let (element, facets) = self.apply(element, facets, fmod);
            return (LogicalType::array_of(element), facets);
        }
        if fmod < 0 {
            return (logical.clone(), facets);
        }

        match self {
            Self::None => (logical.clone(), facets),
            Self::Limit => (logical.clone(), TypeFacets { limit: u32::try_from(fmod - 4).ok(), ..facets }),
            Self::BitLength => {
                let length = fmod.unsigned_abs();
                let logical = match logical {
                    LogicalType::Bit(_) => LogicalType::Bit(Some(length)),
                    other => other.clone(),
                };
                (logical, TypeFacets { limit: Some(length), ..facets })
            }
            Self::Precision => (logical.clone(), TypeFacets { precision: Some(fmod.unsigned_abs()), ..facets }),
            Self::Numeric => {
                let packed = fmod - 4;
                let precision = ((packed >> 16) & 0xffff).unsigned_abs();
                let scale = (packed & 0xffff).unsigned_abs();
                let logical = if scale == 0 {
                    LogicalType::DecimalWithoutScale { precision: Some(precision) }
                } else {
                    LogicalType::Decimal { precision: Some(precision), scale: Some(scale) }
                };
                (logical, TypeFacets { precision: Some(precision), scale: Some(scale), limit: facets.limit })
            }
        }
    }

    /// Encode the parameters of a declared type (`varchar(20)`) as the typmod
    /// the server would report for it.
    fn declared_typmod(self, sql_type: &str) -> Option<i32> {
        let to_i32 = |n: u32| i32::try_from(n).ok();
        match self {
            Self::None => None,
            Self::Limit => extract_facets(sql_type, FacetShape::Limit).limit.and_then(to_i32)?.checked_add(4),
            Self::BitLength => extract_facets(sql_type, FacetShape::Limit).limit.and_then(to_i32),
            Self::Precision => extract_facets(sql_type, FacetShape::Precision).precision.and_then(to_i32),
            Self::Numeric => {
                // both halves are 16 bits wide in the packed form
                let facets = extract_facets(sql_type, FacetShape::PrecisionScale);
                let precision = facets.precision.filter(|p| *p <= 0xffff)?;
                let scale = facets.scale.unwrap_or(0);
                if scale > 0xffff {
                    return None;
                }
                i32::try_from(((precision << 16) | scale).checked_add(4)?).ok()
            }
        }
    }
}

/// Options for [`TypeRegistry::register_type`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    pub facets: TypeFacets,
    pub modifier: Modifier,
}

/// A registered type before a column's typmod is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredType {
    pub descriptor: TypeDescriptor,
    pub modifier: Modifier,
}

impl RegisteredType {
    #[must_use]
    pub const fn plain(descriptor: TypeDescriptor) -> Self {
        Self { descriptor, modifier: Modifier::None }
    }

    /// Descriptor for a column with type modifier `fmod` (`-1` or `None` = no modifier)
    #[must_use]
    pub fn resolve(&self, fmod: Option<i32>) -> TypeDescriptor {
        let mut descriptor = self.descriptor.clone();
        if let Some(fmod) = fmod {
            let (logical, facets) = self.modifier.apply(&descriptor.logical, descriptor.facets, fmod);
            descriptor.logical = logical;
            descriptor.facets = facets;
        }
        descriptor
    }
}

#[derive(Debug, Clone)]
enum NameEntry {
    Type(RegisteredType),
    Alias(String),
}

struct CatalogSource {
    connection: Arc<dyn Connection>,
    loader: Box<dyn TypeCatalogLoader>,
}

impl std::fmt::Debug for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSource").field("loader", &self.loader).finish_non_exhaustive()
    }
}

/// Maps native type names and catalog ids to descriptors for one connection.
///
/// Names are registered up front (seed table plus whatever callers add);
/// catalog ids are filled in lazily from the server on the first miss.
#[derive(Debug)]
pub struct TypeRegistry {
    profile: Arc<dyn DialectProfile>,
    names: RwLock<HashMap<String, NameEntry>>,
    by_id: ConnectionTypeCache<RegisteredType>,
    catalog: Option<CatalogSource>,
}

impl TypeRegistry {
    /// Registry without catalog access: names and declared types only.
    #[must_use]
    pub fn new(profile: Arc<dyn DialectProfile>) -> Self {
        Self::build(profile, None)
    }

    /// Registry that loads unknown catalog ids through `loader`.
    #[must_use]
    pub fn with_catalog(
        profile: Arc<dyn DialectProfile>,
        connection: Arc<dyn Connection>,
        loader: Box<dyn TypeCatalogLoader>,
    ) -> Self {
        Self::build(profile, Some(CatalogSource { connection, loader }))
    }

    fn build(profile: Arc<dyn DialectProfile>, catalog: Option<CatalogSource>) -> Self {
        let registry = Self {
            profile,
            names: RwLock::new(HashMap::new()),
            by_id: ConnectionTypeCache::new(),
            catalog,
        };
        if registry.profile.uses_catalog_ids() {
            registry.seed_names();
            registry.seed_builtin_ids();
        }
        registry
    }

    fn seed_names(&self) {
        let mut names = self.names.write();
        for entry in seed::POSTGRES_TYPES.iter() {
            let descriptor = TypeDescriptor::new(entry.name, entry.logical.clone()).with_facets(entry.facets);
            names.insert(
                entry.name.to_string(),
                NameEntry::Type(RegisteredType { descriptor, modifier: entry.modifier }),
            );
        }
        for (alias, existing) in seed::POSTGRES_ALIASES {
            names.insert((*alias).to_string(), NameEntry::Alias((*existing).to_string()));
        }
    }

    fn seed_builtin_ids(&self) {
        for (id, registered) in self.resolve_rows(&seed::POSTGRES_BUILTIN_OIDS) {
            self.by_id.insert(id, registered);
        }
    }

    /// Register `logical` under a name or a catalog id.
    pub fn register_type(&self, key: TypeKey, logical: LogicalType, options: RegisterOptions) {
        match key {
            TypeKey::Name(name) => {
                let descriptor = TypeDescriptor::new(&name, logical).with_facets(options.facets);
                self.names.write().insert(
                    normalize(&name),
                    NameEntry::Type(RegisteredType { descriptor, modifier: options.modifier }),
                );
            }
            TypeKey::Oid(id) => {
                let descriptor = TypeDescriptor::of(logical).with_id(id).with_facets(options.facets);
                self.by_id.insert(id, RegisteredType { descriptor, modifier: options.modifier });
            }
        }
    }

    /// Make `alias` resolve to whatever `existing` resolves to at lookup time.
    pub fn alias_type(&self, alias: &str, existing: &str) -> Result<()> {
        if self.resolve_name(existing).is_none() {
            return Err(TypeError::UnknownType(existing.to_string()));
        }
        self.names.write().insert(normalize(alias), NameEntry::Alias(normalize(existing)));
        Ok(())
    }

    /// Names the initial catalog load should fetch, aliases included.
    #[must_use]
    pub fn known_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn lookup(&self, key: &TypeKey) -> Result<TypeDescriptor> {
        match key {
            TypeKey::Oid(id) => self.lookup_id(*id).map(|registered| registered.resolve(None)),
            TypeKey::Name(name) => self.lookup_name(name),
        }
    }

    /// Descriptor for a reflected column. Never fails: an id the catalog cannot
    /// explain becomes `Unknown` (and stays so until the cache is invalidated).
    #[must_use]
    pub fn lookup_column(&self, id: u32, fmod: i32, sql_type: &str) -> TypeDescriptor {
        match self.lookup_id(id) {
            Ok(registered) => registered.resolve(Some(fmod)),
            Err(e) => {
                warn!(oid = id, sql_type, error = %e, "unknown type oid, treating values as strings");
                let fallback = RegisteredType::plain(TypeDescriptor::unknown(sql_type).with_id(id));
                self.by_id.insert(id, fallback.clone());
                fallback.resolve(None)
            }
        }
    }

    /// Descriptor for a declared type string. Never fails; unrecognised
    /// declarations become `Unknown`.
    #[must_use]
    pub fn lookup_declared(&self, sql_type: &str) -> TypeDescriptor {
        self.lookup_name(sql_type).unwrap_or_else(|e| {
            warn!(sql_type, error = %e, "unrecognised declared type, treating values as strings");
            TypeDescriptor::unknown(sql_type.trim())
        })
    }

    /// Forget everything learned from the catalog. Seeded built-ins and
    /// registered names survive.
    pub fn invalidate(&self) {
        self.by_id.invalidate();
        if self.profile.uses_catalog_ids() {
            self.seed_builtin_ids();
        }
    }

    #[must_use]
    pub fn cached_ids(&self) -> usize {
        self.by_id.len()
    }

    fn lookup_id(&self, id: u32) -> Result<RegisteredType> {
        if let Some(registered) = self.by_id.get(id) {
            return Ok(registered);
        }
        let Some(catalog) = &self.catalog else {
            return Err(TypeError::UnknownType(format!("oid {id}")));
        };

        debug!(oid = id, "type cache miss");
        self.by_id.ensure_loaded(&[id], |request| self.fetch(catalog, request))?;
        self.by_id
            .get(id)
            .ok_or_else(|| TypeError::UnknownType(format!("oid {id}")))
    }

    fn fetch(&self, catalog: &CatalogSource, request: LoadRequest<'_>) -> Result<Vec<(u32, RegisteredType)>> {
        let connection = catalog.connection.as_ref();
        let rows = match request {
            LoadRequest::Initial => catalog.loader.load(connection, None, &self.known_names())?,
            LoadRequest::Bounded(ids) => catalog.loader.load(connection, Some(ids), &[])?,
        };
        Ok(self.resolve_rows(&rows))
    }

    fn resolve_rows(&self, rows: &[CatalogType]) -> Vec<(u32, RegisteredType)> {
        resolve_catalog_rows(rows, |name| self.resolve_name(name), |id| self.by_id.get(id))
    }

    fn resolve_name(&self, name: &str) -> Option<RegisteredType> {
        let names = self.names.read();
        let mut key = normalize(name);
        for _ in 0..MAX_ALIAS_DEPTH {
            match names.get(&key)? {
                NameEntry::Type(registered) => {
                    let mut registered = registered.clone();
                    registered.descriptor.native_name = normalize(name);
                    return Some(registered);
                }
                NameEntry::Alias(target) => key.clone_from(target),
            }
        }
        warn!(name, "alias chain too long");
        None
    }

    fn lookup_name(&self, name: &str) -> Result<TypeDescriptor> {
        let declared = name.trim();

        if let Some(element_name) = declared.strip_suffix("[]") {
            let element = self.lookup_name(element_name)?;
            return Ok(TypeDescriptor::new(declared, LogicalType::array_of(element.logical))
                .with_facets(element.facets)
                .with_element(TypeRef::Name(element_name.trim().to_string())));
        }

        if let Some(registered) = self.resolve_name(&base_name(declared)) {
            let typmod = registered.modifier.declared_typmod(declared);
            let mut descriptor = registered.resolve(typmod);
            declared.clone_into(&mut descriptor.native_name);
            return Ok(descriptor);
        }

        classify(self.profile.type_rules(), declared, self.profile.rule_options())
            .map(|(_, logical, facets)| TypeDescriptor::new(declared, logical).with_facets(facets))
            .ok_or_else(|| TypeError::UnknownType(declared.to_string()))
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
