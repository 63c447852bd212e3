use std::collections::HashMap;
use tracing::debug;

use super::{Modifier, RegisteredType};
use crate::core::{CatalogType, LogicalType, TypeDescriptor, TypeKind, TypeRef};

/// Turn catalog rows into registered types.
///
/// Resolution order per row: known type name, enum, then the kinds that
/// depend on another type (domain, array, range, vector). Dependent rows are
/// retried until a pass makes no progress, so a domain over an array over an
/// enum resolves in one call regardless of row order. Rows that still cannot
/// be resolved are left out.
pub(crate) fn resolve_catalog_rows<N, I>(
    rows: &[CatalogType],
    known_name: N,
    known_id: I,
) -> Vec<(u32, RegisteredType)>
where
    N: Fn(&str) -> Option<RegisteredType>,
    I: Fn(u32) -> Option<RegisteredType>,
{
    let mut resolved: HashMap<u32, RegisteredType> = HashMap::new();
    let mut pending: Vec<&CatalogType> = Vec::new();

    for row in rows {
        if let Some(named) = known_name(&row.native_name) {
            resolved.insert(row.id, rebrand(named, row));
            continue;
        }
        match row.kind {
            TypeKind::Enum => {
                let logical = LogicalType::SpecializedString(row.native_name.clone());
                resolved.insert(row.id, RegisteredType::plain(TypeDescriptor::new(&row.native_name, logical).with_id(row.id)));
            }
            TypeKind::Domain | TypeKind::Array | TypeKind::Range => pending.push(row),
            TypeKind::Base | TypeKind::Composite if row.array_element_id.is_some() => pending.push(row),
            _ => debug!(oid = row.id, name = %row.native_name, "no mapping for catalog type"),
        }
    }

    loop {
        let before = pending.len();
        pending.retain(|row| {
            let Some(dependency) = dependency_of(row) else {
                return false;
            };
            let found = resolved.get(&dependency).cloned().or_else(|| known_id(dependency));
            match found {
                Some(target) => {
                    resolved.insert(row.id, derive(row, dependency, target));
                    false
                }
                None => true,
            }
        });
        if pending.is_empty() || pending.len() == before {
            break;
        }
    }

    for row in &pending {
        debug!(oid = row.id, name = %row.native_name, "catalog type depends on an unknown type");
    }

    resolved.into_iter().collect()
}

const fn dependency_of(row: &CatalogType) -> Option<u32> {
    match row.kind {
        TypeKind::Domain => row.base_type_id,
        TypeKind::Range => row.range_subtype_id,
        _ => row.array_element_id,
    }
}

fn rebrand(mut registered: RegisteredType, row: &CatalogType) -> RegisteredType {
    registered.descriptor.native_name.clone_from(&row.native_name);
    registered.descriptor.catalog_id = Some(row.id);
    registered
}

fn derive(row: &CatalogType, dependency: u32, target: RegisteredType) -> RegisteredType {
    let inner = target.descriptor.logical.clone();
    match row.kind {
        // A domain behaves exactly like its base type
        TypeKind::Domain => rebrand(target, row),
        TypeKind::Array => RegisteredType {
            descriptor: TypeDescriptor::new(&row.native_name, LogicalType::array_of(inner))
                .with_id(row.id)
                .with_element(TypeRef::Oid(dependency)),
            // typmod of an array column describes its elements
            modifier: target.modifier,
        },
        TypeKind::Range => RegisteredType::plain(
            TypeDescriptor::new(&row.native_name, LogicalType::range_of(inner))
                .with_id(row.id)
                .with_element(TypeRef::Oid(dependency)),
        ),
        // int2vector, oidvector and friends travel as plain text
        _ => RegisteredType {
            descriptor: TypeDescriptor::new(
                &row.native_name,
                LogicalType::SpecializedString(row.native_name.clone()),
            )
            .with_id(row.id),
            modifier: Modifier::None,
        },
    }
}
