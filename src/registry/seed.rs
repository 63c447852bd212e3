//! Built-in PostgreSQL type table.
//!
//! Names are `pg_type.typname` values. Oids are stable across server versions
//! for built-in types, so they are registered up front and never queried.

use once_cell::sync::Lazy;

use super::Modifier;
use crate::core::{CatalogType, LogicalType, TypeFacets};

pub(crate) struct SeedType {
    pub name: &'static str,
    pub logical: LogicalType,
    pub facets: TypeFacets,
    pub modifier: Modifier,
}

fn seed(name: &'static str, logical: LogicalType) -> SeedType {
    SeedType { name, logical, facets: TypeFacets::none(), modifier: Modifier::None }
}

fn integer(name: &'static str, bytes: u32) -> SeedType {
    SeedType { facets: TypeFacets::limit(bytes), ..seed(name, LogicalType::Integer) }
}

fn modified(name: &'static str, logical: LogicalType, modifier: Modifier) -> SeedType {
    SeedType { modifier, ..seed(name, logical) }
}

pub(crate) static POSTGRES_TYPES: Lazy<Vec<SeedType>> = Lazy::new(|| {
    vec![
        integer("int2", 2),
        integer("int4", 4),
        integer("int8", 8),
        // oids run up to 2^32 - 1
        integer("oid", 8),
        seed("float4", LogicalType::Float),
        seed("float8", LogicalType::Float),
        modified("numeric", LogicalType::Decimal { precision: None, scale: None }, Modifier::Numeric),
        seed("money", LogicalType::Money),
        seed("text", LogicalType::Text),
        modified("varchar", LogicalType::String, Modifier::Limit),
        seed("bool", LogicalType::Boolean),
        seed("bytea", LogicalType::Binary),
        modified("bit", LogicalType::Bit(None), Modifier::BitLength),
        modified("varbit", LogicalType::BitVarying, Modifier::BitLength),
        seed("date", LogicalType::Date),
        modified("time", LogicalType::Time, Modifier::Precision),
        modified("timestamp", LogicalType::DateTime, Modifier::Precision),
        seed("interval", LogicalType::Interval),
        seed("uuid", LogicalType::Uuid),
        seed("json", LogicalType::Json),
        seed("jsonb", LogicalType::Jsonb),
        seed("hstore", LogicalType::Hstore),
        seed("xml", LogicalType::Xml),
        seed("cidr", LogicalType::Cidr),
        seed("inet", LogicalType::Inet),
        seed("macaddr", LogicalType::MacAddr),
        seed("tsvector", LogicalType::Tsvector),
        seed("point", LogicalType::SpecializedString("point".into())),
        seed("line", LogicalType::SpecializedString("line".into())),
        seed("lseg", LogicalType::SpecializedString("lseg".into())),
        seed("box", LogicalType::SpecializedString("box".into())),
        seed("path", LogicalType::SpecializedString("path".into())),
        seed("polygon", LogicalType::SpecializedString("polygon".into())),
        seed("circle", LogicalType::SpecializedString("circle".into())),
        seed("ltree", LogicalType::SpecializedString("ltree".into())),
    ]
});

/// `(alias, existing)` pairs
pub(crate) const POSTGRES_ALIASES: &[(&str, &str)] = &[
    ("char", "varchar"),
    ("name", "varchar"),
    ("bpchar", "varchar"),
    ("citext", "text"),
    ("timestamptz", "timestamp"),
    ("timetz", "time"),
    ("macaddr8", "macaddr"),
];

/// Built-in rows as the catalog would report them
pub(crate) static POSTGRES_BUILTIN_OIDS: Lazy<Vec<CatalogType>> = Lazy::new(|| {
    let base = [
        (16, "bool"), (17, "bytea"), (18, "char"), (19, "name"), (20, "int8"), (21, "int2"),
        (23, "int4"), (25, "text"), (26, "oid"), (114, "json"), (142, "xml"), (600, "point"),
        (601, "lseg"), (602, "path"), (603, "box"), (604, "polygon"), (628, "line"),
        (650, "cidr"), (700, "float4"), (701, "float8"), (718, "circle"), (790, "money"),
        (829, "macaddr"), (869, "inet"), (1042, "bpchar"), (1043, "varchar"), (1082, "date"),
        (1083, "time"), (1114, "timestamp"), (1184, "timestamptz"), (1186, "interval"),
        (1266, "timetz"), (1560, "bit"), (1562, "varbit"), (1700, "numeric"), (2950, "uuid"),
        (3614, "tsvector"), (3802, "jsonb"),
    ];
    let arrays = [
        (1000, "_bool", 16), (1001, "_bytea", 17), (1005, "_int2", 21), (1007, "_int4", 23),
        (1016, "_int8", 20), (1009, "_text", 25), (1014, "_bpchar", 1042), (1015, "_varchar", 1043),
        (1021, "_float4", 700), (1022, "_float8", 701), (1231, "_numeric", 1700),
        (1182, "_date", 1082), (1183, "_time", 1083), (1115, "_timestamp", 1114),
        (1185, "_timestamptz", 1184), (1187, "_interval", 1186), (2951, "_uuid", 2950),
        (199, "_json", 114), (3807, "_jsonb", 3802), (651, "_cidr", 650), (1041, "_inet", 869),
        (1040, "_macaddr", 829), (1561, "_bit", 1560), (1563, "_varbit", 1562),
        (791, "_money", 790), (1020, "_box", 603),
    ];
    let ranges = [
        (3904, "int4range", 23), (3926, "int8range", 20), (3906, "numrange", 1700),
        (3908, "tsrange", 1114), (3910, "tstzrange", 1184), (3912, "daterange", 1082),
    ];

    base.iter()
        .map(|(id, name)| CatalogType::base(*id, *name))
        .chain(arrays.iter().map(|(id, name, elem)| CatalogType::array_of(*id, name, *elem)))
        .chain(ranges.iter().map(|(id, name, sub)| CatalogType::range_of(*id, name, *sub)))
        .collect()
});
