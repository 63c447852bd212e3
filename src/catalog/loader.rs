use tracing::debug;

use super::{CatalogRow, Connection, TypeCatalogLoader};
use crate::core::{CatalogType, Result, TypeError, TypeKind};
use crate::quoting::{escape_string, EscapeMode};

const SELECT_WITH_RANGES: &str = "SELECT t.oid, t.typname, t.typelem, t.typinput, r.rngsubtype, t.typtype, t.typbasetype \
     FROM pg_type as t LEFT JOIN pg_range as r ON oid = rngtypid";

// Servers before 9.2 have no pg_range; the column stays so rows keep one shape
const SELECT_WITHOUT_RANGES: &str = "SELECT t.oid, t.typname, t.typelem, t.typinput, NULL AS rngsubtype, t.typtype, t.typbasetype \
     FROM pg_type as t";

/// `pg_type` reader for PostgreSQL-compatible servers.
#[derive(Debug, Clone, Copy)]
pub struct PgCatalogLoader {
    supports_ranges: bool,
}

impl PgCatalogLoader {
    #[must_use]
    pub const fn new(supports_ranges: bool) -> Self {
        Self { supports_ranges }
    }

    const fn select(&self) -> &'static str {
        if self.supports_ranges { SELECT_WITH_RANGES } else { SELECT_WITHOUT_RANGES }
    }

    /// Query for a bounded reload of specific ids.
    #[must_use]
    pub fn bounded_query(&self, ids: &[u32]) -> String {
        let list = ids.iter().map(u32::to_string).collect::<Vec<_>>().join(", ");
        format!("{} WHERE t.oid IN ({list})", self.select())
    }

    /// Query for the initial load.
    #[must_use]
    pub fn initial_query(&self, known_names: &[String]) -> String {
        let mut conditions = Vec::with_capacity(4);
        if !known_names.is_empty() {
            let names = known_names
                .iter()
                .map(|name| format!("'{}'", escape_string(name, EscapeMode::Standard)))
                .collect::<Vec<_>>()
                .join(", ");
            conditions.push(format!("t.typname IN ({names})"));
        }
        conditions.push("t.typtype IN ('r', 'e', 'd')".to_string());
        conditions.push("t.typinput = 'array_in(cstring,oid,integer)'::regprocedure".to_string());
        conditions.push("t.typelem != 0".to_string());

        format!("{} WHERE {}", self.select(), conditions.join(" OR "))
    }

    fn parse_row(row: &CatalogRow) -> Option<CatalogType> {
        let column = |index: usize| row.get(index).and_then(|c| c.as_deref());
        let related_id = |index: usize| {
            column(index)
                .and_then(|text| text.trim().parse::<u32>().ok())
                .filter(|id| *id != 0)
        };

        let id = column(0)?.trim().parse::<u32>().ok()?;
        let native_name = column(1)?.to_string();
        let typinput = column(3).unwrap_or_default();

        let kind = match column(5).unwrap_or("b") {
            "r" => TypeKind::Range,
            "e" => TypeKind::Enum,
            "d" => TypeKind::Domain,
            "c" => TypeKind::Composite,
            "p" => TypeKind::Pseudo,
            _ if typinput == "array_in" => TypeKind::Array,
            _ => TypeKind::Base,
        };

        Some(CatalogType {
            id,
            native_name,
            array_element_id: related_id(2),
            range_subtype_id: related_id(4),
            kind,
            base_type_id: related_id(6),
        })
    }
}

impl TypeCatalogLoader for PgCatalogLoader {
    fn load(
        &self,
        connection: &dyn Connection,
        ids: Option<&[u32]>,
        known_names: &[String],
    ) -> Result<Vec<CatalogType>> {
        let sql = match ids {
            Some([]) => return Ok(Vec::new()),
            Some(ids) => self.bounded_query(ids),
            None => self.initial_query(known_names),
        };

        let rows = connection
            .execute_query(&sql)
            .map_err(|e| TypeError::CatalogUnavailable(e.to_string()))?;

        let mut types = Vec::with_capacity(rows.len());
        for row in &rows {
            match Self::parse_row(row) {
                Some(entry) => types.push(entry),
                None => debug!(?row, "skipping malformed pg_type row"),
            }
        }

        debug!(
            requested = ids.map_or(0, <[u32]>::len),
            loaded = types.len(),
            initial = ids.is_none(),
            "loaded catalog types"
        );
        Ok(types)
    }
}
