//! Scripted stand-in for a PostgreSQL connection.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use dialectcodec::catalog::CatalogRow;
use dialectcodec::{Connection, Result, TypeError};

pub const HSTORE_OID: u32 = 16_400;
pub const MOOD_OID: u32 = 16_410;
pub const MOOD_ARRAY_OID: u32 = 16_411;
pub const POSINT_OID: u32 = 16_420;
pub const FLOATRANGE_OID: u32 = 16_430;

/// Answers `pg_type` queries from a fixed table and counts them.
pub struct ScriptedConnection {
    rows: Vec<CatalogRow>,
    queries: AtomicUsize,
    failing: AtomicBool,
    delay: Duration,
}

fn row(oid: u32, name: &str, elem: u32, input: &str, subtype: Option<u32>, kind: &str, base: u32) -> CatalogRow {
    vec![
        Some(oid.to_string()),
        Some(name.to_string()),
        Some(elem.to_string()),
        Some(input.to_string()),
        subtype.map(|id| id.to_string()),
        Some(kind.to_string()),
        Some(base.to_string()),
    ]
}

impl ScriptedConnection {
    /// An extension type, an enum with its array, a domain and a range.
    pub fn with_user_types() -> Self {
        Self {
            rows: vec![
                row(HSTORE_OID, "hstore", 0, "hstore_in", None, "b", 0),
                row(MOOD_OID, "mood", 0, "enum_in", None, "e", 0),
                row(MOOD_ARRAY_OID, "_mood", MOOD_OID, "array_in", None, "b", 0),
                row(POSINT_OID, "posint", 0, "domain_in", None, "d", 23),
                row(FLOATRANGE_OID, "floatrange", 0, "range_in", Some(701), "r", 0),
            ],
            queries: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay: Duration::ZERO,
        }
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Ids listed in `WHERE t.oid IN (...)`, `None` for the initial query.
    fn requested_ids(sql: &str) -> Option<Vec<u32>> {
        let start = sql.find("t.oid IN (")? + "t.oid IN (".len();
        let end = start + sql[start..].find(')')?;
        Some(sql[start..end].split(',').filter_map(|id| id.trim().parse().ok()).collect())
    }
}

impl Connection for ScriptedConnection {
    fn execute_query(&self, sql: &str) -> Result<Vec<CatalogRow>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(TypeError::Config("permission denied for table pg_type".into()));
        }

        let rows = match Self::requested_ids(sql) {
            Some(ids) => self
                .rows
                .iter()
                .filter(|row| {
                    row[0].as_deref().and_then(|id| id.parse::<u32>().ok()).is_some_and(|id| ids.contains(&id))
                })
                .cloned()
                .collect(),
            None => self.rows.clone(),
        };
        Ok(rows)
    }
}
