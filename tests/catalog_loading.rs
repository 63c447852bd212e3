mod common;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{ScriptedConnection, FLOATRANGE_OID, HSTORE_OID, MOOD_ARRAY_OID, MOOD_OID, POSINT_OID};
use dialectcodec::{CodecSettings, Connection, LogicalType, Session, TypeError, TypeKey, Value};

fn session_with(connection: &Arc<ScriptedConnection>) -> Session {
    let connection: Arc<dyn Connection> = Arc::clone(connection) as Arc<dyn Connection>;
    Session::establish(CodecSettings::default(), Some(connection))
}

#[test]
fn test_builtin_oids_skip_the_catalog() {
    let connection = Arc::new(ScriptedConnection::with_user_types());
    let session = session_with(&connection);

    let descriptor = session.registry().lookup_column(1043, 24, "character varying(20)");
    assert_eq!(descriptor.logical, LogicalType::String);
    assert_eq!(descriptor.facets.limit, Some(20));
    assert_eq!(connection.queries(), 0);
}

#[test]
fn test_initial_load_resolves_user_types() {
    let connection = Arc::new(ScriptedConnection::with_user_types());
    let session = session_with(&connection);
    let registry = session.registry();

    assert_eq!(registry.lookup_column(HSTORE_OID, -1, "hstore").logical, LogicalType::Hstore);
    assert_eq!(connection.queries(), 1);

    assert_eq!(
        registry.lookup_column(MOOD_OID, -1, "mood").logical,
        LogicalType::SpecializedString("mood".into())
    );
    assert_eq!(
        registry.lookup_column(MOOD_ARRAY_OID, -1, "mood[]").logical,
        LogicalType::array_of(LogicalType::SpecializedString("mood".into()))
    );
    assert_eq!(registry.lookup_column(POSINT_OID, -1, "posint").logical, LogicalType::Integer);
    assert_eq!(
        registry.lookup_column(FLOATRANGE_OID, -1, "floatrange").logical,
        LogicalType::range_of(LogicalType::Float)
    );
    assert_eq!(connection.queries(), 1);
}

#[test]
fn test_values_of_loaded_types_decode() {
    let connection = Arc::new(ScriptedConnection::with_user_types());
    let session = session_with(&connection);
    let descriptor = session.registry().lookup_column(HSTORE_OID, -1, "hstore");

    let decoded = session.codec().decode(Some(r#""a"=>"1", "b"=>NULL"#), &descriptor).unwrap();
    let mut expected = BTreeMap::new();
    expected.insert("a".to_string(), Some("1".to_string()));
    expected.insert("b".to_string(), None);
    assert_eq!(decoded, Value::Hstore(expected));
}

#[test]
fn test_unknown_id_is_reloaded_once_then_unknown() {
    let connection = Arc::new(ScriptedConnection::with_user_types());
    let session = session_with(&connection);
    let registry = session.registry();

    let descriptor = registry.lookup_column(99_999, -1, "mystery");
    assert_eq!(descriptor.logical, LogicalType::Unknown);
    assert_eq!(descriptor.catalog_id, Some(99_999));
    // initial load, then one bounded reload
    assert_eq!(connection.queries(), 2);

    assert_eq!(registry.lookup_column(99_999, -1, "mystery").logical, LogicalType::Unknown);
    assert_eq!(connection.queries(), 2);

    let text = session.codec().decode(Some("anything"), &descriptor).unwrap();
    assert_eq!(text, Value::String("anything".into()));
}

#[test]
fn test_catalog_failure_degrades_to_unknown() {
    let connection = Arc::new(ScriptedConnection::with_user_types().failing());
    let session = session_with(&connection);
    let registry = session.registry();

    let err = registry.lookup(&TypeKey::Oid(HSTORE_OID)).unwrap_err();
    assert!(matches!(err, TypeError::CatalogUnavailable(_)));
    assert!(err.is_recoverable());

    assert_eq!(registry.lookup_column(MOOD_OID, -1, "mood").logical, LogicalType::Unknown);
}

#[test]
fn test_invalidate_allows_a_fresh_load() {
    let connection = Arc::new(ScriptedConnection::with_user_types().failing());
    let session = session_with(&connection);

    assert_eq!(session.registry().lookup_column(MOOD_OID, -1, "mood").logical, LogicalType::Unknown);

    connection.set_failing(false);
    session.types_changed();
    let queries = connection.queries();

    assert_eq!(
        session.registry().lookup_column(MOOD_OID, -1, "mood").logical,
        LogicalType::SpecializedString("mood".into())
    );
    assert_eq!(connection.queries(), queries + 1);
}

#[test]
fn test_concurrent_misses_issue_one_query() {
    let connection = Arc::new(ScriptedConnection::with_user_types().slow(Duration::from_millis(50)));
    let session = session_with(&connection);

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let descriptor = session.registry().lookup_column(MOOD_OID, -1, "mood");
                assert_eq!(descriptor.logical, LogicalType::SpecializedString("mood".into()));
            });
        }
    });
    assert_eq!(connection.queries(), 1);
}

#[test]
fn test_connection_is_unused_for_name_dialects() {
    let connection = Arc::new(ScriptedConnection::with_user_types());
    let shared: Arc<dyn Connection> = Arc::clone(&connection) as Arc<dyn Connection>;
    let session = Session::establish(CodecSettings::for_dialect(dialectcodec::DialectKind::Mysql), Some(shared));

    let descriptor = session.registry().lookup_declared("varchar(40)");
    assert_eq!(descriptor.logical, LogicalType::String);
    assert_eq!(descriptor.facets.limit, Some(40));
    assert_eq!(connection.queries(), 0);
}
