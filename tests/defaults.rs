use rust_decimal::Decimal;
use serde_json::json;

use dialectcodec::{CodecSettings, Column, DeclaredColumn, DialectKind, LogicalType, PgAttribute, Session, Value};

fn pg_column(session: &Session, type_oid: u32, fmod: i32, sql_type: &str, default: &str) -> Column {
    session.reflector().reflect_pg(&PgAttribute {
        name: "c",
        type_oid,
        fmod,
        sql_type,
        default: Some(default),
        not_null: false,
    })
}

fn declared_column(session: &Session, sql_type: &str, default: &str) -> Column {
    session.reflector().reflect_declared(&DeclaredColumn {
        name: "c",
        sql_type,
        default: Some(default),
        nullable: true,
    })
}

#[test]
fn test_postgres_column_defaults() {
    let session = Session::establish(CodecSettings::default(), None);

    let status = pg_column(&session, 1043, 24, "character varying(20)", "'pending'::character varying");
    assert_eq!(status.default_value, Some(Value::String("pending".into())));
    assert_eq!(status.limit, Some(20));

    let price = pg_column(&session, 1700, ((10 << 16) | 2) + 4, "numeric(10,2)", "'0.00'::numeric");
    assert_eq!(price.default_value, Some(Value::Decimal(Decimal::new(0, 2))));
    assert_eq!((price.precision, price.scale), (Some(10), Some(2)));

    let active = pg_column(&session, 16, -1, "boolean", "false");
    assert_eq!(active.default_value, Some(Value::Boolean(false)));

    let meta = pg_column(&session, 3802, -1, "jsonb", "'{}'::jsonb");
    assert_eq!(meta.default_value, Some(Value::Json(json!({}))));

    let created = pg_column(&session, 1184, -1, "timestamp with time zone", "now()");
    assert!(created.is_expression_default);
    assert_eq!(created.default_function.as_deref(), Some("now()"));
    assert!(created.has_default());
}

#[test]
fn test_mssql_column_defaults() {
    let session = Session::establish(CodecSettings::for_dialect(DialectKind::Mssql), None);

    let note = declared_column(&session, "nvarchar(max)", "(N'hello')");
    assert_eq!(note.logical, LogicalType::Text);
    assert_eq!(note.default_value, Some(Value::String("hello".into())));

    let flag = declared_column(&session, "bit", "((1))");
    assert_eq!(flag.default_value, Some(Value::Boolean(true)));

    let stamp = declared_column(&session, "datetime2(7)", "(getdate())");
    assert_eq!(stamp.precision, Some(7));
    assert!(stamp.is_expression_default);
}

#[test]
fn test_mysql_column_defaults() {
    let session = Session::establish(CodecSettings::for_dialect(DialectKind::Mysql), None);

    let flag = declared_column(&session, "tinyint(1)", "1");
    assert_eq!(flag.logical, LogicalType::Boolean);
    assert_eq!(flag.default_value, Some(Value::Boolean(true)));

    let name = declared_column(&session, "varchar(10)", "'it''s'");
    assert_eq!(name.default_value, Some(Value::String("it's".into())));

    let size = declared_column(&session, "enum('small','medium')", "small");
    assert_eq!(size.limit, Some(6));
    assert_eq!(size.default_value, Some(Value::String("small".into())));

    let updated = declared_column(&session, "datetime", "CURRENT_TIMESTAMP");
    assert!(updated.is_expression_default);
    assert_eq!(updated.default_value, None);
}

#[test]
fn test_sqlite_and_oracle_column_defaults() {
    let sqlite = Session::establish(CodecSettings::for_dialect(DialectKind::Sqlite), None);
    let count = declared_column(&sqlite, "INTEGER", "0");
    assert_eq!(count.logical, LogicalType::Integer);
    assert_eq!(count.default_value, Some(Value::Integer(0)));

    let label = declared_column(&sqlite, "TEXT", "\"none\"");
    assert_eq!(label.default_value, Some(Value::String("none".into())));

    let oracle = Session::establish(CodecSettings::for_dialect(DialectKind::Oracle), None);
    let qty = declared_column(&oracle, "NUMBER(5)", "0 \n");
    assert_eq!(qty.logical, LogicalType::Integer);
    assert_eq!(qty.default_value, Some(Value::Integer(0)));

    let stamp = declared_column(&oracle, "DATE", "SYSDATE");
    assert_eq!(stamp.logical, LogicalType::DateTime);
    assert!(stamp.is_expression_default);
}

#[test]
fn test_missing_and_null_defaults() {
    let session = Session::establish(CodecSettings::default(), None);
    let column = session.reflector().reflect_pg(&PgAttribute {
        name: "c",
        type_oid: 25,
        fmod: -1,
        sql_type: "text",
        default: None,
        not_null: false,
    });
    assert!(!column.has_default());
    assert_eq!(column.default_literal, None);

    let null = pg_column(&session, 25, -1, "text", "NULL::text");
    assert!(!null.has_default());
    assert_eq!(null.default_literal.as_deref(), Some("NULL::text"));
}
