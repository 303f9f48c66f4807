#![cfg(feature = "sqlite")]

use std::sync::Arc;

use sql_handler::prelude::*;

#[tokio::test]
async fn close_is_idempotent_and_final() -> Result<(), SqlHandlerError> {
    let db = SqlHandler::sqlite(SqliteOptions::in_memory());
    db.execute("SELECT 1").await?;
    assert!(db.is_open().await);

    db.close().await;
    db.close().await;
    assert!(!db.is_open().await);
    assert!(matches!(
        db.execute("SELECT 1").await,
        Err(SqlHandlerError::Closed)
    ));
    assert!(matches!(
        db.get_connection().await,
        Err(SqlHandlerError::Closed)
    ));
    assert!(!db.transaction(TransactionCommand::Start).await);
    Ok(())
}

#[tokio::test]
async fn closing_unopened_handler_keeps_it_usable() -> Result<(), SqlHandlerError> {
    let db = SqlHandler::sqlite(SqliteOptions::in_memory());
    db.close().await;
    assert!(!db.is_open().await);
    let result = db.execute("SELECT 1 AS one").await?;
    assert_eq!(result.rows().map(ResultSet::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn connection_is_reused_across_calls() -> Result<(), SqlHandlerError> {
    let db = SqlHandler::sqlite(SqliteOptions::in_memory());
    // an in-memory database only survives on the same connection
    db.execute("CREATE TABLE t (v TEXT)").await?;
    db.execute("INSERT INTO t (v) VALUES ('kept')").await?;

    let mut conn = db.get_connection().await?;
    assert_eq!(conn.database_type(), DatabaseType::Sqlite);
    let sqlite = conn.as_sqlite().expect("sqlite connection");
    let value: String = sqlite
        .with_connection(|c| Ok(c.query_row("SELECT v FROM t", [], |row| row.get(0))?))
        .await?;
    let missing = sqlite
        .with_connection(|c| {
            let v: String = c.query_row("SELECT v FROM nope", [], |row| row.get(0))?;
            Ok(v)
        })
        .await;
    assert!(matches!(missing, Err(SqlHandlerError::Statement { code: 1, .. })));
    assert_eq!(value, "kept");
    drop(conn);

    assert_eq!(db.database_type()?, DatabaseType::Sqlite);
    Ok(())
}

#[tokio::test]
async fn unopenable_file_is_a_connection_error() {
    let db = SqlHandler::sqlite(SqliteOptions::new(
        "/nonexistent-dir/for/sure/db.sqlite".to_string(),
    ));
    let err = db.execute("SELECT 1").await.expect_err("cannot open");
    assert!(matches!(err, SqlHandlerError::Connection { .. }));
    assert_eq!(err.code(), Some(14));
    assert!(!db.is_open().await);
    assert_eq!(db.last_error_code().await, 14);
    assert!(!db.last_error_message().await.is_empty());

    // still unopened, so every attempt reconnects and fails the same way
    assert!(!db.transaction(TransactionCommand::Start).await);
    assert_eq!(db.last_error_code().await, 14);
}

#[tokio::test]
async fn file_database_persists_between_handlers() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("handler.db").to_string_lossy().into_owned();

    let first = SqlHandler::sqlite(SqliteOptions::new(path.clone()));
    first.execute("CREATE TABLE notes (body TEXT)").await?;
    first
        .execute_prepared("INSERT INTO notes (body) VALUES (?)", &[RowValues::Text("hi".into())], None)
        .await?;
    first.close().await;

    let second = SqlHandler::sqlite(SqliteOptions::new(path));
    let rows = second
        .execute("SELECT body FROM notes")
        .await?
        .into_rows()
        .unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.results[0].get("body"), Some(&RowValues::Text("hi".into())));
    second.close().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_handler_serializes_statements() -> Result<(), Box<dyn std::error::Error>> {
    let db = Arc::new(SqlHandler::sqlite(SqliteOptions::in_memory()));
    db.execute("CREATE TABLE hits (id INTEGER PRIMARY KEY AUTOINCREMENT, worker INTEGER)")
        .await?;

    let mut tasks = Vec::new();
    for worker in 0..20_i64 {
        let db = Arc::clone(&db);
        tasks.push(tokio::spawn(async move {
            db.execute_prepared(
                "INSERT INTO hits (worker) VALUES (?)",
                &[RowValues::Int(worker)],
                Some("i"),
            )
            .await
        }));
    }
    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await??.insert_id().expect("insert id"));
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=20).collect::<Vec<u64>>());

    let rows = db.execute("SELECT worker FROM hits").await?;
    assert_eq!(rows.rows().map(ResultSet::len), Some(20));
    Ok(())
}
