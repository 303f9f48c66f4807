#![cfg(feature = "mysql")]
//! Runs against a live server only when `MYSQL_DATABASE` is set, e.g.
//! `MYSQL_HOST=127.0.0.1 MYSQL_USER=root MYSQL_PASSWORD=... MYSQL_DATABASE=test`.

use sql_handler::prelude::*;

fn live_handler() -> Option<SqlHandler> {
    match std::env::var("MYSQL_DATABASE") {
        Ok(db) if !db.is_empty() => SqlHandler::from_env().ok(),
        _ => {
            eprintln!("MYSQL_DATABASE not set; skipping live MySQL test");
            None
        }
    }
}

#[tokio::test]
async fn mysql_round_trip() -> Result<(), SqlHandlerError> {
    let Some(db) = live_handler() else {
        return Ok(());
    };
    db.execute("DROP TABLE IF EXISTS sql_handler_users").await?;
    db.execute(
        "CREATE TABLE sql_handler_users (id INT AUTO_INCREMENT PRIMARY KEY, name VARCHAR(50))",
    )
    .await?;

    let inserted = db
        .execute_prepared(
            "INSERT INTO sql_handler_users (name) VALUES (?)",
            &[RowValues::Text("Ada".into())],
            Some("s"),
        )
        .await?;
    assert_eq!(inserted.insert_id(), Some(1));
    assert_eq!(db.last_insert_id().await, 1);

    let rows = db
        .execute("SELECT id, name FROM sql_handler_users")
        .await?
        .into_rows()
        .unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.results[0].get("name"), Some(&RowValues::Text("Ada".into())));

    let updated = db
        .execute("UPDATE sql_handler_users SET name = 'Grace' WHERE id = 99")
        .await?;
    assert_eq!(updated.affected_rows(), Some(0));

    let err = db
        .execute("SELECT nope FROM sql_handler_users")
        .await
        .expect_err("unknown column");
    assert_eq!(err.code(), Some(1054));
    assert_eq!(db.last_error_code().await, 1054);

    assert!(db.transaction(TransactionCommand::Start).await);
    db.execute("DELETE FROM sql_handler_users").await?;
    assert!(db.transaction(TransactionCommand::Rollback).await);
    let rows = db.execute("SELECT id FROM sql_handler_users").await?;
    assert_eq!(rows.rows().map(ResultSet::len), Some(1));

    db.execute("DROP TABLE sql_handler_users").await?;
    db.close().await;
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_a_connection_error() {
    let opts = MysqlOptions::builder("nope".into(), "nobody".into(), "x".into())
        .socket("/nonexistent/mysqld.sock")
        .finish();
    let db = SqlHandler::mysql(opts);
    let err = db.execute("SELECT 1").await.expect_err("no server");
    assert!(matches!(err, SqlHandlerError::Connection { .. }));
    assert!(!db.is_open().await);
}
