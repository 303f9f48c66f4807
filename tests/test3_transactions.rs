#![cfg(feature = "sqlite")]

use sql_handler::prelude::*;

async fn ledger() -> Result<SqlHandler, SqlHandlerError> {
    let db = SqlHandler::sqlite(SqliteOptions::in_memory());
    db.execute("CREATE TABLE ledger (id INTEGER PRIMARY KEY, amount INTEGER NOT NULL)")
        .await?;
    Ok(db)
}

async fn count(db: &SqlHandler) -> Result<usize, SqlHandlerError> {
    Ok(db
        .execute("SELECT id FROM ledger")
        .await?
        .rows()
        .map_or(0, ResultSet::len))
}

#[tokio::test]
async fn invalid_command_never_connects() {
    let db = SqlHandler::sqlite(SqliteOptions::in_memory());
    for code in [3, -1, 5] {
        assert!(!db.transaction_code(code).await);
    }
    assert!(!db.is_open().await);
    assert_eq!(db.last_error_code().await, 0);
    assert!(TransactionCommand::try_from(5).is_err());
}

#[tokio::test]
async fn commit_keeps_rows() -> Result<(), SqlHandlerError> {
    let db = ledger().await?;
    assert!(db.transaction(TransactionCommand::Start).await);
    db.execute("INSERT INTO ledger (amount) VALUES (10)").await?;
    db.execute("INSERT INTO ledger (amount) VALUES (-4)").await?;
    assert!(db.transaction_code(1).await);
    assert_eq!(db.last_error_code().await, 0);
    assert_eq!(count(&db).await?, 2);
    Ok(())
}

#[tokio::test]
async fn rollback_discards_rows() -> Result<(), SqlHandlerError> {
    let db = ledger().await?;
    db.execute("INSERT INTO ledger (amount) VALUES (1)").await?;

    assert!(db.transaction_code(0).await);
    db.execute("INSERT INTO ledger (amount) VALUES (2)").await?;
    db.execute("DELETE FROM ledger WHERE amount = 1").await?;
    assert!(db.transaction(TransactionCommand::Rollback).await);

    let rows = db
        .execute("SELECT amount FROM ledger")
        .await?
        .into_rows()
        .unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.results[0].get("amount"), Some(&RowValues::Int(1)));
    Ok(())
}

#[tokio::test]
async fn commit_without_transaction_sets_error() -> Result<(), SqlHandlerError> {
    let db = ledger().await?;
    assert!(!db.transaction(TransactionCommand::Commit).await);
    assert_ne!(db.last_error_code().await, 0);
    assert!(!db.last_error_message().await.is_empty());

    // a later success clears it
    assert!(db.transaction(TransactionCommand::Start).await);
    assert_eq!(db.last_error_code().await, 0);
    assert!(db.transaction(TransactionCommand::Rollback).await);
    Ok(())
}
