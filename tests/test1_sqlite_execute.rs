#![cfg(feature = "sqlite")]

use sql_handler::prelude::*;

async fn users_db() -> Result<SqlHandler, SqlHandlerError> {
    let db = SqlHandler::sqlite(SqliteOptions::in_memory());
    db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name VARCHAR(50))")
        .await?;
    Ok(db)
}

#[tokio::test]
async fn insert_then_select_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let db = users_db().await?;

    let inserted = db.execute("INSERT INTO users (name) VALUES ('Ada')").await?;
    let id = inserted.insert_id().expect("insert returns an id");
    assert!(id >= 1);
    assert_eq!(db.last_insert_id().await, id);

    let rows = db
        .execute("SELECT id, name FROM users")
        .await?
        .into_rows()
        .expect("select returns rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.column_names(), ["id", "name"]);
    let row = &rows.results[0];
    assert_eq!(row.get("id"), Some(&RowValues::Int(i64::try_from(id)?)));
    assert_eq!(row.get("name"), Some(&RowValues::Text("Ada".into())));
    Ok(())
}

#[tokio::test]
async fn select_keeps_selected_column_order() -> Result<(), Box<dyn std::error::Error>> {
    let db = users_db().await?;
    db.execute("INSERT INTO users (name) VALUES ('Ada'), ('Grace'), ('Linus')")
        .await?;

    let rows = db
        .execute("  select name, id, length(name) AS len FROM users ORDER BY id")
        .await?
        .into_rows()
        .expect("rows");
    assert_eq!(rows.len(), 3);
    for row in &rows {
        let keys: Vec<&str> = row.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["name", "id", "len"]);
    }
    assert_eq!(rows.results[2].get("len"), Some(&RowValues::Int(5)));
    Ok(())
}

#[tokio::test]
async fn update_and_delete_report_changed_rows() -> Result<(), Box<dyn std::error::Error>> {
    let db = users_db().await?;
    db.execute("INSERT INTO users (name) VALUES ('a'), ('b'), ('c')")
        .await?;

    let updated = db.execute("UPDATE users SET name = 'z' WHERE id <= 2").await?;
    assert_eq!(updated.affected_rows(), Some(2));

    let deleted = db.execute("DELETE FROM users").await?;
    assert_eq!(deleted.affected_rows(), Some(3));

    let none = db.execute("DELETE FROM users WHERE id = 99").await?;
    assert_eq!(none.affected_rows(), Some(0));

    // DDL does not inherit the count of the previous DML
    let ddl = db.execute("CREATE TABLE other (x INT)").await?;
    assert_eq!(ddl.affected_rows(), Some(0));
    Ok(())
}

#[tokio::test]
async fn zero_rows_differs_from_failure() -> Result<(), Box<dyn std::error::Error>> {
    let db = users_db().await?;

    let empty = db.execute("SELECT id, name FROM users WHERE 1 = 0").await?;
    assert!(empty.rows().is_some_and(ResultSet::is_empty));

    let failed = db.execute("SELECT nope FROM missing_table").await;
    assert!(matches!(failed, Err(SqlHandlerError::Statement { .. })));
    Ok(())
}

#[tokio::test]
async fn statement_errors_update_last_error() -> Result<(), Box<dyn std::error::Error>> {
    let db = users_db().await?;
    assert_eq!(db.last_error_code().await, 0);

    // SHOW is row-returning by keyword but not valid SQLite
    let err = db.execute("SHOW TABLES").await.expect_err("not sqlite syntax");
    let code = err.code().expect("statement errors carry a code");
    assert_ne!(code, 0);
    assert_eq!(db.last_error_code().await, code);
    assert!(!db.last_error_message().await.is_empty());

    db.execute("SELECT 1").await?;
    assert_eq!(db.last_error_code().await, 0);
    assert_eq!(db.last_error_message().await, "");
    Ok(())
}

#[tokio::test]
async fn empty_query_never_connects() {
    let db = SqlHandler::sqlite(SqliteOptions::in_memory());
    assert!(matches!(db.execute("").await, Err(SqlHandlerError::EmptyQuery)));
    assert!(matches!(db.execute("   ").await, Err(SqlHandlerError::EmptyQuery)));
    assert!(matches!(
        db.execute_prepared("", &[], None).await,
        Err(SqlHandlerError::EmptyQuery)
    ));
    assert!(!db.is_open().await);
}

#[tokio::test]
async fn single_keyword_statement_runs() -> Result<(), Box<dyn std::error::Error>> {
    let db = SqlHandler::sqlite(SqliteOptions::in_memory());
    // "VACUUM" has no trailing space and is not row-returning
    let result = db.execute("VACUUM").await?;
    assert_eq!(result.affected_rows(), Some(0));
    Ok(())
}

#[tokio::test]
async fn values_keep_their_storage_class() -> Result<(), Box<dyn std::error::Error>> {
    let db = SqlHandler::sqlite(SqliteOptions::in_memory());
    let rows = db
        .execute("SELECT 1 AS i, 2.5 AS f, 'x' AS t, NULL AS n, x'0102' AS b")
        .await?
        .into_rows()
        .expect("rows");
    let row = &rows.results[0];
    assert_eq!(row.get("i"), Some(&RowValues::Int(1)));
    assert_eq!(row.get("f"), Some(&RowValues::Float(2.5)));
    assert_eq!(row.get("t"), Some(&RowValues::Text("x".into())));
    assert_eq!(row.get("n"), Some(&RowValues::Null));
    assert_eq!(row.get("b"), Some(&RowValues::Blob(vec![1, 2])));
    assert_eq!(row.get("i").and_then(RowValues::as_int), Some(&1));
    assert_eq!(row.get("f").and_then(RowValues::as_float), Some(2.5));
    assert_eq!(row.get("t").and_then(RowValues::as_text), Some("x"));
    assert_eq!(row.get("b").and_then(RowValues::as_blob), Some(&[1_u8, 2][..]));
    Ok(())
}
