use async_trait::async_trait;
use rusqlite::Statement;

use super::connection::{SqliteConnection, statement_error};
use super::params::Params;
use super::query::build_result_set;
use crate::classify::StatementCategory;
use crate::error::SqlHandlerError;
use crate::executor::SqlExecutor;
use crate::params::BoundParam;
use crate::results::QueryResult;
use crate::types::TransactionCommand;

/// `sqlite3_changes` is not reset by DDL, so affected rows come from the difference in
/// `total_changes()` around the statement.
fn total_changes(conn: &rusqlite::Connection) -> Result<u64, SqlHandlerError> {
    let total: i64 = conn
        .query_row("SELECT total_changes()", [], |row| row.get(0))
        .map_err(|e| statement_error(&e))?;
    Ok(u64::try_from(total).unwrap_or(0))
}

fn last_insert_id(conn: &rusqlite::Connection) -> u64 {
    u64::try_from(conn.last_insert_rowid()).unwrap_or(0)
}

/// Step a bound statement until it is done, discarding any rows it yields
/// (`INSERT ... RETURNING`, a CTE feeding a SELECT).
fn step_to_completion(stmt: &mut Statement<'_>, values: &Params) -> Result<(), SqlHandlerError> {
    let refs = values.as_refs();
    let mut rows = stmt.query(&refs[..])?;
    while rows.next()?.is_some() {}
    Ok(())
}

#[async_trait]
impl SqlExecutor for SqliteConnection {
    async fn run_query(
        &mut self,
        query: &str,
        category: StatementCategory,
    ) -> Result<QueryResult, SqlHandlerError> {
        let sql_owned = query.to_owned();
        self.with_connection(move |conn| match category {
            StatementCategory::RowReturning => {
                let mut stmt = conn.prepare(&sql_owned).map_err(|e| statement_error(&e))?;
                build_result_set(&mut stmt, &[]).map(QueryResult::Rows)
            }
            StatementCategory::Insert => {
                conn.execute_batch(&sql_owned)
                    .map_err(|e| statement_error(&e))?;
                Ok(QueryResult::InsertId(last_insert_id(conn)))
            }
            StatementCategory::Mutating => {
                let before = total_changes(conn)?;
                conn.execute_batch(&sql_owned)
                    .map_err(|e| statement_error(&e))?;
                let after = total_changes(conn)?;
                Ok(QueryResult::AffectedRows(after.saturating_sub(before)))
            }
        })
        .await
    }

    async fn run_prepared(
        &mut self,
        query: &str,
        category: StatementCategory,
        params: Vec<BoundParam>,
    ) -> Result<QueryResult, SqlHandlerError> {
        let sql_owned = query.to_owned();
        let values = Params::convert(params);
        self.with_connection(move |conn| {
            let before = total_changes(conn)?;
            let mut stmt = conn.prepare(&sql_owned).map_err(|e| statement_error(&e))?;
            if stmt.parameter_count() != values.0.len() {
                return Err(SqlHandlerError::invalid_parameter(format!(
                    "statement expects {} parameters, {} given",
                    stmt.parameter_count(),
                    values.0.len()
                )));
            }
            match category {
                StatementCategory::RowReturning => {
                    build_result_set(&mut stmt, &values.0).map(QueryResult::Rows)
                }
                StatementCategory::Insert => {
                    step_to_completion(&mut stmt, &values)?;
                    Ok(QueryResult::InsertId(last_insert_id(conn)))
                }
                StatementCategory::Mutating => {
                    step_to_completion(&mut stmt, &values)?;
                    drop(stmt);
                    let after = total_changes(conn)?;
                    Ok(QueryResult::AffectedRows(after.saturating_sub(before)))
                }
            }
        })
        .await
    }

    async fn run_transaction(
        &mut self,
        command: TransactionCommand,
    ) -> Result<(), SqlHandlerError> {
        let sql = match command {
            TransactionCommand::Start => "BEGIN",
            TransactionCommand::Commit => "COMMIT",
            TransactionCommand::Rollback => "ROLLBACK",
        };
        self.with_connection(move |conn| conn.execute_batch(sql).map_err(|e| statement_error(&e)))
            .await
    }
}
