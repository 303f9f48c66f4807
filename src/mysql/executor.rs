use async_trait::async_trait;
use sqlx::{Executor, MySql};

use super::connection::{MysqlConnection, statement_error};
use super::params::bind_all;
use super::query::build_result_set;
use crate::classify::StatementCategory;
use crate::error::SqlHandlerError;
use crate::executor::SqlExecutor;
use crate::params::BoundParam;
use crate::results::QueryResult;
use crate::types::TransactionCommand;

#[async_trait]
impl SqlExecutor for MysqlConnection {
    async fn run_query(
        &mut self,
        query: &str,
        category: StatementCategory,
    ) -> Result<QueryResult, SqlHandlerError> {
        let err = |e: sqlx::Error| statement_error(&e);
        match category {
            StatementCategory::RowReturning => {
                let rows = (&mut self.conn).fetch_all(sqlx::raw_sql(query))
                    .await
                    .map_err(err)?;
                build_result_set(&rows).map(QueryResult::Rows)
            }
            StatementCategory::Insert => {
                let done = (&mut self.conn).execute(sqlx::raw_sql(query))
                    .await
                    .map_err(err)?;
                Ok(QueryResult::InsertId(done.last_insert_id()))
            }
            StatementCategory::Mutating => {
                let done = (&mut self.conn).execute(sqlx::raw_sql(query))
                    .await
                    .map_err(err)?;
                Ok(QueryResult::AffectedRows(done.rows_affected()))
            }
        }
    }

    async fn run_prepared(
        &mut self,
        query: &str,
        category: StatementCategory,
        params: Vec<BoundParam>,
    ) -> Result<QueryResult, SqlHandlerError> {
        let err = |e: sqlx::Error| statement_error(&e);
        // non-persistent: the server-side statement is closed once this call finishes
        let prepared = bind_all(sqlx::query::<MySql>(query).persistent(false), params);
        match category {
            StatementCategory::RowReturning => {
                let rows = prepared.fetch_all(&mut self.conn).await.map_err(err)?;
                build_result_set(&rows).map(QueryResult::Rows)
            }
            StatementCategory::Insert => {
                let done = prepared.execute(&mut self.conn).await.map_err(err)?;
                Ok(QueryResult::InsertId(done.last_insert_id()))
            }
            StatementCategory::Mutating => {
                let done = prepared.execute(&mut self.conn).await.map_err(err)?;
                Ok(QueryResult::AffectedRows(done.rows_affected()))
            }
        }
    }

    async fn run_transaction(
        &mut self,
        command: TransactionCommand,
    ) -> Result<(), SqlHandlerError> {
        let sql = match command {
            TransactionCommand::Start => "START TRANSACTION",
            TransactionCommand::Commit => "COMMIT",
            TransactionCommand::Rollback => "ROLLBACK",
        };
        (&mut self.conn).execute(sqlx::raw_sql(sql))
            .await
            .map(|_| ())
            .map_err(|e| statement_error(&e))
    }
}
