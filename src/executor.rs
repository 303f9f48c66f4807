use async_trait::async_trait;

use crate::classify::StatementCategory;
use crate::error::SqlHandlerError;
use crate::params::BoundParam;
use crate::results::QueryResult;
use crate::types::TransactionCommand;

/// Operations every backend connection provides.
///
/// The category is decided by the caller; implementations only pick the driver call that
/// produces that shape.
#[async_trait]
pub trait SqlExecutor: Send {
    /// Run `query` as-is through the driver's text protocol.
    async fn run_query(
        &mut self,
        query: &str,
        category: StatementCategory,
    ) -> Result<QueryResult, SqlHandlerError>;

    /// Prepare `query`, bind `params` positionally, execute.
    async fn run_prepared(
        &mut self,
        query: &str,
        category: StatementCategory,
        params: Vec<BoundParam>,
    ) -> Result<QueryResult, SqlHandlerError>;

    /// Issue begin, commit or rollback.
    async fn run_transaction(&mut self, command: TransactionCommand)
    -> Result<(), SqlHandlerError>;
}
