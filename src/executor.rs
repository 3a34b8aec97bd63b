use async_trait::async_trait;

use crate::error::SqlGatewayError;
use crate::gateway::ConnectionGateway;
use crate::params::QueryParams;
use crate::results::ResultSet;

/// Statement execution as seen by application code.
///
/// Depend on this trait rather than on [`ConnectionGateway`] directly so the gateway can be
/// injected from the application root (and replaced in tests).
#[async_trait]
pub trait AsyncDatabaseExecutor: Send + Sync {
    /// Executes `;`-separated statements without parameters; returns the affected-row count.
    async fn execute_batch(&self, query: &str) -> Result<u64, SqlGatewayError>;

    /// Executes a single SELECT statement and returns the result set.
    async fn execute_select(
        &self,
        query: &str,
        params: &QueryParams,
    ) -> Result<ResultSet, SqlGatewayError>;

    /// Executes a single DML statement (INSERT, UPDATE, DELETE, etc.) and returns the number of rows affected.
    async fn execute_dml(&self, query: &str, params: &QueryParams) -> Result<u64, SqlGatewayError>;
}

#[async_trait]
impl AsyncDatabaseExecutor for ConnectionGateway {
    async fn execute_batch(&self, query: &str) -> Result<u64, SqlGatewayError> {
        ConnectionGateway::execute_batch(self, query).await
    }

    async fn execute_select(
        &self,
        query: &str,
        params: &QueryParams,
    ) -> Result<ResultSet, SqlGatewayError> {
        self.run(query, params).await
    }

    async fn execute_dml(&self, query: &str, params: &QueryParams) -> Result<u64, SqlGatewayError> {
        Ok(self.run(query, params).await?.rows_affected)
    }
}
