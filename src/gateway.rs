//! The shared-connection gateway.

use std::fmt;
use std::sync::Arc;

use sqlx::mysql::MySqlConnection;
use sqlx::Connection;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, error, info};

use crate::config::ConnectionConfig;
use crate::error::SqlGatewayError;
use crate::mysql;
use crate::params::QueryParams;
use crate::results::{CustomDbRow, ResultSet};

/// The gateway's one connection. Statements hold the lock for their whole
/// prepare/execute/fetch cycle, so callers sharing a gateway run one after another.
pub type SharedConnection = Arc<Mutex<MySqlConnection>>;

type VarLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

enum ConfigSource {
    Env,
    Lookup(VarLookup),
    Fixed(ConnectionConfig),
}

struct Connected {
    config: ConnectionConfig,
    conn: SharedConnection,
}

/// Owns at most one MySQL connection, opened on first use and reused afterwards.
///
/// Construct one at the application root and hand out references (or an `Arc`):
/// ```rust,no_run
/// use mysql_gateway::prelude::*;
///
/// # async fn demo() -> Result<(), SqlGatewayError> {
/// let db = ConnectionGateway::from_env();
/// let affected = db
///     .execute(
///         "UPDATE users SET active = 1 WHERE id = :id",
///         QueryParams::named().bind("id", 42),
///     )
///     .await?;
/// let user = db
///     .fetch_one("SELECT name FROM users WHERE id = ?", vec![RowValues::Int(42)])
///     .await?;
/// # let _ = (affected, user);
/// db.close().await
/// # }
/// ```
pub struct ConnectionGateway {
    source: ConfigSource,
    state: OnceCell<Connected>,
}

impl ConnectionGateway {
    /// A gateway that reads `DB_*` variables from the process environment on first use.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_source(ConfigSource::Env)
    }

    /// Like [`ConnectionGateway::from_env`], resolving variables through `lookup` instead.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self::with_source(ConfigSource::Lookup(Box::new(lookup)))
    }

    /// A gateway for explicit settings; the environment is not consulted.
    #[must_use]
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_source(ConfigSource::Fixed(config))
    }

    fn with_source(source: ConfigSource) -> Self {
        Self {
            source,
            state: OnceCell::new(),
        }
    }

    fn resolve_config(&self) -> Result<ConnectionConfig, SqlGatewayError> {
        match &self.source {
            ConfigSource::Env => ConnectionConfig::from_env(),
            ConfigSource::Lookup(lookup) => ConnectionConfig::from_lookup(|key| lookup(key)),
            ConfigSource::Fixed(config) => Ok(config.clone()),
        }
    }

    async fn open(&self) -> Result<Connected, SqlGatewayError> {
        let config = self.resolve_config()?;
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            user = %config.user,
            "opening MySQL connection"
        );

        let conn = MySqlConnection::connect_with(&config.connect_options())
            .await
            .map_err(|e| {
                error!(host = %config.host, port = config.port, "MySQL connect failed: {e}");
                SqlGatewayError::connection(e)
            })?;

        Ok(Connected {
            config,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Return the shared connection, opening it on the first call.
    ///
    /// Settings are resolved only when the connection is opened; later environment changes
    /// are not observed. A failed attempt caches nothing, so the next call starts over.
    ///
    /// # Errors
    /// Returns `SqlGatewayError::ConfigError` before any network I/O if `DB_PASS` is missing,
    /// or `SqlGatewayError::ConnectionError` if the server cannot be reached or rejects the login.
    pub async fn acquire(&self) -> Result<SharedConnection, SqlGatewayError> {
        let connected = self.state.get_or_try_init(|| self.open()).await?;
        Ok(Arc::clone(&connected.conn))
    }

    /// Prepare `query`, bind `params`, execute, and return the buffered result.
    ///
    /// # Errors
    /// Returns the `acquire` errors, or `SqlGatewayError::QueryError` if the statement fails.
    pub async fn run_query(
        &self,
        query: &str,
        params: impl Into<QueryParams>,
    ) -> Result<ResultSet, SqlGatewayError> {
        self.run(query, &params.into()).await
    }

    /// First row of the result, or `None` when the query matched nothing.
    ///
    /// # Errors
    /// Same as [`ConnectionGateway::run_query`].
    pub async fn fetch_one(
        &self,
        query: &str,
        params: impl Into<QueryParams>,
    ) -> Result<Option<CustomDbRow>, SqlGatewayError> {
        Ok(self.run_query(query, params).await?.into_first())
    }

    /// All rows of the result in server order; empty when the query matched nothing.
    ///
    /// # Errors
    /// Same as [`ConnectionGateway::run_query`].
    pub async fn fetch_all(
        &self,
        query: &str,
        params: impl Into<QueryParams>,
    ) -> Result<Vec<CustomDbRow>, SqlGatewayError> {
        Ok(self.run_query(query, params).await?.into_rows())
    }

    /// Run an INSERT/UPDATE/DELETE/DDL statement and return the affected-row count.
    ///
    /// # Errors
    /// Same as [`ConnectionGateway::run_query`].
    pub async fn execute(
        &self,
        query: &str,
        params: impl Into<QueryParams>,
    ) -> Result<u64, SqlGatewayError> {
        Ok(self.run_query(query, params).await?.rows_affected)
    }

    pub(crate) async fn run(
        &self,
        query: &str,
        params: &QueryParams,
    ) -> Result<ResultSet, SqlGatewayError> {
        let conn = self.acquire().await?;
        let mut conn = conn.lock().await;
        debug!(sql = query, "running statement");
        mysql::run_statement(&mut conn, query, params).await
    }

    /// Run `;`-separated statements without parameters, e.g. DDL or fixtures.
    ///
    /// # Errors
    /// Returns the `acquire` errors, or `SqlGatewayError::QueryError` if a statement fails.
    pub async fn execute_batch(&self, sql: &str) -> Result<u64, SqlGatewayError> {
        let conn = self.acquire().await?;
        let mut conn = conn.lock().await;
        debug!(sql, "running batch");
        mysql::execute_batch(&mut conn, sql).await
    }

    /// Check the server answers, opening the connection if needed.
    ///
    /// # Errors
    /// Returns the `acquire` errors, or `SqlGatewayError::ConnectionError` if the ping fails.
    pub async fn ping(&self) -> Result<(), SqlGatewayError> {
        let conn = self.acquire().await?;
        let mut conn = conn.lock().await;
        mysql::ping(&mut conn).await
    }

    /// Whether the shared connection has been opened.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.initialized()
    }

    /// The settings the connection was opened with.
    #[must_use]
    pub fn config(&self) -> Option<&ConnectionConfig> {
        self.state.get().map(|connected| &connected.config)
    }

    /// Close the connection gracefully, if one was opened.
    ///
    /// If callers still hold a [`SharedConnection`] from `acquire`, the socket stays open
    /// until the last of them is dropped.
    ///
    /// # Errors
    /// Returns `SqlGatewayError::ConnectionError` if the server-side close fails.
    pub async fn close(self) -> Result<(), SqlGatewayError> {
        let Some(connected) = self.state.into_inner() else {
            return Ok(());
        };
        match Arc::try_unwrap(connected.conn) {
            Ok(conn) => {
                info!(host = %connected.config.host, "closing MySQL connection");
                conn.into_inner()
                    .close()
                    .await
                    .map_err(SqlGatewayError::connection)
            }
            Err(_still_shared) => {
                debug!("connection still referenced elsewhere; leaving it open");
                Ok(())
            }
        }
    }
}

impl fmt::Debug for ConnectionGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            ConfigSource::Env => "env",
            ConfigSource::Lookup(_) => "lookup",
            ConfigSource::Fixed(_) => "fixed",
        };
        f.debug_struct("ConnectionGateway")
            .field("source", &source)
            .field("config", &self.config())
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn gateway_is_shareable() {
        assert_send_sync::<ConnectionGateway>();
    }

    #[tokio::test]
    async fn missing_password_fails_before_connecting() {
        // Unroutable host: getting as far as the network would hang, not return ConfigError.
        let db = ConnectionGateway::from_lookup(|key| match key {
            "DB_HOST" => Some("192.0.2.1".to_string()),
            "DB_PORT" => Some("9".to_string()),
            _ => None,
        });
        let Err(err) = db.acquire().await else {
            panic!("acquire succeeded without DB_PASS");
        };
        assert!(matches!(err, SqlGatewayError::ConfigError(_)));
        assert!(!db.is_connected());
        assert!(db.config().is_none());
    }

    #[tokio::test]
    async fn operations_surface_config_errors() {
        let db = ConnectionGateway::from_lookup(|_| None);
        let err = db
            .fetch_all("SELECT 1", QueryParams::none())
            .await
            .unwrap_err();
        assert!(matches!(err, SqlGatewayError::ConfigError(_)));
        let err = db.execute_batch("SELECT 1").await.unwrap_err();
        assert!(matches!(err, SqlGatewayError::ConfigError(_)));
    }

    #[tokio::test]
    async fn operations_can_be_spawned_onto_the_runtime() {
        let db = Arc::new(ConnectionGateway::from_lookup(|_| None));

        let batch = tokio::spawn({
            let db = Arc::clone(&db);
            async move { db.execute_batch("CREATE TEMPORARY TABLE t (id INT)").await }
        });
        let select = tokio::spawn({
            let db = Arc::clone(&db);
            async move { db.fetch_all("SELECT :id", QueryParams::named().bind("id", 1)).await }
        });

        let batch_err = batch.await.unwrap().unwrap_err();
        assert!(matches!(batch_err, SqlGatewayError::ConfigError(_)));
        let select_err = select.await.unwrap().unwrap_err();
        assert!(matches!(select_err, SqlGatewayError::ConfigError(_)));
    }

    #[tokio::test]
    async fn closing_an_unopened_gateway_is_a_no_op() {
        let db = ConnectionGateway::new(ConnectionConfig::new("127.0.0.1", "u", "p"));
        assert!(format!("{db:?}").contains("fixed"));
        db.close().await.unwrap();
    }
}
