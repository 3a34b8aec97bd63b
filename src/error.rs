use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlGatewayError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {message}")]
    ConnectionError {
        message: String,
        code: Option<String>,
        #[source]
        source: Option<sqlx::Error>,
    },

    #[error("Query error: {message}")]
    QueryError {
        message: String,
        code: Option<String>,
        #[source]
        source: Option<sqlx::Error>,
    },
}

impl SqlGatewayError {
    /// Wrap a driver error raised while opening the connection.
    pub(crate) fn connection(err: sqlx::Error) -> Self {
        let (message, code) = driver_diagnostics(&err);
        SqlGatewayError::ConnectionError {
            message,
            code,
            source: Some(err),
        }
    }

    /// Wrap a driver error raised while preparing, binding or executing a statement.
    pub(crate) fn query(err: sqlx::Error) -> Self {
        let (message, code) = driver_diagnostics(&err);
        SqlGatewayError::QueryError {
            message,
            code,
            source: Some(err),
        }
    }

    /// A statement-level failure detected before the driver was involved.
    pub(crate) fn query_msg(message: impl Into<String>) -> Self {
        SqlGatewayError::QueryError {
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// The driver's diagnostic code (SQLSTATE) when the server reported one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            SqlGatewayError::ConfigError(_) => None,
            SqlGatewayError::ConnectionError { code, .. }
            | SqlGatewayError::QueryError { code, .. } => code.as_deref(),
        }
    }

    /// The diagnostic message, as reported by the driver for driver failures.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            SqlGatewayError::ConfigError(message)
            | SqlGatewayError::ConnectionError { message, .. }
            | SqlGatewayError::QueryError { message, .. } => message,
        }
    }

    /// The MySQL server error number (e.g. 1064 for a syntax error), if any.
    #[must_use]
    pub fn server_error_number(&self) -> Option<u16> {
        let source = match self {
            SqlGatewayError::ConfigError(_) => return None,
            SqlGatewayError::ConnectionError { source, .. }
            | SqlGatewayError::QueryError { source, .. } => source.as_ref()?,
        };
        let db_err = source.as_database_error()?;
        db_err
            .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
            .map(sqlx::mysql::MySqlDatabaseError::number)
    }
}

fn driver_diagnostics(err: &sqlx::Error) -> (String, Option<String>) {
    match err.as_database_error() {
        Some(db_err) => (
            db_err.message().to_string(),
            db_err.code().map(|c| c.into_owned()),
        ),
        None => (err.to_string(), None),
    }
}
