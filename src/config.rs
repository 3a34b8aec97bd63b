//! Connection settings and their resolution from the environment.

use std::env::VarError;
use std::fmt;

use serde::Deserialize;
use sqlx::mysql::MySqlConnectOptions;

use crate::error::SqlGatewayError;

pub const ENV_HOST: &str = "DB_HOST";
pub const ENV_PORT: &str = "DB_PORT";
pub const ENV_NAME: &str = "DB_NAME";
pub const ENV_CHARSET: &str = "DB_CHARSET";
pub const ENV_USER: &str = "DB_USER";
pub const ENV_PASS: &str = "DB_PASS";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_DATABASE: &str = "db_name";
pub const DEFAULT_CHARSET: &str = "utf8mb4";
pub const DEFAULT_USER: &str = "db_user_login";

/// Settings for the single MySQL connection.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_charset")]
    pub charset: String,
    #[serde(default = "default_user")]
    pub user: String,
    pub password: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_charset() -> String {
    DEFAULT_CHARSET.to_string()
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

impl ConnectionConfig {
    /// Settings for `user`@`host`, with the default port, database and charset.
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            database: default_database(),
            charset: default_charset(),
            user: user.into(),
            password: password.into(),
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Resolve settings from the process environment.
    ///
    /// # Errors
    /// Returns `SqlGatewayError::ConfigError` if `DB_PASS` is unset, `DB_PORT` is not a port
    /// number, or a `DB_*` variable is set to something that is not valid UTF-8.
    pub fn from_env() -> Result<Self, SqlGatewayError> {
        Self::resolve(|key| env_value(key, std::env::var(key)))
    }

    /// Resolve settings through `lookup`, applying the defaults for absent variables.
    ///
    /// # Errors
    /// Returns `SqlGatewayError::ConfigError` if `DB_PASS` is absent or `DB_PORT` is not a port number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SqlGatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(|key| Ok(lookup(key)))
    }

    fn resolve<F>(lookup: F) -> Result<Self, SqlGatewayError>
    where
        F: Fn(&str) -> Result<Option<String>, SqlGatewayError>,
    {
        let Some(password) = lookup(ENV_PASS)? else {
            return Err(SqlGatewayError::ConfigError(format!(
                "{ENV_PASS} is required"
            )));
        };

        let port = match lookup(ENV_PORT)? {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                SqlGatewayError::ConfigError(format!("{ENV_PORT}={raw:?} is not a valid port: {e}"))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: lookup(ENV_HOST)?.unwrap_or_else(default_host),
            port,
            database: lookup(ENV_NAME)?.unwrap_or_else(default_database),
            charset: lookup(ENV_CHARSET)?.unwrap_or_else(default_charset),
            user: lookup(ENV_USER)?.unwrap_or_else(default_user),
            password,
        })
    }

    /// Driver connect options for these settings.
    #[must_use]
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .charset(&self.charset)
    }
}

/// Unset is `None`; set but not UTF-8 is an error rather than a silent fallback.
fn env_value(key: &str, value: Result<String, VarError>) -> Result<Option<String>, SqlGatewayError> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(SqlGatewayError::ConfigError(format!(
            "{key} is set but is not valid UTF-8"
        ))),
    }
}

// Manual Debug so the password never reaches logs.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("charset", &self.charset)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}
