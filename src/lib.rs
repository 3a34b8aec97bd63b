//! A lazily opened, shared MySQL connection with four prepared-statement conveniences:
//! [`run_query`](ConnectionGateway::run_query), [`fetch_one`](ConnectionGateway::fetch_one),
//! [`fetch_all`](ConnectionGateway::fetch_all) and [`execute`](ConnectionGateway::execute).
//!
//! Settings come from `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_CHARSET`, `DB_USER` and the
//! required `DB_PASS`. Parameters are always bound through the driver, by position (`?`)
//! or by name (`:name`).

pub mod config;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod mysql;
pub mod params;
pub mod prelude;
pub mod results;
pub mod translation;
pub mod types;

pub use config::ConnectionConfig;
pub use error::SqlGatewayError;
pub use executor::AsyncDatabaseExecutor;
pub use gateway::{ConnectionGateway, SharedConnection};
pub use params::{QueryAndParams, QueryParams};
pub use results::{CustomDbRow, ResultSet};
pub use translation::{TranslatedQuery, translate_named_placeholders};
pub use types::RowValues;
