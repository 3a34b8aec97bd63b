//! Convenient imports for common functionality.

pub use crate::config::ConnectionConfig;
pub use crate::error::SqlGatewayError;
pub use crate::executor::AsyncDatabaseExecutor;
pub use crate::gateway::{ConnectionGateway, SharedConnection};
pub use crate::params::{QueryAndParams, QueryParams};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::types::RowValues;
