// MySQL module - everything that touches the sqlx MySQL driver
//
// - params: binding `RowValues` into driver arguments
// - query: extracting `RowValues` from driver rows
// - executor: prepare/execute/drain of one statement, raw batches, ping

pub mod executor;
pub mod params;
pub mod query;

pub use executor::{execute_batch, ping, run_statement};
pub use params::bind_params;
pub use query::{extract_row, mysql_extract_value};
