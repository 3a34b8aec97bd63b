use sqlx::Arguments;
use sqlx::mysql::MySqlArguments;
use sqlx::types::Json;

use crate::error::SqlGatewayError;
use crate::types::RowValues;

/// Encode values into driver arguments, in `?` order.
///
/// Values travel in the binary protocol alongside the prepared statement; they are never
/// spliced into the SQL text.
///
/// # Errors
/// Returns `SqlGatewayError::QueryError` if the driver refuses to encode a value.
pub fn bind_params(params: &[&RowValues]) -> Result<MySqlArguments, SqlGatewayError> {
    let mut args = MySqlArguments::default();
    for (position, value) in params.iter().enumerate() {
        let bound = match value {
            RowValues::Int(i) => args.add(*i),
            RowValues::Float(f) => args.add(*f),
            RowValues::Text(s) => args.add(s.as_str()),
            RowValues::Bool(b) => args.add(*b),
            RowValues::Timestamp(dt) => args.add(*dt),
            RowValues::Null => args.add(None::<String>),
            RowValues::JSON(json) => args.add(Json(json)),
            RowValues::Blob(bytes) => args.add(bytes.as_slice()),
        };
        bound.map_err(|e| {
            SqlGatewayError::query_msg(format!("failed to bind parameter {}: {e}", position + 1))
        })?;
    }
    Ok(args)
}
