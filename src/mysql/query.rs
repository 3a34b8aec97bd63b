use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::mysql::MySqlRow;
use sqlx::mysql::types::MySqlTime;
use sqlx::types::Json;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::error::SqlGatewayError;
use crate::types::RowValues;

/// Extract every column of `row`, in select-list order.
///
/// # Errors
/// Returns `SqlGatewayError::QueryError` if a column cannot be decoded.
pub fn extract_row(row: &MySqlRow) -> Result<Vec<RowValues>, SqlGatewayError> {
    (0..row.columns().len())
        .map(|idx| mysql_extract_value(row, idx))
        .collect()
}

/// Extracts a `RowValues` from a MySQL row at the given index.
///
/// Signed integers widen to `Int`; unsigned values above `i64::MAX` and DECIMALs come
/// back as `Text` so no precision is lost. DATE comes back as ISO text and TIME as
/// `[-]H:MM:SS[.ffffff]`, since TIME holds durations up to 838 hours either side of zero.
///
/// # Errors
/// Returns `SqlGatewayError::QueryError` if the column cannot be retrieved.
pub fn mysql_extract_value(row: &MySqlRow, idx: usize) -> Result<RowValues, SqlGatewayError> {
    let raw = row.try_get_raw(idx).map_err(SqlGatewayError::query)?;
    if raw.is_null() {
        return Ok(RowValues::Null);
    }

    let type_name = row.column(idx).type_info().name();
    let value = match type_name {
        "BOOLEAN" => RowValues::Bool(row.try_get(idx).map_err(SqlGatewayError::query)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            RowValues::Int(row.try_get(idx).map_err(SqlGatewayError::query)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => {
            let v: u64 = row.try_get(idx).map_err(SqlGatewayError::query)?;
            i64::try_from(v).map_or_else(|_| RowValues::Text(v.to_string()), RowValues::Int)
        }
        "YEAR" => {
            let v: u16 = row.try_get_unchecked(idx).map_err(SqlGatewayError::query)?;
            RowValues::Int(i64::from(v))
        }
        "FLOAT" => {
            let v: f32 = row.try_get(idx).map_err(SqlGatewayError::query)?;
            RowValues::Float(f64::from(v))
        }
        "DOUBLE" => RowValues::Float(row.try_get(idx).map_err(SqlGatewayError::query)?),
        "DECIMAL" => RowValues::Text(row.try_get_unchecked(idx).map_err(SqlGatewayError::query)?),
        "DATETIME" => {
            let v: NaiveDateTime = row.try_get(idx).map_err(SqlGatewayError::query)?;
            RowValues::Timestamp(v)
        }
        // The driver only decodes TIMESTAMP as a UTC instant; keep its wall-clock value.
        "TIMESTAMP" => {
            let v: DateTime<Utc> = row.try_get(idx).map_err(SqlGatewayError::query)?;
            RowValues::Timestamp(v.naive_utc())
        }
        "DATE" => {
            let v: NaiveDate = row.try_get(idx).map_err(SqlGatewayError::query)?;
            RowValues::Text(v.to_string())
        }
        "TIME" => {
            let v: MySqlTime = row.try_get(idx).map_err(SqlGatewayError::query)?;
            time_value(&v)
        }
        "JSON" => {
            let Json(v): Json<JsonValue> = row.try_get(idx).map_err(SqlGatewayError::query)?;
            RowValues::JSON(v)
        }
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => {
            RowValues::Blob(row.try_get_unchecked(idx).map_err(SqlGatewayError::query)?)
        }
        // CHAR, VARCHAR, TEXT variants, ENUM, SET and anything newer
        _ => RowValues::Text(row.try_get_unchecked(idx).map_err(SqlGatewayError::query)?),
    };
    Ok(value)
}

fn time_value(time: &MySqlTime) -> RowValues {
    RowValues::Text(time.to_string())
}
