use futures_util::TryStreamExt;
use sqlx::mysql::{MySqlColumn, MySqlConnection};
use sqlx::{Column, Connection, Either, Executor, Row, Statement};

use super::params::bind_params;
use super::query::extract_row;
use crate::error::SqlGatewayError;
use crate::params::QueryParams;
use crate::results::ResultSet;

/// Prepare, bind, execute and drain one statement.
///
/// The driver's cursor is fully consumed before this returns, so the connection is free for
/// the next statement. A statement that fails to prepare never reaches execution.
///
/// # Errors
/// Returns `SqlGatewayError::QueryError` for placeholder resolution, prepare, bind,
/// execute or decode failures.
pub async fn run_statement(
    conn: &mut MySqlConnection,
    query: &str,
    params: &QueryParams,
) -> Result<ResultSet, SqlGatewayError> {
    let (sql, values) = params.resolve(query)?;
    let arguments = bind_params(&values)?;

    let statement = Executor::prepare(&mut *conn, sql.as_ref())
        .await
        .map_err(SqlGatewayError::query)?;

    let mut result_set = ResultSet::new(column_names(statement.columns()));

    let mut stream = Executor::fetch_many(&mut *conn, statement.query_with(arguments));
    while let Some(item) = stream.try_next().await.map_err(SqlGatewayError::query)? {
        match item {
            Either::Left(done) => {
                result_set.rows_affected += done.rows_affected();
                if done.last_insert_id() != 0 {
                    result_set.last_insert_id = Some(done.last_insert_id());
                }
            }
            Either::Right(row) => {
                if result_set.column_names().is_empty() {
                    result_set.fill_missing_columns(column_names(row.columns()));
                }
                let row_values = extract_row(&row)?;
                result_set.add_row_values(row_values);
            }
        }
    }

    Ok(result_set)
}

fn column_names(columns: &[MySqlColumn]) -> Vec<String> {
    columns.iter().map(|col| col.name().to_string()).collect()
}

/// Execute one or more `;`-separated statements over the text protocol. No parameters.
///
/// # Errors
/// Returns `SqlGatewayError::QueryError` if any statement fails; earlier ones stay applied.
pub async fn execute_batch(conn: &mut MySqlConnection, sql: &str) -> Result<u64, SqlGatewayError> {
    // Through `Executor` so the future is the driver's boxed `Send` future.
    let done = Executor::execute(&mut *conn, sqlx::raw_sql(sql))
        .await
        .map_err(SqlGatewayError::query)?;
    Ok(done.rows_affected())
}

/// Round-trip to the server.
///
/// # Errors
/// Returns `SqlGatewayError::ConnectionError` if the server does not answer.
pub async fn ping(conn: &mut MySqlConnection) -> Result<(), SqlGatewayError> {
    conn.ping().await.map_err(SqlGatewayError::connection)
}
