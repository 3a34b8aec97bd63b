use std::sync::Arc;

use super::row::{ColumnIndex, CustomDbRow};
use crate::types::RowValues;

/// The buffered outcome of one executed statement.
///
/// The driver's cursor has already been drained and released by the time a `ResultSet`
/// is handed out, so holding one never pins the shared connection.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<CustomDbRow>,
    /// The number of rows affected (for DML statements)
    pub rows_affected: u64,
    /// `LAST_INSERT_ID()` reported for the statement, if it generated one
    pub last_insert_id: Option<u64>,
    columns: Arc<ColumnIndex>,
}

impl ResultSet {
    /// Create an empty result set whose rows will share `column_names`.
    #[must_use]
    pub fn new(column_names: Vec<String>) -> ResultSet {
        ResultSet {
            results: Vec::new(),
            rows_affected: 0,
            last_insert_id: None,
            columns: Arc::new(ColumnIndex::new(column_names)),
        }
    }

    /// Get the column names for this result set
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.columns.names
    }

    /// Name the columns from the first returned row when none were known up front, as
    /// with `CALL`, whose prepare step reports no result columns.
    pub(crate) fn fill_missing_columns(&mut self, column_names: Vec<String>) {
        if self.columns.names.is_empty() && self.results.is_empty() {
            self.columns = Arc::new(ColumnIndex::new(column_names));
        }
    }

    /// Add a row to the result set
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        self.results
            .push(CustomDbRow::with_index(Arc::clone(&self.columns), row_values));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Take the first row, dropping the rest.
    #[must_use]
    pub fn into_first(self) -> Option<CustomDbRow> {
        self.results.into_iter().next()
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<CustomDbRow> {
        self.results
    }
}
