use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::RowValues;

/// Column names and their positions, shared by every row of one result set.
#[derive(Debug, Default)]
pub(crate) struct ColumnIndex {
    pub(crate) names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    pub(crate) fn new(names: Vec<String>) -> Self {
        let mut positions = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            // Duplicate labels (`SELECT a.id, b.id`) resolve to the first occurrence.
            positions.entry(name.clone()).or_insert(i);
        }
        Self { names, positions }
    }

    fn position(&self, column_name: &str) -> Option<usize> {
        self.positions.get(column_name).copied()
    }
}

/// A row from a query result: a mapping from column name to value.
///
/// Column names are shared across all rows of the same `ResultSet`.
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    columns: Arc<ColumnIndex>,
    /// The values for this row, in select-list order
    pub rows: Vec<RowValues>,
}

impl CustomDbRow {
    /// Create a new row from column names and values.
    #[must_use]
    pub fn new(column_names: Vec<String>, rows: Vec<RowValues>) -> Self {
        Self::with_index(Arc::new(ColumnIndex::new(column_names)), rows)
    }

    pub(crate) fn with_index(columns: Arc<ColumnIndex>, rows: Vec<RowValues>) -> Self {
        Self { columns, rows }
    }

    /// The column names for this row
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.columns.names
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.columns.position(column_name)
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }

    /// Iterate `(column, value)` pairs in select-list order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.columns
            .names
            .iter()
            .map(String::as_str)
            .zip(self.rows.iter())
    }

    /// Copy the row into an owned column-name keyed map.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, RowValues> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }
}

impl Serialize for CustomDbRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
