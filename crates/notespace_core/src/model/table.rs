//! Per-page ad-hoc table rows.
//!
//! Rows are ordered string maps with no declared schema; two rows of the
//! same page may carry different columns.

use indexmap::IndexMap;

/// One table row: column name to cell value, in insertion order.
pub type Row = IndexMap<String, String>;

/// Raw row submission: values for existing columns plus an optional new
/// column definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowInput {
    /// Values keyed by existing column name.
    pub fields: Vec<(String, String)>,
    /// Name of a column introduced by this submission.
    pub new_column: Option<String>,
    /// Value for `new_column`.
    pub new_value: Option<String>,
}

impl RowInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one existing-column value.
    pub fn field(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((column.into(), value.into()));
        self
    }

    /// Defines a new column and its value.
    pub fn new_column(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.new_column = Some(column.into());
        self.new_value = Some(value.into());
        self
    }

    /// Builds the row to store.
    ///
    /// Field values are trimmed and dropped when empty. A new column with a
    /// non-blank name is kept even when its value is empty.
    pub fn into_row(self) -> Row {
        let mut row = compact_row(self.fields);
        let column = self.new_column.unwrap_or_default();
        let column = column.trim();
        if !column.is_empty() {
            let value = self.new_value.unwrap_or_default();
            row.insert(column.to_string(), value.trim().to_string());
        }
        row
    }
}

/// Trims values and drops the empty ones, keeping first-seen column order.
pub fn compact_row<I, K, V>(fields: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    fields
        .into_iter()
        .filter_map(|(column, value)| {
            let value = value.as_ref().trim();
            if value.is_empty() {
                None
            } else {
                Some((column.into(), value.to_string()))
            }
        })
        .collect()
}

/// Returns the union of column names over `rows` in first-seen order.
pub fn table_columns(rows: &[Row]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for column in row.keys() {
            if !columns.iter().any(|known| known == column) {
                columns.push(column.clone());
            }
        }
    }
    columns
}
