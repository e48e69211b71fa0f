//! Domain types for arbor-io.

use arbor_tree::Row;

/// Rows read from a headed CSV file.
///
/// Produced by [`CsvReader`](crate::CsvReader). `columns` keeps the header
/// order, which the row maps (keyed by name) do not.
#[derive(Debug, Clone)]
pub struct TabularData {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TabularData {
    /// Create a new table. `columns` must be non-empty.
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        debug_assert!(!columns.is_empty(), "table must have at least one column");
        Self { columns, rows }
    }

    /// Return the column names in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Return the rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume the table, returning its rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Return the default target: the last header column.
    pub fn default_target(&self) -> &str {
        self.columns.last().map_or("", String::as_str)
    }

    /// Return the default attributes: every column except the last.
    pub fn default_attributes(&self) -> Vec<String> {
        self.columns[..self.columns.len().saturating_sub(1)].to_vec()
    }
}

/// A tree-building request: the rows, the label column, and the ordered
/// feature columns.
///
/// Field names follow the JSON shape `{"dataset": [...], "targetAttribute":
/// "...", "attributes": [...]}`.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    /// Input rows.
    pub dataset: Vec<Row>,
    /// Label column.
    pub target_attribute: String,
    /// Feature columns, in priority order for tie-breaking.
    pub attributes: Vec<String>,
}
