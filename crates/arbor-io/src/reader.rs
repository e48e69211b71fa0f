//! Readers for CSV datasets, JSON build requests, and tree JSON files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use arbor_tree::{Row, TreeNode, Value};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::{BuildRequest, IoError, TabularData};

/// Reads a headed CSV file into rows of typed cells.
///
/// Expected CSV format:
/// - Header row required: `column1,column2,...,columnN`
/// - One record per row, all with the header's column count
/// - Cells are parsed as integer, then finite float, then kept as text
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::NoColumns`] | Header is empty |
/// | [`IoError::DuplicateColumn`] | Header names a column twice |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
pub struct CsvReader {
    path: PathBuf,
}

impl CsvReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`TabularData`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<TabularData, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets ragged rows reach the InconsistentRowLength
        // check instead of failing as a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?;
        let columns: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
        if columns.is_empty() || columns.iter().all(String::is_empty) {
            return Err(IoError::NoColumns {
                path: self.path.clone(),
            });
        }
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(IoError::DuplicateColumn {
                    path: self.path.clone(),
                    name: name.clone(),
                });
            }
        }
        debug!(n_columns = columns.len(), "read CSV header");

        let mut rows = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;
            if record.len() != columns.len() {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: columns.len(),
                    got: record.len(),
                });
            }
            let row: Row = columns
                .iter()
                .zip(record.iter())
                .map(|(name, cell)| (name.clone(), Value::parse_cell(cell)))
                .collect();
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_rows = rows.len(), n_columns = columns.len(), "CSV dataset loaded");
        Ok(TabularData::new(columns, rows))
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

/// Reads a JSON [`BuildRequest`] file.
pub struct RequestReader {
    path: PathBuf,
}

impl RequestReader {
    /// Create a new reader for the given JSON file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and decode the request.
    ///
    /// Row and attribute validation is left to tree construction.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
    /// | [`IoError::JsonParse`] | Body is not a valid request |
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<BuildRequest, IoError> {
        let request: BuildRequest = read_json(&self.path)?;
        info!(
            n_rows = request.dataset.len(),
            target = %request.target_attribute,
            n_attributes = request.attributes.len(),
            "build request loaded"
        );
        Ok(request)
    }
}

/// Reads a tree previously written by [`TreeWriter`](crate::TreeWriter).
pub struct TreeReader {
    path: PathBuf,
}

impl TreeReader {
    /// Create a new reader for the given JSON file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and decode the tree.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
    /// | [`IoError::JsonParse`] | Body is not a valid tree |
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<TreeNode, IoError> {
        let tree: TreeNode = read_json(&self.path)?;
        debug!(n_nodes = tree.n_nodes(), depth = tree.depth(), "tree loaded");
        Ok(tree)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    let file = std::fs::File::open(path).map_err(|e| IoError::FileNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|e| IoError::JsonParse {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn valid_csv_types_cells() {
        let f = write_temp("size,colour,price\n3,red,10.5\n4,blue,12\n");
        let table = CsvReader::new(f.path()).read().unwrap();
        assert_eq!(table.columns(), &["size", "colour", "price"]);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0]["size"], Value::Int(3));
        assert_eq!(table.rows()[0]["colour"], Value::from("red"));
        assert_eq!(table.rows()[0]["price"], Value::Float(10.5));
        assert_eq!(table.default_target(), "price");
    }

    #[test]
    fn header_only_is_empty_dataset() {
        let f = write_temp("a,b,label\n");
        let err = CsvReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::EmptyDataset { .. }));
    }

    #[test]
    fn ragged_row_rejected() {
        let f = write_temp("a,b,label\nx,y,yes\nx,no\n");
        let err = CsvReader::new(f.path()).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::InconsistentRowLength {
                row_index: 1,
                expected: 3,
                got: 2,
                ..
            }
        ));
    }

    #[test]
    fn duplicate_header_rejected() {
        let f = write_temp("a,a,label\n1,2,yes\n");
        let err = CsvReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::DuplicateColumn { ref name, .. } if name == "a"));
    }

    #[test]
    fn missing_file() {
        let err = CsvReader::new(Path::new("/tmp/arbor_nonexistent_abc123.csv"))
            .read()
            .unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn request_round_trip_from_file() {
        let f = write_temp(
            r#"{"dataset": [{"a": 1, "y": "no"}, {"a": 2, "y": "yes"}],
                "targetAttribute": "y", "attributes": ["a"]}"#,
        );
        let request = RequestReader::new(f.path()).read().unwrap();
        assert_eq!(request.dataset.len(), 2);
        assert_eq!(request.dataset[1]["a"], Value::Int(2));
    }

    #[test]
    fn malformed_request_is_json_error() {
        let f = write_temp(r#"{"dataset": [], "attributes": []}"#);
        let err = RequestReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::JsonParse { .. }));
    }

    #[test]
    fn malformed_tree_is_json_error() {
        let f = write_temp(r#"{"type": "decision", "attribute": "a", "dataCount": 1, "subtrees": {}}"#);
        let err = TreeReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::JsonParse { .. }));
    }
}
