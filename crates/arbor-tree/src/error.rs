/// Broad failure class of a [`TreeError`], used by callers that only need to
/// distinguish bad data from bad schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Empty sample set, ragged columns, or values of the wrong type.
    InvalidInput,
    /// A referenced feature or target column is absent.
    MissingColumn,
    /// The attribute list violates the dataset schema.
    InvalidAttributeList,
}

/// Errors from dataset validation, tree induction, and prediction.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Returned when the dataset has zero rows.
    #[error("dataset has zero rows")]
    EmptyDataset,

    /// Returned when a row lacks a referenced feature or target column.
    #[error("row {row_index} has no column \"{column}\"")]
    MissingColumn {
        /// The absent column name.
        column: String,
        /// The zero-based index of the offending row.
        row_index: usize,
    },

    /// Returned when a requested feature is not a column of the dataset.
    #[error("unknown feature \"{name}\"")]
    UnknownFeature {
        /// The requested feature name.
        name: String,
    },

    /// Returned when the target attribute also appears in the feature list.
    #[error("target attribute \"{target}\" cannot also be a feature")]
    TargetInAttributes {
        /// The target attribute name.
        target: String,
    },

    /// Returned when a feature name appears more than once.
    #[error("duplicate feature name \"{name}\"")]
    DuplicateAttribute {
        /// The duplicated feature name.
        name: String,
    },

    /// Returned when a column's length differs from the target's.
    #[error("column \"{column}\" has {got} values, expected {expected}")]
    ColumnLengthMismatch {
        /// The offending column name.
        column: String,
        /// The number of target values.
        expected: usize,
        /// The number of values in the column.
        got: usize,
    },

    /// Returned when a feature column holds both numbers and text.
    #[error("column \"{column}\" mixes numbers and text (first at row {row_index})")]
    MixedColumnTypes {
        /// The offending column name.
        column: String,
        /// The zero-based index of the first row whose kind differs from row 0.
        row_index: usize,
    },

    /// Returned when a regression target is not a number.
    #[error("regression target at row {row_index} is not numeric: \"{value}\"")]
    NonNumericTarget {
        /// The zero-based index of the offending row.
        row_index: usize,
        /// The rendered target value.
        value: String,
    },

    /// Returned when a prediction sample lacks an attribute the tree splits on.
    #[error("sample has no value for attribute \"{attribute}\"")]
    MissingAttribute {
        /// The attribute tested at the node where the walk stopped.
        attribute: String,
    },

    /// Returned when no branch of a decision node matches the sample's value.
    #[error("no branch of \"{attribute}\" matches value \"{value}\"")]
    UnresolvedPath {
        /// The attribute tested at the node where the walk stopped.
        attribute: String,
        /// The sample's value for that attribute.
        value: String,
    },

    /// Returned when a serialized tree violates the node invariants.
    #[error("malformed tree: {reason}")]
    MalformedTree {
        /// Human-readable description of the violation.
        reason: String,
    },
}

impl TreeError {
    /// Classify this error into its broad [`ErrorKind`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            TreeError::MissingColumn { .. }
            | TreeError::UnknownFeature { .. }
            | TreeError::MissingAttribute { .. } => ErrorKind::MissingColumn,
            TreeError::TargetInAttributes { .. } | TreeError::DuplicateAttribute { .. } => {
                ErrorKind::InvalidAttributeList
            }
            TreeError::EmptyDataset
            | TreeError::ColumnLengthMismatch { .. }
            | TreeError::MixedColumnTypes { .. }
            | TreeError::NonNumericTarget { .. }
            | TreeError::UnresolvedPath { .. }
            | TreeError::MalformedTree { .. } => ErrorKind::InvalidInput,
        }
    }
}
