use std::collections::{BTreeMap, HashSet};

use tracing::{debug, instrument};

use crate::{FeatureIndex, TreeError, Value};

/// One input record: column name to cell value.
pub type Row = BTreeMap<String, Value>;

/// A validated, column-major sample set.
///
/// `columns[feature][sample]` holds the feature matrix and `target[sample]`
/// the parallel label vector. Construction guarantees at least one row, equal
/// column lengths, unique feature names, a target column distinct from every
/// feature, and feature columns that are all-numeric or all-text, so the
/// builders never re-check these invariants.
#[derive(Debug, Clone)]
pub struct Dataset {
    feature_names: Vec<String>,
    columns: Vec<Vec<Value>>,
    target_name: String,
    target: Vec<Value>,
}

impl Dataset {
    /// Build a dataset from row records.
    ///
    /// Only `attributes` and `target` are extracted; other columns of a row
    /// are ignored.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`TreeError::TargetInAttributes`] | `attributes` contains `target` |
    /// | [`TreeError::DuplicateAttribute`] | a name repeats in `attributes` |
    /// | [`TreeError::EmptyDataset`] | `rows` is empty |
    /// | [`TreeError::MissingColumn`] | a row lacks `target` or an attribute |
    /// | [`TreeError::MixedColumnTypes`] | an attribute holds both numbers and text |
    #[instrument(skip(rows, attributes), fields(n_rows = rows.len(), n_attributes = attributes.len()))]
    pub fn from_rows(rows: &[Row], target: &str, attributes: &[String]) -> Result<Self, TreeError> {
        check_attribute_list(target, attributes)?;
        if rows.is_empty() {
            return Err(TreeError::EmptyDataset);
        }

        let mut columns: Vec<Vec<Value>> = attributes
            .iter()
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();
        let mut labels = Vec::with_capacity(rows.len());

        for (row_index, row) in rows.iter().enumerate() {
            let label = row.get(target).ok_or_else(|| TreeError::MissingColumn {
                column: target.to_string(),
                row_index,
            })?;
            labels.push(label.clone());

            for (name, column) in attributes.iter().zip(columns.iter_mut()) {
                let value = row.get(name).ok_or_else(|| TreeError::MissingColumn {
                    column: name.clone(),
                    row_index,
                })?;
                column.push(value.clone());
            }
        }

        for (name, column) in attributes.iter().zip(&columns) {
            check_column_kind(name, column)?;
        }
        debug!(n_samples = labels.len(), "dataset assembled from rows");

        Ok(Self {
            feature_names: attributes.to_vec(),
            columns,
            target_name: target.to_string(),
            target: labels,
        })
    }

    /// Build a dataset from named feature columns and a target column.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`TreeError::TargetInAttributes`] | a feature is named `target_name` |
    /// | [`TreeError::DuplicateAttribute`] | a feature name repeats |
    /// | [`TreeError::EmptyDataset`] | `target` is empty |
    /// | [`TreeError::ColumnLengthMismatch`] | a column's length differs from `target`'s |
    /// | [`TreeError::MixedColumnTypes`] | a feature column holds both numbers and text |
    pub fn from_columns(
        columns: Vec<(String, Vec<Value>)>,
        target_name: impl Into<String>,
        target: Vec<Value>,
    ) -> Result<Self, TreeError> {
        let target_name = target_name.into();
        let (feature_names, columns): (Vec<String>, Vec<Vec<Value>>) = columns.into_iter().unzip();
        check_attribute_list(&target_name, &feature_names)?;
        if target.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        for (name, column) in feature_names.iter().zip(&columns) {
            if column.len() != target.len() {
                return Err(TreeError::ColumnLengthMismatch {
                    column: name.clone(),
                    expected: target.len(),
                    got: column.len(),
                });
            }
            check_column_kind(name, column)?;
        }
        Ok(Self {
            feature_names,
            columns,
            target_name,
            target,
        })
    }

    /// Return the number of samples (always at least one).
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.target.len()
    }

    /// Return the feature column names in dataset order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the target column name.
    #[must_use]
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Return the target vector.
    #[must_use]
    pub fn targets(&self) -> &[Value] {
        &self.target
    }

    /// Return the column for `name`, if it is a feature of this dataset.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.feature_index(name).map(|f| self.column_at(f))
    }

    /// Look up the [`FeatureIndex`] of a feature column by name.
    #[must_use]
    pub fn feature_index(&self, name: &str) -> Option<FeatureIndex> {
        self.feature_names
            .iter()
            .position(|n| n == name)
            .map(FeatureIndex::new)
    }

    /// Return the column at `feature`.
    #[must_use]
    pub fn column_at(&self, feature: FeatureIndex) -> &[Value] {
        &self.columns[feature.index()]
    }

    /// Return the name of the column at `feature`.
    #[must_use]
    pub fn feature_name(&self, feature: FeatureIndex) -> &str {
        &self.feature_names[feature.index()]
    }

    /// Resolve an ordered feature list to column indices.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`TreeError::TargetInAttributes`] | the list contains the target name |
    /// | [`TreeError::DuplicateAttribute`] | a name repeats |
    /// | [`TreeError::UnknownFeature`] | a name is not a feature column |
    pub fn resolve_features(&self, names: &[String]) -> Result<Vec<FeatureIndex>, TreeError> {
        check_attribute_list(&self.target_name, names)?;
        names
            .iter()
            .map(|name| {
                self.feature_index(name)
                    .ok_or_else(|| TreeError::UnknownFeature { name: name.clone() })
            })
            .collect()
    }

    /// Convert every target to `f64` for regression.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NonNumericTarget`] for the first text target.
    pub fn numeric_targets(&self) -> Result<Vec<f64>, TreeError> {
        self.target
            .iter()
            .enumerate()
            .map(|(row_index, value)| {
                value.as_f64().ok_or_else(|| TreeError::NonNumericTarget {
                    row_index,
                    value: value.to_string(),
                })
            })
            .collect()
    }

    /// Every row index, in order.
    pub(crate) fn all_rows(&self) -> Vec<usize> {
        (0..self.n_samples()).collect()
    }

    /// Gather the labels of `rows`.
    pub(crate) fn labels_of(&self, rows: &[usize]) -> Vec<&Value> {
        rows.iter().map(|&r| &self.target[r]).collect()
    }

    /// Gather the values of `feature` at `rows`.
    pub(crate) fn values_of(&self, feature: FeatureIndex, rows: &[usize]) -> Vec<&Value> {
        let column = self.column_at(feature);
        rows.iter().map(|&r| &column[r]).collect()
    }
}

fn check_attribute_list(target: &str, attributes: &[String]) -> Result<(), TreeError> {
    let mut seen = HashSet::with_capacity(attributes.len());
    for name in attributes {
        if name == target {
            return Err(TreeError::TargetInAttributes {
                target: target.to_string(),
            });
        }
        if !seen.insert(name.as_str()) {
            return Err(TreeError::DuplicateAttribute { name: name.clone() });
        }
    }
    Ok(())
}

/// Branch labels are rendered values, so `Int(1)` and `Text("1")` in one
/// column would share a label. Numbers of either width may mix.
fn check_column_kind(name: &str, column: &[Value]) -> Result<(), TreeError> {
    let Some(first) = column.first() else {
        return Ok(());
    };
    let is_text = first.as_str().is_some();
    match column.iter().position(|v| v.as_str().is_some() != is_text) {
        Some(row_index) => Err(TreeError::MixedColumnTypes {
            column: name.to_string(),
            row_index,
        }),
        None => Ok(()),
    }
}
