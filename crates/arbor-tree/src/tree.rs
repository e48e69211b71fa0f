use tracing::{debug, instrument};

use crate::{
    Dataset, Row, TreeError, TreeNode, induce_classification_binary,
    induce_classification_multiway, induce_regression_binary,
};

/// Depth limit applied to regression trees unless overridden.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Tree-induction algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Information-gain selection, multiway splits, categorical target.
    #[default]
    Id3,
    /// Gini-gain selection, categorical target.
    Cart,
    /// MSE-minimizing equality splits, numeric target, depth-limited.
    Regression,
}

/// How [`Algorithm::Cart`] partitions the samples at a decision node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartPartition {
    /// One branch per distinct value of the Gini-selected feature.
    #[default]
    Multiway,
    /// A `feature == value` predicate with `"yes"`/`"no"` branches.
    Binary,
}

/// Configuration for building a single decision tree.
///
/// Construct via [`TreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter       | Default                        |
/// |-----------------|--------------------------------|
/// | `algorithm`     | `Id3`                          |
/// | `cart_partition`| `Multiway`                     |
/// | `max_depth`     | 3 (regression only)            |
#[derive(Debug, Clone)]
pub struct TreeConfig {
    pub(crate) algorithm: Algorithm,
    pub(crate) cart_partition: CartPartition,
    pub(crate) max_depth: usize,
}

impl TreeConfig {
    /// Create a config for `algorithm` with default parameters.
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            cart_partition: CartPartition::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the regression depth limit. The root is depth 0, so `0` yields a
    /// single leaf. Classification algorithms ignore it.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the CART classification partitioning mode.
    #[must_use]
    pub fn with_cart_partition(mut self, cart_partition: CartPartition) -> Self {
        self.cart_partition = cart_partition;
        self
    }

    /// Return the induction algorithm.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Return the CART partitioning mode.
    #[must_use]
    pub fn cart_partition(&self) -> CartPartition {
        self.cart_partition
    }

    /// Return the regression depth limit.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Build a tree over `data` using the ordered `features`.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`TreeError::TargetInAttributes`] | `features` names the target |
    /// | [`TreeError::DuplicateAttribute`] | a feature repeats |
    /// | [`TreeError::UnknownFeature`] | a feature is not a dataset column |
    /// | [`TreeError::NonNumericTarget`] | regression over a text target |
    #[instrument(skip(self, data, features), fields(algorithm = ?self.algorithm, n_samples = data.n_samples()))]
    pub fn fit(&self, data: &Dataset, features: &[String]) -> Result<TreeNode, TreeError> {
        debug!(
            n_features = features.len(),
            max_depth = self.max_depth,
            cart_partition = ?self.cart_partition,
            "fitting decision tree"
        );

        let tree = match self.algorithm {
            Algorithm::Id3 => induce_classification_multiway(data, features)?,
            Algorithm::Cart => induce_classification_binary(data, features, self.cart_partition)?,
            Algorithm::Regression => induce_regression_binary(data, features, 0, self.max_depth)?,
        };

        debug!(
            n_nodes = tree.n_nodes(),
            n_leaves = tree.n_leaves(),
            depth = tree.depth(),
            "decision tree built"
        );
        Ok(tree)
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new(Algorithm::default())
    }
}

/// Validate row records and build a tree with `config`.
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
/// | [`TreeError::NonNumericTarget`] | regression over a text target |
pub fn build_tree(
    rows: &[Row],
    target: &str,
    attributes: &[String],
    config: &TreeConfig,
) -> Result<TreeNode, TreeError> {
    let data = Dataset::from_rows(rows, target, attributes)?;
    config.fit(&data, attributes)
}

/// Validate row records and build an ID3 classification tree.
///
/// # Errors
///
/// Same as [`build_tree`], minus the regression-only variant.
pub fn build_classification_tree(
    rows: &[Row],
    target: &str,
    attributes: &[String],
) -> Result<TreeNode, TreeError> {
    build_tree(rows, target, attributes, &TreeConfig::new(Algorithm::Id3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Value};

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    fn attrs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn config_defaults() {
        let cfg = TreeConfig::default();
        assert_eq!(cfg.algorithm(), Algorithm::Id3);
        assert_eq!(cfg.cart_partition(), CartPartition::Multiway);
        assert_eq!(cfg.max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn builder_chain() {
        let cfg = TreeConfig::new(Algorithm::Cart)
            .with_cart_partition(CartPartition::Binary)
            .with_max_depth(5);
        assert_eq!(cfg.algorithm(), Algorithm::Cart);
        assert_eq!(cfg.cart_partition(), CartPartition::Binary);
        assert_eq!(cfg.max_depth(), 5);
    }

    #[test]
    fn empty_rows_error() {
        let err = build_classification_tree(&[], "play", &attrs(&["weather"])).unwrap_err();
        assert!(matches!(err, TreeError::EmptyDataset));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn missing_column_error() {
        let rows = vec![row(&[("weather", "sunny"), ("play", "no")]), row(&[("play", "yes")])];
        let err = build_classification_tree(&rows, "play", &attrs(&["weather"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingColumn);
    }

    #[test]
    fn invalid_attribute_list_error() {
        let rows = vec![row(&[("weather", "sunny"), ("play", "no")])];
        let err =
            build_classification_tree(&rows, "play", &attrs(&["weather", "play"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAttributeList);
        let err =
            build_classification_tree(&rows, "play", &attrs(&["weather", "weather"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAttributeList);
    }

    #[test]
    fn json_rows_mixing_numbers_and_text_rejected() {
        let rows: Vec<Row> = serde_json::from_str(
            r#"[{"k": 1, "y": "a"}, {"k": "1", "y": "b"}, {"k": "1", "y": "b"}]"#,
        )
        .unwrap();
        let err = build_classification_tree(&rows, "y", &attrs(&["k"])).unwrap_err();
        assert!(matches!(err, TreeError::MixedColumnTypes { row_index: 1, .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn numeric_json_branches_conserve_counts() {
        let rows: Vec<Row> = serde_json::from_str(
            r#"[{"k": 1, "y": "a"}, {"k": 1.0, "y": "b"}, {"k": 2, "y": "b"}]"#,
        )
        .unwrap();
        let tree = build_classification_tree(&rows, "y", &attrs(&["k"])).unwrap();
        let TreeNode::Decision {
            data_count,
            subtrees,
            ..
        } = &tree
        else {
            panic!("expected a decision root");
        };
        assert_eq!(subtrees.len(), 3);
        let child_sum: usize = subtrees.values().map(TreeNode::n_samples).sum();
        assert_eq!(child_sum, *data_count);
    }

    #[test]
    fn regression_through_config() {
        let rows: Vec<Row> = [("a", 10), ("a", 10), ("b", 20), ("b", 20)]
            .iter()
            .map(|&(g, y)| {
                Row::from([
                    ("g".to_string(), Value::from(g)),
                    ("y".to_string(), Value::Int(y)),
                ])
            })
            .collect();
        let cfg = TreeConfig::new(Algorithm::Regression);
        let tree = build_tree(&rows, "y", &attrs(&["g"]), &cfg).unwrap();
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn deterministic_rebuild() {
        let rows = vec![
            row(&[("a", "x"), ("b", "p"), ("y", "1")]),
            row(&[("a", "x"), ("b", "q"), ("y", "2")]),
            row(&[("a", "z"), ("b", "p"), ("y", "2")]),
            row(&[("a", "z"), ("b", "q"), ("y", "1")]),
        ];
        for config in [
            TreeConfig::new(Algorithm::Id3),
            TreeConfig::new(Algorithm::Cart),
            TreeConfig::new(Algorithm::Cart).with_cart_partition(CartPartition::Binary),
        ] {
            let first = build_tree(&rows, "y", &attrs(&["a", "b"]), &config).unwrap();
            let second = build_tree(&rows, "y", &attrs(&["a", "b"]), &config).unwrap();
            assert_eq!(first, second);
        }
    }
}
