//! Decision tree induction over labeled tabular data.
//!
//! Provides impurity measures (entropy, Gini, MSE), split evaluation, and the
//! three recursive builders: ID3 multiway classification, CART
//! classification, and CART regression with equality splits. Trees are plain
//! owned enums that serialize to the nested `type`/`subtrees` JSON shape and
//! can be walked for prediction or rendered as text.

mod dataset;
mod error;
mod impurity;
mod induce;
mod node;
mod predict;
mod render;
mod serialize;
mod split;
mod tree;
mod value;

pub use dataset::{Dataset, Row};
pub use error::{ErrorKind, TreeError};
pub use impurity::{Criterion, class_counts, entropy, gini, mse};
pub use induce::{
    induce_classification_binary, induce_classification_multiway, induce_regression_binary,
};
pub use node::{BRANCH_NO, BRANCH_YES, FeatureIndex, Split, TreeNode};
pub use predict::{DecisionPath, predict_batch};
pub use render::render_text;
pub use serialize::WireNode;
pub use split::{EqualitySplit, best_binary_regression_split, gini_gain, information_gain};
pub use tree::{
    Algorithm, CartPartition, DEFAULT_MAX_DEPTH, TreeConfig, build_classification_tree,
    build_tree,
};
pub use value::Value;
