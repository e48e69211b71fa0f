use std::collections::BTreeMap;
use std::fmt;

use crate::Value;

/// Branch label taken when an equality predicate holds.
pub const BRANCH_YES: &str = "yes";
/// Branch label taken when an equality predicate fails.
pub const BRANCH_NO: &str = "no";

/// Zero-based feature column index into a [`Dataset`](crate::Dataset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based feature column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The test applied at a decision node.
#[derive(Debug, Clone, PartialEq)]
pub enum Split {
    /// One branch per distinct value of `attribute`, labeled by the value.
    Multiway {
        /// Feature the node partitions on.
        attribute: String,
    },
    /// Two branches: [`BRANCH_YES`] where `attribute == value`, [`BRANCH_NO`]
    /// elsewhere.
    Equals {
        /// Feature the predicate tests.
        attribute: String,
        /// Value the feature is compared against.
        value: Value,
    },
}

impl Split {
    /// Return the feature this split tests.
    #[must_use]
    pub fn attribute(&self) -> &str {
        match self {
            Split::Multiway { attribute } | Split::Equals { attribute, .. } => attribute,
        }
    }
}

/// `attribute` for multiway splits, `attribute = value` for equality splits.
impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Multiway { attribute } => f.write_str(attribute),
            Split::Equals { attribute, value } => write!(f, "{attribute} = {value}"),
        }
    }
}

/// A node of an induced decision tree.
///
/// Each decision node exclusively owns its children through `subtrees`, so a
/// tree is finite, acyclic, and immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    /// A terminal node.
    Leaf {
        /// Majority or uniform class label, or the rounded mean target.
        prediction: Value,
        /// Number of samples supporting `prediction`.
        count: usize,
        /// Number of samples that reached this leaf.
        total: usize,
    },
    /// An interior node.
    Decision {
        /// Test applied to route samples.
        split: Split,
        /// Number of samples that reached this node.
        data_count: usize,
        /// Children keyed by branch label. Never empty.
        subtrees: BTreeMap<String, TreeNode>,
    },
}

impl TreeNode {
    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    /// Return the number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            TreeNode::Leaf { total, .. } => *total,
            TreeNode::Decision { data_count, .. } => *data_count,
        }
    }

    /// Return `count / total` for a leaf, `None` for a decision node.
    #[must_use]
    pub fn confidence(&self) -> Option<f64> {
        match self {
            TreeNode::Leaf { count, total, .. } if *total > 0 => {
                Some(*count as f64 / *total as f64)
            }
            _ => None,
        }
    }

    /// Return the total number of nodes in the tree.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Decision { subtrees, .. } => {
                1 + subtrees.values().map(TreeNode::n_nodes).sum::<usize>()
            }
        }
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Decision { subtrees, .. } => subtrees.values().map(TreeNode::n_leaves).sum(),
        }
    }

    /// Return the maximum depth of the tree. A single leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Decision { subtrees, .. } => {
                1 + subtrees.values().map(TreeNode::depth).max().unwrap_or(0)
            }
        }
    }
}
