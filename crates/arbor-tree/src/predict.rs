//! Walking a tree to predict targets for new samples.

use std::collections::BTreeMap;

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::{BRANCH_NO, BRANCH_YES, Row, Split, TreeError, TreeNode, Value};

/// The nodes visited while routing one sample from the root.
///
/// `nodes[0]` is the root and `branches[i]` is the label of the edge from
/// `nodes[i]` to `nodes[i + 1]`. The walk is resolved when the last node is
/// a leaf; otherwise it stopped at a decision node whose attribute the sample
/// lacks or whose branches do not include the sample's value.
#[derive(Debug, Clone)]
pub struct DecisionPath<'a> {
    nodes: Vec<&'a TreeNode>,
    branches: Vec<&'a str>,
}

impl<'a> DecisionPath<'a> {
    /// Return the visited nodes, root first.
    #[must_use]
    pub fn nodes(&self) -> &[&'a TreeNode] {
        &self.nodes
    }

    /// Return the branch labels followed, root first.
    #[must_use]
    pub fn branches(&self) -> &[&'a str] {
        &self.branches
    }

    /// Return the node where the walk ended.
    #[must_use]
    pub fn terminal(&self) -> &'a TreeNode {
        // Never empty: the root is pushed before walking.
        self.nodes[self.nodes.len() - 1]
    }

    /// Return `true` if the walk reached a leaf.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.terminal().is_leaf()
    }
}

impl TreeNode {
    /// Route `sample` from this node as far as its values allow.
    ///
    /// Multiway nodes follow the branch labeled with the sample's value as a
    /// string. Equality nodes follow `"yes"` when the sample's value renders
    /// the same as the split value, `"no"` otherwise.
    #[must_use]
    pub fn decision_path<'a>(&'a self, sample: &Row) -> DecisionPath<'a> {
        let mut nodes = vec![self];
        let mut branches = Vec::new();
        let mut current = self;
        while let TreeNode::Decision {
            split, subtrees, ..
        } = current
        {
            let Some((label, child)) = next_branch(split, subtrees, sample) else {
                break;
            };
            branches.push(label);
            nodes.push(child);
            current = child;
        }
        DecisionPath { nodes, branches }
    }

    /// Predict the target for `sample`.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`TreeError::MissingAttribute`] | the sample lacks an attribute on its path |
    /// | [`TreeError::UnresolvedPath`] | no branch matches the sample's value |
    pub fn predict(&self, sample: &Row) -> Result<&Value, TreeError> {
        let path = self.decision_path(sample);
        match path.terminal() {
            TreeNode::Leaf { prediction, .. } => Ok(prediction),
            TreeNode::Decision { split, .. } => {
                let attribute = split.attribute();
                match sample.get(attribute) {
                    None => Err(TreeError::MissingAttribute {
                        attribute: attribute.to_string(),
                    }),
                    Some(value) => Err(TreeError::UnresolvedPath {
                        attribute: attribute.to_string(),
                        value: value.to_string(),
                    }),
                }
            }
        }
    }
}

/// Predict every sample in parallel, preserving input order.
pub fn predict_batch(tree: &TreeNode, samples: &[Row]) -> Vec<Result<Value, TreeError>> {
    samples
        .par_iter()
        .map(|sample| tree.predict(sample).cloned())
        .collect()
}

fn next_branch<'a>(
    split: &Split,
    subtrees: &'a BTreeMap<String, TreeNode>,
    sample: &Row,
) -> Option<(&'a str, &'a TreeNode)> {
    let observed = sample.get(split.attribute())?;
    let label = match split {
        Split::Multiway { .. } => observed.to_string(),
        Split::Equals { value, .. } => {
            let branch = if observed.to_string() == value.to_string() {
                BRANCH_YES
            } else {
                BRANCH_NO
            };
            branch.to_string()
        }
    };
    subtrees
        .get_key_value(label.as_str())
        .map(|(label, child)| (label.as_str(), child))
}
