//! JSON wire format for trees.
//!
//! The in-memory [`TreeNode`] carries a structured [`Split`]; the wire form
//! flattens it to the `attribute` string consumed by visualizers:
//!
//! ```json
//! {"type": "decision", "attribute": "size = 3", "dataCount": 4,
//!  "subtrees": {"yes": {"type": "leaf", "prediction": 10.0, "count": 2, "total": 2},
//!               "no":  {"type": "leaf", "prediction": 20.0, "count": 2, "total": 2}}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{BRANCH_NO, BRANCH_YES, Split, TreeError, TreeNode, Value};

/// Separator between attribute and value in an equality descriptor.
const EQUALS_SEPARATOR: &str = " = ";

/// Serialized shape of a [`TreeNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WireNode {
    /// A terminal node.
    Leaf {
        /// Predicted label or rounded mean.
        prediction: Value,
        /// Samples supporting the prediction.
        count: usize,
        /// Samples reaching the leaf.
        total: usize,
    },
    /// An interior node.
    Decision {
        /// Split descriptor: `feature` or `feature = value`.
        attribute: String,
        /// Samples reaching the node.
        #[serde(rename = "dataCount")]
        data_count: usize,
        /// Children keyed by branch label.
        subtrees: BTreeMap<String, WireNode>,
    },
}

impl From<&TreeNode> for WireNode {
    fn from(node: &TreeNode) -> Self {
        match node {
            TreeNode::Leaf {
                prediction,
                count,
                total,
            } => WireNode::Leaf {
                prediction: prediction.clone(),
                count: *count,
                total: *total,
            },
            TreeNode::Decision {
                split,
                data_count,
                subtrees,
            } => WireNode::Decision {
                attribute: split.to_string(),
                data_count: *data_count,
                subtrees: subtrees
                    .iter()
                    .map(|(label, child)| (label.clone(), WireNode::from(child)))
                    .collect(),
            },
        }
    }
}

/// Rebuilds the structured tree. A decision whose branches are exactly
/// `"yes"`/`"no"` and whose attribute contains `" = "` becomes an equality
/// split (split at the last separator); any other decision is multiway.
impl TryFrom<WireNode> for TreeNode {
    type Error = TreeError;

    fn try_from(wire: WireNode) -> Result<Self, Self::Error> {
        match wire {
            WireNode::Leaf {
                prediction,
                count,
                total,
            } => {
                if count > total {
                    return Err(TreeError::MalformedTree {
                        reason: format!("leaf count {count} exceeds total {total}"),
                    });
                }
                Ok(TreeNode::Leaf {
                    prediction,
                    count,
                    total,
                })
            }
            WireNode::Decision {
                attribute,
                data_count,
                subtrees,
            } => {
                if subtrees.is_empty() {
                    return Err(TreeError::MalformedTree {
                        reason: format!("decision on \"{attribute}\" has no subtrees"),
                    });
                }
                let binary = subtrees.len() == 2
                    && subtrees.contains_key(BRANCH_YES)
                    && subtrees.contains_key(BRANCH_NO);
                let split = match attribute.rsplit_once(EQUALS_SEPARATOR) {
                    Some((name, value)) if binary => Split::Equals {
                        attribute: name.to_string(),
                        value: Value::parse_cell(value),
                    },
                    _ => Split::Multiway { attribute },
                };
                let subtrees = subtrees
                    .into_iter()
                    .map(|(label, child)| Ok((label, TreeNode::try_from(child)?)))
                    .collect::<Result<_, TreeError>>()?;
                Ok(TreeNode::Decision {
                    split,
                    data_count,
                    subtrees,
                })
            }
        }
    }
}

impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireNode::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TreeNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireNode::deserialize(deserializer)?;
        TreeNode::try_from(wire).map_err(serde::de::Error::custom)
    }
}
