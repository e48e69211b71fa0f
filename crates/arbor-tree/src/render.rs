//! Plain-text tree drawing for terminals and logs.

use std::fmt::Write;

use crate::TreeNode;

/// Draw `tree` as an indented outline, one node per line.
///
/// ```text
/// Split on: outlook (samples: 5)
/// ├── rain: Split on: wind = strong (samples: 3)
/// │   ├── no: Prediction: yes (confidence: 100%, samples: 2/2)
/// │   └── yes: Prediction: no (confidence: 100%, samples: 1/1)
/// └── sunny: Prediction: no (confidence: 100%, samples: 2/2)
/// ```
#[must_use]
pub fn render_text(tree: &TreeNode) -> String {
    let mut out = String::new();
    out.push_str(&describe(tree));
    out.push('\n');
    render_children(tree, "", &mut out);
    out
}

fn render_children(node: &TreeNode, prefix: &str, out: &mut String) {
    let TreeNode::Decision { subtrees, .. } = node else {
        return;
    };
    let last = subtrees.len().saturating_sub(1);
    for (i, (label, child)) in subtrees.iter().enumerate() {
        let (connector, continuation) = if i == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{prefix}{connector}{label}: {}", describe(child));
        render_children(child, &format!("{prefix}{continuation}"), out);
    }
}

fn describe(node: &TreeNode) -> String {
    match node {
        TreeNode::Leaf {
            prediction,
            count,
            total,
        } => {
            let confidence = node.confidence().unwrap_or(0.0) * 100.0;
            format!(
                "Prediction: {prediction} (confidence: {confidence:.0}%, samples: {count}/{total})"
            )
        }
        TreeNode::Decision {
            split, data_count, ..
        } => format!("Split on: {split} (samples: {data_count})"),
    }
}
