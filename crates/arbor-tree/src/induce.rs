//! Recursive node builders.
//!
//! Each public builder validates its feature list once, then recurses over
//! row-index subsets of the shared, immutable [`Dataset`]. Every recursive
//! call receives its own copy of the remaining features; nothing is mutated
//! in place.

use std::collections::BTreeMap;

use tracing::trace;

use crate::{
    BRANCH_NO, BRANCH_YES, CartPartition, Criterion, Dataset, FeatureIndex, Split, TreeError,
    TreeNode, Value,
    impurity::class_counts,
    split::{best_binary_classification_split, best_binary_regression_split, impurity_gain},
};

/// Build an ID3 tree: information-gain feature selection with one branch
/// per distinct value of the chosen feature.
///
/// Recursion stops at a uniform leaf when all labels agree, or at a majority
/// leaf when no features remain. The chosen feature is consumed, so depth is
/// bounded by `features.len() + 1`.
///
/// # Errors
///
/// Returns the errors of [`Dataset::resolve_features`].
pub fn induce_classification_multiway(
    data: &Dataset,
    features: &[String],
) -> Result<TreeNode, TreeError> {
    let features = data.resolve_features(features)?;
    Ok(grow_multiway(data, &data.all_rows(), &features, Criterion::Entropy))
}

/// Build a CART classification tree selecting splits by Gini gain.
///
/// With [`CartPartition::Multiway`] the chosen feature is split one branch
/// per value and consumed, exactly like ID3. With [`CartPartition::Binary`]
/// each node tests the single `feature == value` predicate with the largest
/// Gini decrease, routes samples to `"yes"`/`"no"`, and keeps the feature
/// list intact for deeper levels.
///
/// # Errors
///
/// Returns the errors of [`Dataset::resolve_features`].
pub fn induce_classification_binary(
    data: &Dataset,
    features: &[String],
    partition: CartPartition,
) -> Result<TreeNode, TreeError> {
    let features = data.resolve_features(features)?;
    let rows = data.all_rows();
    Ok(match partition {
        CartPartition::Multiway => grow_multiway(data, &rows, &features, Criterion::Gini),
        CartPartition::Binary => grow_binary_classification(data, &rows, &features),
    })
}

/// Build a CART regression tree of equality splits.
///
/// Recursion stops at a mean leaf (rounded to two decimals) when `depth`
/// reaches `max_depth`, when all targets are equal, when `features` is
/// empty, or when no valid split exists. Features are not consumed.
///
/// # Errors
///
/// Returns the errors of [`Dataset::resolve_features`], and
/// [`TreeError::NonNumericTarget`] when a target is text.
pub fn induce_regression_binary(
    data: &Dataset,
    features: &[String],
    depth: usize,
    max_depth: usize,
) -> Result<TreeNode, TreeError> {
    let features = data.resolve_features(features)?;
    let targets = data.numeric_targets()?;
    Ok(grow_regression(
        data,
        &targets,
        &data.all_rows(),
        &features,
        depth,
        max_depth,
    ))
}

fn grow_multiway(
    data: &Dataset,
    rows: &[usize],
    features: &[FeatureIndex],
    criterion: Criterion,
) -> TreeNode {
    let labels = data.labels_of(rows);
    if let Some(leaf) = terminal_leaf(&labels, features.is_empty()) {
        return leaf;
    }
    let Some((best, gain)) = select_feature(data, rows, &labels, features, criterion) else {
        return majority_leaf(&labels);
    };
    trace!(
        attribute = data.feature_name(best),
        gain,
        n_samples = rows.len(),
        "multiway split selected"
    );

    let column = data.column_at(best);
    let mut groups: BTreeMap<&Value, Vec<usize>> = BTreeMap::new();
    for &r in rows {
        groups.entry(&column[r]).or_default().push(r);
    }

    let remaining: Vec<FeatureIndex> = features.iter().copied().filter(|&f| f != best).collect();
    let subtrees = groups
        .into_iter()
        .map(|(value, subset)| {
            (
                value.to_string(),
                grow_multiway(data, &subset, &remaining, criterion),
            )
        })
        .collect();

    TreeNode::Decision {
        split: Split::Multiway {
            attribute: data.feature_name(best).to_string(),
        },
        data_count: rows.len(),
        subtrees,
    }
}

fn grow_binary_classification(
    data: &Dataset,
    rows: &[usize],
    features: &[FeatureIndex],
) -> TreeNode {
    let labels = data.labels_of(rows);
    if let Some(leaf) = terminal_leaf(&labels, features.is_empty()) {
        return leaf;
    }
    let Some(split) = best_binary_classification_split(data, rows, features) else {
        return majority_leaf(&labels);
    };
    trace!(
        attribute = data.feature_name(split.feature),
        value = %split.value,
        decrease = split.score,
        "binary classification split selected"
    );

    let yes = grow_binary_classification(data, &split.left, features);
    let no = grow_binary_classification(data, &split.right, features);
    TreeNode::Decision {
        split: Split::Equals {
            attribute: data.feature_name(split.feature).to_string(),
            value: split.value,
        },
        data_count: rows.len(),
        subtrees: BTreeMap::from([(BRANCH_YES.to_string(), yes), (BRANCH_NO.to_string(), no)]),
    }
}

fn grow_regression(
    data: &Dataset,
    targets: &[f64],
    rows: &[usize],
    features: &[FeatureIndex],
    depth: usize,
    max_depth: usize,
) -> TreeNode {
    let ys: Vec<f64> = rows.iter().map(|&r| targets[r]).collect();
    let uniform = ys.iter().all(|&y| y == ys[0]);
    if depth >= max_depth || uniform || features.is_empty() {
        return mean_leaf(&ys);
    }
    let Some(split) = best_binary_regression_split(data, rows, features, targets) else {
        return mean_leaf(&ys);
    };
    trace!(
        attribute = data.feature_name(split.feature),
        value = %split.value,
        score = split.score,
        depth,
        "regression split selected"
    );

    let yes = grow_regression(data, targets, &split.left, features, depth + 1, max_depth);
    let no = grow_regression(data, targets, &split.right, features, depth + 1, max_depth);
    TreeNode::Decision {
        split: Split::Equals {
            attribute: data.feature_name(split.feature).to_string(),
            value: split.value,
        },
        data_count: rows.len(),
        subtrees: BTreeMap::from([(BRANCH_YES.to_string(), yes), (BRANCH_NO.to_string(), no)]),
    }
}

/// Highest-gain feature; the first in `features` order wins ties.
fn select_feature(
    data: &Dataset,
    rows: &[usize],
    labels: &[&Value],
    features: &[FeatureIndex],
    criterion: Criterion,
) -> Option<(FeatureIndex, f64)> {
    let mut best: Option<(FeatureIndex, f64)> = None;
    for &feature in features {
        let values = data.values_of(feature, rows);
        let gain = impurity_gain(criterion, &values, labels);
        if best.is_none_or(|(_, best_gain)| gain > best_gain) {
            best = Some((feature, gain));
        }
    }
    best
}

/// Leaf for a node that cannot split: uniform labels, or no features left.
fn terminal_leaf(labels: &[&Value], exhausted: bool) -> Option<TreeNode> {
    let counts = class_counts(labels);
    if counts.len() == 1 {
        let label = counts.into_keys().next()?;
        return Some(TreeNode::Leaf {
            prediction: (*label).clone(),
            count: labels.len(),
            total: labels.len(),
        });
    }
    exhausted.then(|| majority_leaf(labels))
}

/// Most frequent label; ties go to the smallest label in value order.
///
/// `labels` is never empty: `Dataset` rejects zero rows and both partition
/// schemes only recurse into non-empty groups, so the `map_or` default is
/// never taken.
fn majority_leaf(labels: &[&Value]) -> TreeNode {
    debug_assert!(!labels.is_empty(), "majority of an empty node");
    let mut best: Option<(&Value, usize)> = None;
    for (&label, count) in class_counts(labels) {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    let (prediction, count) = best.map_or((Value::Text(String::new()), 0), |(label, count)| {
        (label.clone(), count)
    });
    TreeNode::Leaf {
        prediction,
        count,
        total: labels.len(),
    }
}

/// Mean target rounded half to even at two decimals.
fn mean_leaf(ys: &[f64]) -> TreeNode {
    let mean = ys.iter().sum::<f64>() / ys.len() as f64;
    TreeNode::Leaf {
        prediction: Value::Float((mean * 100.0).round_ties_even() / 100.0),
        count: ys.len(),
        total: ys.len(),
    }
}
