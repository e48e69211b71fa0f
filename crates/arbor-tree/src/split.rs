use std::collections::{BTreeMap, BTreeSet};

use crate::{Criterion, Dataset, FeatureIndex, Value, impurity::mse};

/// Best `feature == value` predicate found for a node.
#[derive(Debug, Clone)]
pub struct EqualitySplit {
    /// Feature the predicate tests.
    pub feature: FeatureIndex,
    /// Value the feature is compared against.
    pub value: Value,
    /// Split score: summed child MSE for regression, impurity decrease for
    /// classification.
    pub score: f64,
    /// Row indices where the predicate holds.
    pub left: Vec<usize>,
    /// Row indices where the predicate fails.
    pub right: Vec<usize>,
}

/// Entropy reduction from partitioning `labels` by each distinct value of
/// `feature_values`.
///
/// `feature_values[i]` is the feature value of the sample labeled
/// `labels[i]`. A constant feature has gain 0.
#[must_use]
pub fn information_gain<F: Ord, L: Ord>(feature_values: &[F], labels: &[L]) -> f64 {
    impurity_gain(Criterion::Entropy, feature_values, labels)
}

/// Gini reduction from partitioning `labels` by each distinct value of
/// `feature_values`.
#[must_use]
pub fn gini_gain<F: Ord, L: Ord>(feature_values: &[F], labels: &[L]) -> f64 {
    impurity_gain(Criterion::Gini, feature_values, labels)
}

/// Parent impurity minus the size-weighted impurity of each value partition.
pub(crate) fn impurity_gain<F: Ord, L: Ord>(
    criterion: Criterion,
    feature_values: &[F],
    labels: &[L],
) -> f64 {
    debug_assert_eq!(feature_values.len(), labels.len());
    let n = labels.len();
    if n == 0 {
        return 0.0;
    }

    let mut partitions: BTreeMap<&F, Vec<&L>> = BTreeMap::new();
    for (value, label) in feature_values.iter().zip(labels) {
        partitions.entry(value).or_default().push(label);
    }

    let weighted: f64 = partitions
        .values()
        .map(|part| (part.len() as f64 / n as f64) * criterion.of_labels(part))
        .sum();

    criterion.of_labels(labels) - weighted
}

/// Find the `feature == value` predicate minimizing `mse(left) + mse(right)`.
///
/// Scans `features` in order and, within each, the distinct values observed
/// at `rows` in ascending order. Pairs leaving either side empty are skipped.
/// The first pair reaching the minimum wins ties. `target` is indexed by row,
/// like the dataset's columns.
///
/// Returns `None` when no valid pair exists: every feature is constant over
/// `rows`, or `features` is empty.
#[must_use]
pub fn best_binary_regression_split(
    data: &Dataset,
    rows: &[usize],
    features: &[FeatureIndex],
    target: &[f64],
) -> Option<EqualitySplit> {
    let mut best: Option<(FeatureIndex, &Value, f64)> = None;

    for &feature in features {
        let column = data.column_at(feature);
        let distinct: BTreeSet<&Value> = rows.iter().map(|&r| &column[r]).collect();

        for value in distinct {
            let (left, right): (Vec<usize>, Vec<usize>) =
                rows.iter().partition(|&&r| column[r] == *value);
            if left.is_empty() || right.is_empty() {
                continue;
            }
            let left_y: Vec<f64> = left.iter().map(|&r| target[r]).collect();
            let right_y: Vec<f64> = right.iter().map(|&r| target[r]).collect();
            let score = mse(&left_y) + mse(&right_y);

            if best.is_none_or(|(_, _, best_score)| score < best_score) {
                best = Some((feature, value, score));
            }
        }
    }

    let (feature, value, score) = best?;
    Some(materialize(data, rows, feature, value, score))
}

/// Find the `feature == value` predicate maximizing the Gini decrease.
///
/// Same search order, skipping rule, and first-wins tie-breaking as
/// [`best_binary_regression_split`].
pub(crate) fn best_binary_classification_split(
    data: &Dataset,
    rows: &[usize],
    features: &[FeatureIndex],
) -> Option<EqualitySplit> {
    let labels = data.labels_of(rows);
    let n = rows.len() as f64;
    let parent = Criterion::Gini.of_labels(&labels);
    let mut best: Option<(FeatureIndex, &Value, f64)> = None;

    for &feature in features {
        let column = data.column_at(feature);
        let distinct: BTreeSet<&Value> = rows.iter().map(|&r| &column[r]).collect();

        for value in distinct {
            let mut left: Vec<&Value> = Vec::new();
            let mut right: Vec<&Value> = Vec::new();
            for (&r, &label) in rows.iter().zip(&labels) {
                if column[r] == *value {
                    left.push(label);
                } else {
                    right.push(label);
                }
            }
            if left.is_empty() || right.is_empty() {
                continue;
            }
            let decrease = parent
                - (left.len() as f64 / n) * Criterion::Gini.of_labels(&left)
                - (right.len() as f64 / n) * Criterion::Gini.of_labels(&right);

            if best.is_none_or(|(_, _, best_decrease)| decrease > best_decrease) {
                best = Some((feature, value, decrease));
            }
        }
    }

    let (feature, value, score) = best?;
    Some(materialize(data, rows, feature, value, score))
}

fn materialize(
    data: &Dataset,
    rows: &[usize],
    feature: FeatureIndex,
    value: &Value,
    score: f64,
) -> EqualitySplit {
    let column = data.column_at(feature);
    let (left, right) = rows.iter().partition(|&&r| column[r] == *value);
    EqualitySplit {
        feature,
        value: value.clone(),
        score,
        left,
        right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy;

    fn dataset(columns: Vec<(&str, Vec<Value>)>, target: Vec<Value>) -> Dataset {
        Dataset::from_columns(
            columns
                .into_iter()
                .map(|(n, c)| (n.to_string(), c))
                .collect(),
            "y",
            target,
        )
        .unwrap()
    }

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|&v| Value::Int(v)).collect()
    }

    #[test]
    fn perfectly_correlated_feature_recovers_full_entropy() {
        let feature = ["s", "s", "r", "o", "o"];
        let labels = ["no", "no", "yes", "maybe", "maybe"];
        let gain = information_gain(&feature, &labels);
        assert!((gain - entropy(&labels)).abs() < 1e-12);
    }

    #[test]
    fn constant_feature_has_zero_gain() {
        let feature = ["k"; 4];
        let labels = ["a", "b", "a", "b"];
        assert!(information_gain(&feature, &labels).abs() < 1e-12);
        assert!(gini_gain(&feature, &labels).abs() < 1e-12);
    }

    #[test]
    fn gini_gain_partial_separation() {
        // Parent gini 0.5; partitions {a,a,b} and {b}: 3/4 * 4/9 + 0 = 1/3.
        let feature = [1, 1, 1, 2];
        let labels = ["a", "a", "b", "b"];
        assert!((gini_gain(&feature, &labels) - (0.5 - 1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn regression_split_separates_clusters() {
        let data = dataset(
            vec![("g", ints(&[1, 1, 2, 2]))],
            ints(&[10, 10, 20, 20]),
        );
        let target = data.numeric_targets().unwrap();
        let rows = data.all_rows();
        let split =
            best_binary_regression_split(&data, &rows, &[FeatureIndex::new(0)], &target).unwrap();
        assert_eq!(split.value, Value::Int(1));
        assert_eq!(split.left, vec![0, 1]);
        assert_eq!(split.right, vec![2, 3]);
        assert!(split.score.abs() < 1e-12);
    }

    #[test]
    fn regression_split_ties_keep_first_feature() {
        // Both features separate identically; the first listed wins.
        let data = dataset(
            vec![("a", ints(&[5, 5, 6, 6])), ("b", ints(&[0, 0, 1, 1]))],
            ints(&[1, 1, 3, 3]),
        );
        let target = data.numeric_targets().unwrap();
        let rows = data.all_rows();
        let features = [FeatureIndex::new(1), FeatureIndex::new(0)];
        let split = best_binary_regression_split(&data, &rows, &features, &target).unwrap();
        assert_eq!(split.feature, FeatureIndex::new(1));
        assert_eq!(split.value, Value::Int(0));
    }

    #[test]
    fn regression_split_none_for_constant_features() {
        let data = dataset(vec![("a", ints(&[4, 4, 4]))], ints(&[1, 2, 3]));
        let target = data.numeric_targets().unwrap();
        let rows = data.all_rows();
        assert!(
            best_binary_regression_split(&data, &rows, &[FeatureIndex::new(0)], &target).is_none()
        );
        assert!(best_binary_regression_split(&data, &rows, &[], &target).is_none());
    }

    #[test]
    fn regression_split_respects_row_subset() {
        // Over rows {2, 3} only value 7 vs 8 remains to separate.
        let data = dataset(vec![("a", ints(&[1, 2, 7, 8]))], ints(&[0, 0, 5, 9]));
        let target = data.numeric_targets().unwrap();
        let split =
            best_binary_regression_split(&data, &[2, 3], &[FeatureIndex::new(0)], &target)
                .unwrap();
        assert_eq!(split.value, Value::Int(7));
        assert_eq!(split.left, vec![2]);
        assert_eq!(split.right, vec![3]);
    }

    #[test]
    fn classification_split_picks_separating_value() {
        let data = dataset(
            vec![(
                "colour",
                vec![
                    Value::from("red"),
                    Value::from("green"),
                    Value::from("blue"),
                    Value::from("blue"),
                ],
            )],
            vec![
                Value::from("x"),
                Value::from("x"),
                Value::from("z"),
                Value::from("z"),
            ],
        );
        let rows = data.all_rows();
        let split =
            best_binary_classification_split(&data, &rows, &[FeatureIndex::new(0)]).unwrap();
        assert_eq!(split.value, Value::from("blue"));
        assert_eq!(split.left, vec![2, 3]);
        assert!((split.score - 0.5).abs() < 1e-12);
    }
}
