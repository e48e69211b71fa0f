//! Impurity measures over label and target vectors.
//!
//! All measures treat an empty input as pure and return `0.0`; the builders
//! never score an empty partition.

use std::collections::BTreeMap;

/// Criterion for measuring how mixed a set of class labels is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    /// Shannon entropy in bits: -Σ(p_i · log2(p_i))
    Entropy,
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
}

impl Criterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// Classes with a zero count contribute nothing. Returns `0.0` when
    /// `n_samples` is zero.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> f64 {
        if n_samples == 0 {
            return 0.0;
        }
        let n = n_samples as f64;
        match self {
            Criterion::Entropy => -class_counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.log2()
                })
                .sum::<f64>(),
            Criterion::Gini => {
                let sum_sq: f64 = class_counts
                    .iter()
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p
                    })
                    .sum();
                1.0 - sum_sq
            }
        }
    }

    /// Compute the impurity of a label vector.
    #[must_use]
    pub fn of_labels<T: Ord>(&self, labels: &[T]) -> f64 {
        let counts: Vec<usize> = class_counts(labels).into_values().collect();
        self.impurity(&counts, labels.len())
    }
}

/// Count occurrences of each distinct label, in ascending label order.
#[must_use]
pub fn class_counts<T: Ord>(labels: &[T]) -> BTreeMap<&T, usize> {
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

/// Shannon entropy (base 2) of a label vector.
#[must_use]
pub fn entropy<T: Ord>(labels: &[T]) -> f64 {
    Criterion::Entropy.of_labels(labels)
}

/// Gini impurity of a label vector.
#[must_use]
pub fn gini<T: Ord>(labels: &[T]) -> f64 {
    Criterion::Gini.of_labels(labels)
}

/// Total squared deviation from the mean: population variance × count.
#[must_use]
pub fn mse(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean) * (v - mean)).sum()
}
