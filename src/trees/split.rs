//! Information-gain split search.
use super::node::SplitRule;
use crate::data::dataset::Dataset;
use crate::error::TreeError;
use std::collections::{BTreeMap, BTreeSet};

/// Guards `log2` against a zero probability.
pub const ENTROPY_EPSILON: f64 = 1e-10;

/// How candidate splits are generated for an attribute column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnKind {
    /// Threshold splits `field < candidate`; the smallest value is never a candidate.
    #[default]
    Ordered,
    /// Equality splits `field == candidate` over every distinct value.
    Categorical,
}

impl ColumnKind {
    pub fn rule(self) -> SplitRule {
        match self {
            ColumnKind::Ordered => SplitRule::LessThan,
            ColumnKind::Categorical => SplitRule::Equals,
        }
    }
}

/// Best split found for a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub attribute: usize,
    pub value: String,
    pub gain: f64,
    pub rule: SplitRule,
}

impl Split {
    /// Whether the split partitions with a `<` threshold.
    pub fn is_numeric(&self) -> bool {
        self.rule.is_numeric()
    }
}

/// Shannon entropy (base 2) of the empirical label distribution.
///
/// # Errors
///
/// Returns [`TreeError::EmptyColumn`] if `labels` is empty.
pub fn entropy(labels: &[&str]) -> Result<f64, TreeError> {
    if labels.is_empty() {
        return Err(TreeError::EmptyColumn);
    }

    // Ordered keys fix the summation order.
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }

    let total = labels.len() as f64;
    let entropy = counts
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            -p * (p + ENTROPY_EPSILON).log2()
        })
        .sum::<f64>();

    // The epsilon pulls a single-label column a hair below zero.
    Ok(entropy.max(0.0))
}

/// Entropy of `parent` minus the size-weighted entropy of its two halves.
///
/// A split leaving either half empty has zero gain.
///
/// # Errors
///
/// Returns [`TreeError::EmptyColumn`] if `parent` is empty.
pub fn information_gain(parent: &[&str], left: &[&str], right: &[&str]) -> Result<f64, TreeError> {
    if left.is_empty() || right.is_empty() {
        return Ok(0.0);
    }

    let total = parent.len() as f64;
    let weight_left = left.len() as f64 / total;
    let weight_right = right.len() as f64 / total;

    Ok(entropy(parent)? - weight_left * entropy(left)? - weight_right * entropy(right)?)
}

/// Finds the attribute and value with the highest information gain.
///
/// Every column except the label is searched. `kinds[i]` selects how
/// candidates are generated for attribute `i`; columns without an entry are
/// [`ColumnKind::Ordered`]. Distinct values are visited in ascending string
/// order and the first candidate reaching the maximum gain wins.
///
/// Returns `Ok(None)` when no candidate has a positive gain.
///
/// # Errors
///
/// Returns [`TreeError::EmptyColumn`] for an empty dataset and
/// [`TreeError::SplitComputation`] if scoring an attribute fails.
pub fn best_split(dataset: &Dataset, kinds: &[ColumnKind]) -> Result<Option<Split>, TreeError> {
    if dataset.is_empty() {
        return Err(TreeError::EmptyColumn);
    }

    let labels = dataset.labels();
    let mut best: Option<Split> = None;
    let mut best_gain = 0.0;

    for attribute in 0..dataset.n_attributes() {
        let kind = kinds.get(attribute).copied().unwrap_or_default();
        let candidate = best_attribute_split(dataset, &labels, attribute, kind).map_err(|err| {
            TreeError::SplitComputation {
                attribute,
                source: Box::new(err),
            }
        })?;

        if let Some((value, gain)) = candidate {
            if gain > best_gain {
                best_gain = gain;
                best = Some(Split {
                    attribute,
                    value,
                    gain,
                    rule: kind.rule(),
                });
            }
        }
    }

    Ok(best)
}

// Best (value, gain) for a single column, or `None` if it has no candidates.
fn best_attribute_split(
    dataset: &Dataset,
    labels: &[&str],
    attribute: usize,
    kind: ColumnKind,
) -> Result<Option<(String, f64)>, TreeError> {
    let column = dataset.column(attribute);
    let unique_values: BTreeSet<&str> = column.iter().copied().collect();

    let skip = match kind {
        ColumnKind::Ordered => 1,
        ColumnKind::Categorical => 0,
    };
    let rule = kind.rule();

    let mut best: Option<(String, f64)> = None;
    for &candidate in unique_values.iter().skip(skip) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for (field, &label) in column.iter().zip(labels) {
            if rule.goes_left(field, candidate) {
                left.push(label);
            } else {
                right.push(label);
            }
        }

        let gain = information_gain(labels, &left, &right)?;
        if best.as_ref().map_or(true, |(_, best_gain)| gain > *best_gain) {
            best = Some((candidate.to_string(), gain));
        }
    }

    Ok(best)
}
