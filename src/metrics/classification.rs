use crate::data::dataset::Dataset;
use crate::error::TreeError;
use crate::trees::node::Node;
use std::collections::BTreeSet;

/// Fraction of records whose own label equals the tree's prediction.
///
/// # Errors
///
/// Returns [`TreeError::EmptyDataset`] if `dataset` has no records.
pub fn evaluate(tree: &Node, dataset: &Dataset) -> Result<f64, TreeError> {
    if dataset.is_empty() {
        return Err(TreeError::EmptyDataset);
    }

    let correct = dataset
        .records()
        .iter()
        .filter(|record| tree.predict(record) == Dataset::label_of(record))
        .count();

    Ok(correct as f64 / dataset.len() as f64)
}

/// Counts of (true label, predicted label) pairs.
///
/// Rows are true labels and columns predicted labels, both in ascending
/// label order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    classes: Vec<String>,
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Computes the confusion matrix of `tree` over `dataset`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyDataset`] if `dataset` has no records.
    pub fn from_predictions(tree: &Node, dataset: &Dataset) -> Result<Self, TreeError> {
        if dataset.is_empty() {
            return Err(TreeError::EmptyDataset);
        }

        let pairs: Vec<(&str, &str)> = dataset
            .records()
            .iter()
            .map(|record| (Dataset::label_of(record), tree.predict(record)))
            .collect();

        let classes: Vec<String> = pairs
            .iter()
            .flat_map(|&(actual, predicted)| [actual, predicted])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut counts = vec![vec![0; classes.len()]; classes.len()];
        for (actual, predicted) in pairs {
            // Every label was inserted into `classes` above.
            if let (Some(row), Some(col)) = (position(&classes, actual), position(&classes, predicted)) {
                counts[row][col] += 1;
            }
        }

        Ok(Self { classes, counts })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of records labelled `actual` that were predicted as `predicted`.
    pub fn count(&self, actual: &str, predicted: &str) -> usize {
        match (position(&self.classes, actual), position(&self.classes, predicted)) {
            (Some(row), Some(col)) => self.counts[row][col],
            _ => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.classes.len()).map(|i| self.counts[i][i]).sum();
        correct as f64 / self.total() as f64
    }

    /// Share of predictions of `class` that were correct; `None` if it was never predicted.
    pub fn precision(&self, class: &str) -> Option<f64> {
        let col = position(&self.classes, class)?;
        let predicted: usize = self.counts.iter().map(|row| row[col]).sum();
        (predicted > 0).then(|| self.counts[col][col] as f64 / predicted as f64)
    }

    /// Share of records of `class` that were found; `None` if the class never occurs.
    pub fn recall(&self, class: &str) -> Option<f64> {
        let row = position(&self.classes, class)?;
        let actual: usize = self.counts[row].iter().sum();
        (actual > 0).then(|| self.counts[row][row] as f64 / actual as f64)
    }
}

fn position(classes: &[String], label: &str) -> Option<usize> {
    classes.binary_search_by(|class| class.as_str().cmp(label)).ok()
}
