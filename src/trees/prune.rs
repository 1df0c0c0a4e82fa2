//! Reduced-error post-pruning.
use super::{classifier::majority_class, node::Node};
use crate::data::dataset::Dataset;
use std::mem;
use tracing::{debug, warn};

/// Counts of pruning decisions made in one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneSummary {
    /// Internal nodes whose children were both leaves when visited.
    pub examined: usize,
    /// Nodes replaced by a leaf.
    pub collapsed: usize,
}

/// Collapses subtrees into leaves when that strictly improves validation accuracy.
///
/// Children are pruned before their parent, so collapses cascade upward in a
/// single pass. Only nodes whose two children are both leaves are
/// candidates; a candidate is replaced by a leaf labelled with the majority
/// class of `validation` and restored unchanged if accuracy does not rise.
///
/// The tree is rewritten in place. An empty validation set prunes nothing.
pub fn prune(node: &mut Node, validation: &Dataset) -> PruneSummary {
    let mut summary = PruneSummary::default();
    match majority_class(validation) {
        Some(majority) => prune_node(node, validation, &majority, &mut summary),
        None => warn!("empty validation set, skipping pruning"),
    }
    summary
}

fn prune_node(node: &mut Node, validation: &Dataset, majority: &str, summary: &mut PruneSummary) {
    let (left, right) = match node {
        Node::Leaf { .. } => return,
        Node::Internal { left, right, .. } => (left, right),
    };
    prune_node(left, validation, majority, summary);
    prune_node(right, validation, majority, summary);

    if !(left.is_leaf() && right.is_leaf()) {
        return;
    }
    summary.examined += 1;

    let old_correct = correct_predictions(node, validation);
    let original = mem::replace(node, Node::leaf(majority));
    let new_correct = correct_predictions(node, validation);

    let total = validation.len() as f64;
    debug!(
        old_accuracy = old_correct as f64 / total,
        new_accuracy = new_correct as f64 / total,
        collapsed = new_correct > old_correct,
        "pruning candidate"
    );

    if new_correct <= old_correct {
        *node = original;
    } else {
        summary.collapsed += 1;
    }
}

// Same denominator on both sides, so comparing counts compares accuracies.
fn correct_predictions(node: &Node, dataset: &Dataset) -> usize {
    dataset
        .records()
        .iter()
        .filter(|record| node.predict(record) == Dataset::label_of(record))
        .count()
}
