//! Decision Tree Classifier
use super::{
    node::Node,
    params::TreeParams,
    prune::{prune, PruneSummary},
    split::{best_split, ColumnKind},
};
use crate::{data::dataset::Dataset, error::TreeError, metrics::classification::evaluate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Most frequent label, ties going to the label seen first.
///
/// Returns `None` for an empty dataset.
pub fn majority_class(dataset: &Dataset) -> Option<String> {
    // Counts in first-seen order, so a strict scan keeps the earliest label on ties.
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for label in dataset.labels() {
        match positions.get(label) {
            Some(&position) => counts[position].1 += 1,
            None => {
                positions.insert(label, counts.len());
                counts.push((label, 1));
            }
        }
    }

    let mut majority: Option<(&str, usize)> = None;
    for (label, count) in counts {
        match majority {
            Some((_, best)) if count <= best => {}
            _ => majority = Some((label, count)),
        }
    }

    majority.map(|(label, _)| label.to_string())
}

/// Duplicates random `positive_class` records until both classes are equally large.
///
/// Positive records come first in the result, followed by all others. When
/// no positive record exists there is nothing to oversample and the dataset
/// is returned unchanged.
///
/// # Errors
///
/// Propagates shape errors from joining the two classes.
pub fn oversample<R: Rng + ?Sized>(
    dataset: &Dataset,
    positive_class: &str,
    rng: &mut R,
) -> Result<Dataset, TreeError> {
    let (mut positive, negative) = dataset.partition_by_label(positive_class);

    if positive.is_empty() {
        if !negative.is_empty() {
            warn!(positive_class, "no positive records, skipping oversampling");
        }
        return Ok(dataset.clone());
    }

    if positive.len() < negative.len() {
        let extra = positive.samples(negative.len() - positive.len(), rng);
        positive.extend(extra)?;
    }

    positive.extend(negative)?;
    Ok(positive)
}

/// Balances, shuffles and recursively grows a tree.
///
/// All randomness is drawn from `rng`.
///
/// # Errors
///
/// Returns [`TreeError::EmptyDataset`] for an empty dataset and
/// [`TreeError::TreeConstruction`] if the split search fails anywhere in the
/// tree. No partial tree is returned.
pub fn build_tree<R: Rng + ?Sized>(
    dataset: &Dataset,
    params: &TreeParams,
    rng: &mut R,
) -> Result<Node, TreeError> {
    if dataset.is_empty() {
        return Err(TreeError::EmptyDataset);
    }

    let mut data = match params.positive_class() {
        Some(positive_class) => {
            info!(n_records = dataset.len(), "records before oversampling");
            let balanced = oversample(dataset, positive_class, rng)?;
            info!(n_records = balanced.len(), "records after oversampling");
            balanced
        }
        None => dataset.clone(),
    };
    data.shuffle(rng);

    let fallback = majority_class(&data).unwrap_or_default();
    grow(&data, params.max_depth(), params.column_kinds(), &fallback)
}

fn grow(
    data: &Dataset,
    depth_remaining: usize,
    kinds: &[ColumnKind],
    parent_majority: &str,
) -> Result<Node, TreeError> {
    let majority = match majority_class(data) {
        Some(label) => label,
        None => return Ok(Node::leaf(parent_majority)),
    };
    if depth_remaining == 0 {
        return Ok(Node::leaf(majority));
    }

    let split = best_split(data, kinds).map_err(|err| TreeError::TreeConstruction {
        depth_remaining,
        source: Box::new(err),
    })?;

    let split = match split {
        Some(split) => split,
        None => return Ok(Node::leaf(majority)),
    };
    debug!(
        attribute = split.attribute,
        value = %split.value,
        rule = %split.rule,
        gain = split.gain,
        "best split"
    );

    let (left_data, right_data) = data.partition(split.attribute, &split.value, split.rule);
    let left = grow(&left_data, depth_remaining - 1, kinds, &majority)?;
    let right = grow(&right_data, depth_remaining - 1, kinds, &majority)?;

    Ok(Node::internal(
        split.attribute,
        split.value,
        split.rule,
        left,
        right,
    ))
}

/// Decision Tree Classifier
#[derive(Clone, Debug)]
pub struct DecisionTreeClassifier {
    root: Option<Box<Node>>,
    tree_params: TreeParams,
}

impl Default for DecisionTreeClassifier {
    /// Creates a new instance of the decision tree classifier with default parameters.
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeClassifier {
    /// Creates a new instance of the decision tree classifier with default parameters.
    pub fn new() -> Self {
        Self {
            root: None,
            tree_params: TreeParams::new(),
        }
    }

    /// Creates a new instance of the decision tree classifier with custom parameters.
    ///
    /// # Arguments
    ///
    /// * `max_depth` - The maximum depth of the tree, 8 when `None`.
    /// * `positive_class` - The label oversampled before growth; `None` disables balancing.
    /// * `seed` - Seed for balancing and shuffling; drawn from entropy when `None`.
    ///
    /// # Errors
    ///
    /// This method will return an error if the positive class is blank.
    pub fn with_params(
        max_depth: Option<usize>,
        positive_class: Option<String>,
        seed: Option<u64>,
    ) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        if let Some(max_depth) = max_depth {
            tree.tree_params.set_max_depth(max_depth);
        }
        tree.tree_params.set_positive_class(positive_class)?;
        tree.tree_params.set_seed(seed);
        Ok(tree)
    }

    /// Creates a classifier from a prepared parameter set.
    pub fn from_params(tree_params: TreeParams) -> Self {
        Self {
            root: None,
            tree_params,
        }
    }

    pub fn params(&self) -> &TreeParams {
        &self.tree_params
    }

    pub fn params_mut(&mut self) -> &mut TreeParams {
        &mut self.tree_params
    }

    /// Returns the fitted tree, if any.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_deref()
    }

    /// Builds the decision tree from a dataset.
    ///
    /// Randomness comes from the configured seed, or from entropy without one.
    ///
    /// # Errors
    ///
    /// This method will return an error if the tree couldn't be built.
    pub fn fit(&mut self, dataset: &Dataset) -> Result<(), TreeError> {
        let mut rng = match self.tree_params.seed() {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        self.fit_with_rng(dataset, &mut rng)
    }

    /// Builds the decision tree, drawing all randomness from `rng`.
    ///
    /// # Errors
    ///
    /// This method will return an error if the tree couldn't be built. A
    /// previously fitted tree is kept in that case.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &mut self,
        dataset: &Dataset,
        rng: &mut R,
    ) -> Result<(), TreeError> {
        let root = build_tree(dataset, &self.tree_params, rng)?;
        info!(
            depth = root.depth(),
            n_leaves = root.n_leaves(),
            "finished building the tree"
        );
        self.root = Some(Box::new(root));
        Ok(())
    }

    /// Applies reduced-error pruning against a validation set.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::TreeNotBuilt`] before [`fit`](Self::fit).
    pub fn prune(&mut self, validation: &Dataset) -> Result<PruneSummary, TreeError> {
        let root = self.root.as_deref_mut().ok_or(TreeError::TreeNotBuilt)?;
        Ok(prune(root, validation))
    }

    /// Predicts the label of every record.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::TreeNotBuilt`] before [`fit`](Self::fit).
    pub fn predict(&self, dataset: &Dataset) -> Result<Vec<String>, TreeError> {
        let root = self.root().ok_or(TreeError::TreeNotBuilt)?;
        Ok(dataset
            .records()
            .iter()
            .map(|record| root.predict(record).to_string())
            .collect())
    }

    /// Fraction of records whose label is predicted exactly.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::TreeNotBuilt`] before [`fit`](Self::fit) and
    /// [`TreeError::EmptyDataset`] for an empty dataset.
    pub fn accuracy(&self, dataset: &Dataset) -> Result<f64, TreeError> {
        let root = self.root().ok_or(TreeError::TreeNotBuilt)?;
        evaluate(root, dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trees::node::SplitRule;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn unbalanced_params() -> TreeParams {
        let mut params = TreeParams::new();
        params.set_positive_class(None).unwrap();
        params
    }

    fn scenario_a() -> Dataset {
        Dataset::from_rows(&[
            vec!["1", "A", "yes"],
            vec!["2", "B", "no"],
            vec!["1", "A", "yes"],
            vec!["2", "B", "no"],
        ])
        .unwrap()
    }

    // Labels alternate in blocks so the tree has to grow several levels.
    fn staircase(n: usize) -> Dataset {
        let rows: Vec<Vec<String>> = (0..n)
            .map(|i| {
                let label = if (i / 3) % 2 == 0 { "true" } else { "false" };
                vec![format!("{:03}", i), format!("{:03}", (i * 7) % n), label.to_string()]
            })
            .collect();
        Dataset::from_rows(&rows).unwrap()
    }

    fn assert_leaves_are_majorities(node: &Node, data: &Dataset, parent_majority: &str) {
        match node {
            Node::Leaf { label } => {
                let expected = majority_class(data).unwrap_or_else(|| parent_majority.to_string());
                assert_eq!(label, &expected);
            }
            Node::Internal {
                attribute,
                value,
                rule,
                left,
                right,
            } => {
                let majority = majority_class(data).unwrap();
                let (l, r) = data.partition(*attribute, value, *rule);
                assert_leaves_are_majorities(left, &l, &majority);
                assert_leaves_are_majorities(right, &r, &majority);
            }
        }
    }

    #[test]
    fn test_majority_class() {
        let dataset =
            Dataset::from_rows(&[vec!["1", "no"], vec!["2", "yes"], vec!["3", "yes"]]).unwrap();
        assert_eq!(majority_class(&dataset), Some("yes".to_string()));
    }

    #[test]
    fn test_majority_class_tie_keeps_first_seen() {
        let dataset = Dataset::from_rows(&[
            vec!["1", "b"],
            vec!["2", "a"],
            vec!["3", "a"],
            vec!["4", "b"],
        ])
        .unwrap();
        assert_eq!(majority_class(&dataset), Some("b".to_string()));
    }

    #[test]
    fn test_majority_class_tie_ignores_which_label_reaches_the_count_first() {
        let dataset = Dataset::from_rows(&[
            vec!["1", "a"],
            vec!["2", "b"],
            vec!["3", "b"],
            vec!["4", "a"],
        ])
        .unwrap();
        assert_eq!(majority_class(&dataset), Some("a".to_string()));
    }

    #[test]
    fn test_majority_class_empty() {
        assert_eq!(majority_class(&Dataset::default()), None);
    }

    #[test]
    fn test_oversample_balances_classes() {
        let dataset = Dataset::from_rows(&[
            vec!["1", "true"],
            vec!["2", "false"],
            vec!["3", "false"],
            vec!["4", "false"],
            vec!["5", "false"],
        ])
        .unwrap();
        let balanced = oversample(&dataset, "true", &mut rng()).unwrap();
        let (positive, negative) = balanced.partition_by_label("true");
        assert_eq!(positive.len(), 4);
        assert_eq!(negative.len(), 4);
        assert!(positive.column(0).iter().all(|&v| v == "1"));
    }

    #[test]
    fn test_oversample_leaves_majority_positive_alone() {
        let dataset =
            Dataset::from_rows(&[vec!["1", "true"], vec!["2", "true"], vec!["3", "false"]])
                .unwrap();
        assert_eq!(oversample(&dataset, "true", &mut rng()).unwrap().len(), 3);
    }

    #[test]
    fn test_oversample_without_positive_records() {
        let dataset = Dataset::from_rows(&[vec!["1", "false"], vec!["2", "false"]]).unwrap();
        assert_eq!(oversample(&dataset, "true", &mut rng()).unwrap(), dataset);
    }

    #[test]
    fn test_build_scenario_a() {
        let tree = build_tree(&scenario_a(), &unbalanced_params(), &mut rng()).unwrap();
        assert_eq!(
            tree,
            Node::internal(0, "2", SplitRule::LessThan, Node::leaf("yes"), Node::leaf("no"))
        );
        assert_eq!(evaluate(&tree, &scenario_a()).unwrap(), 1.0);
    }

    #[test]
    fn test_build_single_label_gives_leaf() {
        let dataset =
            Dataset::from_rows(&[vec!["1", "a", "yes"], vec!["2", "b", "yes"]]).unwrap();
        let tree = build_tree(&dataset, &TreeParams::new(), &mut rng()).unwrap();
        assert_eq!(tree, Node::leaf("yes"));
    }

    #[test]
    fn test_build_empty_dataset() {
        let result = build_tree(&Dataset::default(), &TreeParams::new(), &mut rng());
        assert!(matches!(result, Err(TreeError::EmptyDataset)));
    }

    #[test]
    fn test_build_zero_depth_gives_majority_leaf() {
        let mut params = unbalanced_params();
        params.set_max_depth(0);
        let dataset =
            Dataset::from_rows(&[vec!["1", "no"], vec!["2", "yes"], vec!["3", "no"]]).unwrap();
        assert_eq!(build_tree(&dataset, &params, &mut rng()).unwrap(), Node::leaf("no"));
    }

    #[test]
    fn test_build_zero_depth_tie_gives_first_seen_label() {
        let mut params = unbalanced_params();
        params.set_max_depth(0);
        let dataset = Dataset::from_rows(&[
            vec!["x", "a"],
            vec!["x", "b"],
            vec!["x", "b"],
            vec!["x", "a"],
        ])
        .unwrap();

        // The shuffle decides which label comes first; replay it to know the answer.
        let mut shuffled = dataset.clone();
        shuffled.shuffle(&mut rng());
        let first_seen = Dataset::label_of(&shuffled.records()[0]).to_string();

        assert_eq!(
            build_tree(&dataset, &params, &mut rng()).unwrap(),
            Node::leaf(first_seen)
        );
    }

    #[test]
    fn test_build_respects_max_depth() {
        let dataset = staircase(60);
        for max_depth in 0..6 {
            let mut params = TreeParams::new();
            params.set_max_depth(max_depth);
            let tree = build_tree(&dataset, &params, &mut rng()).unwrap();
            assert!(tree.depth() <= max_depth);
        }
    }

    #[test]
    fn test_build_is_reproducible_with_seeded_rng() {
        let dataset = staircase(40);
        let params = TreeParams::new();
        let first = build_tree(&dataset, &params, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        let second = build_tree(&dataset, &params, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_leaves_hold_majority_of_their_records() {
        let dataset = staircase(30);
        let tree = build_tree(&dataset, &unbalanced_params(), &mut rng()).unwrap();

        // Growth sees the records in shuffled order, which decides majority ties.
        let mut shuffled = dataset.clone();
        shuffled.shuffle(&mut rng());
        let root_majority = majority_class(&shuffled).unwrap();
        assert_leaves_are_majorities(&tree, &shuffled, &root_majority);
    }

    #[test]
    fn test_build_categorical_column() {
        let mut params = unbalanced_params();
        params.set_categorical_columns(&[0]);
        let dataset = Dataset::from_rows(&[
            vec!["red", "yes"],
            vec!["blue", "no"],
            vec!["green", "no"],
            vec!["red", "yes"],
        ])
        .unwrap();
        let tree = build_tree(&dataset, &params, &mut rng()).unwrap();
        assert_eq!(
            tree,
            Node::internal(0, "red", SplitRule::Equals, Node::leaf("yes"), Node::leaf("no"))
        );
    }

    #[test]
    fn test_classifier_before_fit() {
        let classifier = DecisionTreeClassifier::new();
        assert!(matches!(
            classifier.predict(&scenario_a()),
            Err(TreeError::TreeNotBuilt)
        ));
        assert!(matches!(
            classifier.accuracy(&scenario_a()),
            Err(TreeError::TreeNotBuilt)
        ));
    }

    #[test]
    fn test_classifier_fit_and_predict() {
        let mut classifier = DecisionTreeClassifier::with_params(Some(4), None, Some(1)).unwrap();
        classifier.fit(&scenario_a()).unwrap();
        assert_eq!(
            classifier.predict(&scenario_a()).unwrap(),
            vec!["yes", "no", "yes", "no"]
        );
        assert_eq!(classifier.accuracy(&scenario_a()).unwrap(), 1.0);
        assert_eq!(classifier.root().map(Node::depth), Some(1));
    }

    #[test]
    fn test_classifier_with_blank_positive_class() {
        let result = DecisionTreeClassifier::with_params(None, Some(String::new()), None);
        assert!(matches!(result, Err(TreeError::EmptyPositiveClass)));
    }
}
