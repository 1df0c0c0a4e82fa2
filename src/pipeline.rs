//! End-to-end training run: load, clean, split, build, prune, evaluate.
use crate::{
    data::{cleaning, dataset::Dataset},
    error::TreeError,
    metrics::classification::evaluate,
    trees::{classifier::DecisionTreeClassifier, params::TreeParams, prune::PruneSummary},
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing::info;

/// Cleaning applied between loading and splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleaningPreset {
    /// Records are used as loaded.
    #[default]
    None,
    /// See [`cleaning::bank_marketing`].
    BankMarketing,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_path: PathBuf,
    pub has_headers: bool,
    pub preset: CleaningPreset,
    /// Where to save the cleaned records, if anywhere.
    pub cleaned_path: Option<PathBuf>,
    /// Share of all records held out for testing.
    pub test_ratio: f64,
    /// Share of the remaining records held out for validation.
    pub validation_ratio: f64,
    /// Seeds the holdout splits and tree growth; entropy when `None`.
    pub seed: Option<u64>,
    pub tree_params: TreeParams,
}

impl PipelineConfig {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            has_headers: true,
            preset: CleaningPreset::None,
            cleaned_path: None,
            test_ratio: 0.2,
            validation_ratio: 0.2,
            seed: None,
            tree_params: TreeParams::new(),
        }
    }
}

/// Shape of the tree at one point of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeShape {
    pub depth: usize,
    pub n_nodes: usize,
    pub n_leaves: usize,
}

/// Outcome of a training run.
#[derive(Debug, Clone)]
pub struct Report {
    pub n_train: usize,
    pub n_validation: usize,
    pub n_test: usize,
    pub unpruned: TreeShape,
    pub pruned: TreeShape,
    pub prune_summary: PruneSummary,
    pub train_accuracy: f64,
    pub validation_accuracy: f64,
    pub test_accuracy: f64,
    pub classifier: DecisionTreeClassifier,
}

/// Runs the whole pipeline on an already loaded dataset.
///
/// # Errors
///
/// Returns the first error of any stage; nothing is reported on failure.
/// Each of the three holdout sets must end up non-empty.
pub fn run_on(dataset: Dataset, config: &PipelineConfig) -> Result<Report, TreeError> {
    let dataset = match config.preset {
        CleaningPreset::None => dataset,
        CleaningPreset::BankMarketing => cleaning::bank_marketing(dataset)?,
    };
    if let Some(path) = &config.cleaned_path {
        dataset.write_csv(path)?;
        info!(path = %path.display(), "saved cleaned records");
    }

    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let (train, test) = dataset.train_test_split(config.test_ratio, &mut rng)?;
    let (train, validation) = train.train_test_split(config.validation_ratio, &mut rng)?;
    info!(
        n_train = train.len(),
        n_validation = validation.len(),
        n_test = test.len(),
        "split records"
    );

    let mut classifier = DecisionTreeClassifier::from_params(config.tree_params.clone());
    classifier.fit_with_rng(&train, &mut rng)?;
    let unpruned = shape(&classifier)?;

    let prune_summary = classifier.prune(&validation)?;
    let pruned = shape(&classifier)?;
    info!(
        examined = prune_summary.examined,
        collapsed = prune_summary.collapsed,
        n_leaves = pruned.n_leaves,
        "pruned tree"
    );

    let root = classifier.root().ok_or(TreeError::TreeNotBuilt)?;
    let train_accuracy = evaluate(root, &train)?;
    let validation_accuracy = evaluate(root, &validation)?;
    let test_accuracy = evaluate(root, &test)?;

    Ok(Report {
        n_train: train.len(),
        n_validation: validation.len(),
        n_test: test.len(),
        unpruned,
        pruned,
        prune_summary,
        train_accuracy,
        validation_accuracy,
        test_accuracy,
        classifier,
    })
}

/// Loads `config.data_path` and runs the pipeline on it.
///
/// # Errors
///
/// See [`run_on`]; loading failures are returned as [`TreeError::Csv`].
pub fn run(config: &PipelineConfig) -> Result<Report, TreeError> {
    let dataset = Dataset::from_csv(&config.data_path, config.has_headers)?;
    info!(
        path = %config.data_path.display(),
        n_records = dataset.len(),
        "loaded records"
    );
    run_on(dataset, config)
}

fn shape(classifier: &DecisionTreeClassifier) -> Result<TreeShape, TreeError> {
    let root = classifier.root().ok_or(TreeError::TreeNotBuilt)?;
    Ok(TreeShape {
        depth: root.depth(),
        n_nodes: root.n_nodes(),
        n_leaves: root.n_leaves(),
    })
}
