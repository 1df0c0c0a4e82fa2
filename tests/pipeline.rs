//! End-to-end tests for rusty-tree.
//!
//! These run the public API the way the `train-tree` binary does: write a
//! delimited file, load it, split it, grow and prune a tree, and check the
//! reported accuracy.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rusty_tree::data::dataset::Dataset;
use rusty_tree::metrics::classification::{evaluate, ConfusionMatrix};
use rusty_tree::pipeline::{run, CleaningPreset, PipelineConfig};
use rusty_tree::trees::classifier::{build_tree, DecisionTreeClassifier};
use rusty_tree::trees::node::{Node, SplitRule};
use rusty_tree::trees::params::TreeParams;
use rusty_tree::trees::prune::prune;
use rusty_tree::trees::split::best_split;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Two informative integer columns, one noise column, labels "true"/"false"
/// with "true" the minority class.
fn make_records(n: usize) -> Vec<Vec<String>> {
    (0..n)
        .map(|i| {
            let positive = i % 5 == 0;
            let signal = if positive { 5 + i % 3 } else { i % 4 };
            let other = if positive { i % 2 } else { 2 + i % 2 };
            vec![
                signal.to_string(),
                other.to_string(),
                format!("{:02}", (i * 37) % 97),
                positive.to_string(),
            ]
        })
        .collect()
}

fn write_csv(name: &str, header: &[&str], records: &[Vec<String>]) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer.write_record(header).unwrap();
    for record in records {
        writer.write_record(record).unwrap();
    }
    writer.flush().unwrap();
    path
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn pure_split_scenario() {
    let dataset = Dataset::from_rows(&[
        vec!["1", "A", "yes"],
        vec!["2", "B", "no"],
        vec!["1", "A", "yes"],
        vec!["2", "B", "no"],
    ])
    .unwrap();

    let split = best_split(&dataset, &[]).unwrap().unwrap();
    assert_eq!((split.attribute, split.value.as_str()), (0, "2"));
    assert!(split.gain > 0.0);

    let mut params = TreeParams::new();
    params.set_positive_class(None).unwrap();
    let tree = build_tree(&dataset, &params, &mut ChaCha8Rng::seed_from_u64(0)).unwrap();
    assert_eq!(
        tree,
        Node::internal(0, "2", SplitRule::LessThan, Node::leaf("yes"), Node::leaf("no"))
    );
    assert_eq!(evaluate(&tree, &dataset).unwrap(), 1.0);
}

#[test]
fn single_label_scenario() {
    let dataset = Dataset::from_rows(&[
        vec!["1", "A", "yes"],
        vec!["2", "B", "yes"],
        vec!["3", "C", "yes"],
    ])
    .unwrap();

    assert_eq!(best_split(&dataset, &[]).unwrap(), None);
    let tree = build_tree(&dataset, &TreeParams::new(), &mut ChaCha8Rng::seed_from_u64(0)).unwrap();
    assert_eq!(tree, Node::leaf("yes"));
    assert_eq!(tree.predict(&["9".to_string(), "Z".to_string(), "no".to_string()]), "yes");
}

// ---------------------------------------------------------------------------
// Properties on a larger synthetic dataset
// ---------------------------------------------------------------------------

#[test]
fn pruning_never_lowers_validation_accuracy() {
    let dataset = Dataset::new(make_records(200)).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let (train, validation) = dataset.train_test_split(0.3, &mut rng).unwrap();

    let mut classifier = DecisionTreeClassifier::with_params(Some(6), None, None).unwrap();
    classifier.fit_with_rng(&train, &mut rng).unwrap();
    let mut tree = classifier.root().unwrap().clone();
    let before = evaluate(&tree, &validation).unwrap();

    prune(&mut tree, &validation);

    assert!(evaluate(&tree, &validation).unwrap() >= before);
    assert!(tree.depth() <= 6);
}

#[test]
fn deeper_limits_never_exceeded() {
    let dataset = Dataset::new(make_records(120)).unwrap();
    for max_depth in [0, 1, 2, 4, 8] {
        let mut params = TreeParams::new();
        params.set_max_depth(max_depth);
        let tree = build_tree(&dataset, &params, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        assert!(
            tree.depth() <= max_depth,
            "depth {} > {}",
            tree.depth(),
            max_depth
        );
    }
}

#[test]
fn confusion_matrix_agrees_with_evaluate() {
    let dataset = Dataset::new(make_records(100)).unwrap();
    let mut classifier = DecisionTreeClassifier::with_params(Some(3), None, Some(1)).unwrap();
    classifier.fit(&dataset).unwrap();
    let tree = classifier.root().unwrap();

    let matrix = ConfusionMatrix::from_predictions(tree, &dataset).unwrap();
    assert_eq!(matrix.total(), 100);
    assert!((matrix.accuracy() - evaluate(tree, &dataset).unwrap()).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// Full pipeline from a file
// ---------------------------------------------------------------------------

#[test]
fn pipeline_from_csv_file() {
    let path = write_csv(
        "rusty_tree_pipeline_from_csv_file.csv",
        &["signal", "other", "noise", "label"],
        &make_records(250),
    );
    let mut config = PipelineConfig::new(&path);
    config.seed = Some(42);

    let report = run(&config).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(report.n_test, 50);
    assert_eq!(report.n_validation, 40);
    assert_eq!(report.n_train, 160);
    assert!(report.pruned.n_leaves <= report.unpruned.n_leaves);
    assert!(report.pruned.depth <= 8);
    assert!(
        report.test_accuracy > 0.9,
        "test accuracy {} <= 0.9",
        report.test_accuracy
    );
}

#[test]
fn pipeline_with_bank_marketing_preset() {
    let header = [
        "id", "age", "job", "marital", "education", "default", "balance", "housing", "loan",
        "contact", "day", "month", "duration", "campaign", "pdays", "previous", "poutcome",
        "deposit",
    ];
    let jobs = ["admin.", "technician", "services"];
    let records: Vec<Vec<String>> = (0..120)
        .map(|i| {
            let deposit = i % 3 == 0;
            let fields = [
                i.to_string(),
                (25 + i % 40).to_string(),
                jobs[i % jobs.len()].to_string(),
                "married".to_string(),
                if deposit { "tertiary" } else { "secondary" }.to_string(),
                "no".to_string(),
                (100 * (i % 7)).to_string(),
                "yes".to_string(),
                "no".to_string(),
                "cellular".to_string(),
                (1 + i % 28).to_string(),
                "may".to_string(),
                if deposit { "900" } else { "100" }.to_string(),
                "1".to_string(),
                "-1".to_string(),
                "0".to_string(),
                "unknown".to_string(),
                if deposit { "yes" } else { "no" }.to_string(),
            ];
            fields.to_vec()
        })
        .collect();
    let path = write_csv("rusty_tree_pipeline_bank_marketing.csv", &header, &records);
    let cleaned_path = std::env::temp_dir().join("rusty_tree_pipeline_bank_marketing_clean.csv");

    let mut config = PipelineConfig::new(&path);
    config.preset = CleaningPreset::BankMarketing;
    config.cleaned_path = Some(cleaned_path.clone());
    config.seed = Some(7);

    let report = run(&config).unwrap();
    let cleaned = Dataset::from_csv(&cleaned_path, false).unwrap();
    std::fs::remove_file(&path).ok();
    std::fs::remove_file(&cleaned_path).ok();

    assert_eq!(cleaned.len(), 120);
    assert_eq!(cleaned.n_columns(), 19);
    assert_eq!(report.test_accuracy, 1.0);
}
