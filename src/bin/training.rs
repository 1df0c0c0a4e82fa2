use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rusty_tree::pipeline::{self, CleaningPreset, PipelineConfig};
use rusty_tree::trees::params::{TreeParams, DEFAULT_MAX_DEPTH, DEFAULT_POSITIVE_CLASS};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// Use records as loaded.
    None,
    /// Bank marketing campaign cleaning.
    BankMarketing,
}

impl From<Preset> for CleaningPreset {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::None => CleaningPreset::None,
            Preset::BankMarketing => CleaningPreset::BankMarketing,
        }
    }
}

/// Train a pruned entropy decision tree and report its accuracy.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Delimited input file; the last column is the class label.
    data: PathBuf,

    /// Treat the first line as data rather than a header.
    #[arg(long)]
    no_headers: bool,

    /// Cleaning applied before splitting.
    #[arg(long, value_enum, default_value_t = Preset::None)]
    preset: Preset,

    /// Save the cleaned records to this file.
    #[arg(long)]
    cleaned_output: Option<PathBuf>,

    /// Share of records held out for testing.
    #[arg(long, default_value_t = 0.2)]
    test_ratio: f64,

    /// Share of the remaining records held out for validation.
    #[arg(long, default_value_t = 0.2)]
    validation_ratio: f64,

    /// Maximum tree depth.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Label oversampled until both classes are equally large.
    #[arg(long, default_value = DEFAULT_POSITIVE_CLASS)]
    positive_class: String,

    /// Skip class balancing.
    #[arg(long, conflicts_with = "positive_class")]
    no_balance: bool,

    /// Attribute columns split by equality instead of threshold.
    #[arg(long, value_delimiter = ',')]
    categorical: Vec<usize>,

    /// Seed for splitting, oversampling and shuffling.
    #[arg(long)]
    seed: Option<u64>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut tree_params = TreeParams::new();
    tree_params.set_max_depth(cli.max_depth);
    tree_params
        .set_positive_class((!cli.no_balance).then_some(cli.positive_class))
        .context("invalid positive class")?;
    tree_params.set_categorical_columns(&cli.categorical);

    let config = PipelineConfig {
        data_path: cli.data,
        has_headers: !cli.no_headers,
        preset: cli.preset.into(),
        cleaned_path: cli.cleaned_output,
        test_ratio: cli.test_ratio,
        validation_ratio: cli.validation_ratio,
        seed: cli.seed,
        tree_params,
    };

    let report = pipeline::run(&config)
        .with_context(|| format!("training on {} failed", config.data_path.display()))?;
    info!(
        depth = report.pruned.depth,
        n_leaves = report.pruned.n_leaves,
        "final tree"
    );

    println!("Training data size: {}", report.n_train);
    println!("Validation data size: {}", report.n_validation);
    println!("Testing data size: {}", report.n_test);
    println!(
        "Pruning collapsed {} of {} candidate subtrees ({} -> {} leaves)",
        report.prune_summary.collapsed,
        report.prune_summary.examined,
        report.unpruned.n_leaves,
        report.pruned.n_leaves
    );
    println!("Accuracy on train data: {:.2}%", report.train_accuracy * 100.0);
    println!(
        "Accuracy on validation data: {:.2}%",
        report.validation_accuracy * 100.0
    );
    println!("Accuracy on test data: {:.2}%", report.test_accuracy * 100.0);
    Ok(())
}
