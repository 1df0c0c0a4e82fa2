use std::path::PathBuf;

/// Errors from dataset handling, tree construction and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Returned when entropy is requested for a zero-length label column.
    #[error("cannot compute entropy of an empty label column")]
    EmptyColumn,

    /// Returned when scoring the candidate splits of one attribute fails.
    #[error("split search failed on attribute {attribute}")]
    SplitComputation {
        /// The attribute column being scored.
        attribute: usize,
        /// The underlying failure.
        #[source]
        source: Box<TreeError>,
    },

    /// Returned when growing the tree fails; the whole build is aborted.
    #[error("tree construction aborted with {depth_remaining} levels remaining")]
    TreeConstruction {
        /// Depth budget left at the node where the failure surfaced.
        depth_remaining: usize,
        /// The underlying failure.
        #[source]
        source: Box<TreeError>,
    },

    /// Returned when an operation needs at least one record.
    #[error("dataset has zero records")]
    EmptyDataset,

    /// Returned when a record does not match the dataset's field count.
    #[error("record {row} has {got} fields, expected {expected}")]
    RaggedRecord {
        /// Zero-based index of the offending record.
        row: usize,
        /// Field count of the first record.
        expected: usize,
        /// Field count of the offending record.
        got: usize,
    },

    /// Returned when a record carries no fields at all.
    #[error("record {row} has no fields")]
    EmptyRecord {
        /// Zero-based index of the offending record.
        row: usize,
    },

    /// Returned when a column index is outside the record.
    #[error("column {column} is out of range for records with {n_columns} fields")]
    ColumnOutOfRange {
        /// The requested column.
        column: usize,
        /// Field count of the records.
        n_columns: usize,
    },

    /// Returned when a holdout ratio is not in [0.0, 1.0].
    #[error("ratio must be in [0.0, 1.0], got {ratio}")]
    InvalidRatio {
        /// The invalid ratio.
        ratio: f64,
    },

    /// Returned when the positive class used for balancing is blank.
    #[error("positive class label must not be empty")]
    EmptyPositiveClass,

    /// Returned when a field cannot be parsed during cleaning.
    #[error("record {row}, column {column}: cannot parse {value:?} as a number")]
    InvalidNumber {
        /// Zero-based index of the offending record.
        row: usize,
        /// Column being parsed.
        column: usize,
        /// The raw field text.
        value: String,
    },

    /// Returned when a column has zero variance and cannot be standardized.
    #[error("column {column} has zero variance")]
    ZeroVariance {
        /// The constant column.
        column: usize,
    },

    /// Returned when prediction, pruning or evaluation is requested before fitting.
    #[error("tree wasn't built yet")]
    TreeNotBuilt,

    /// Returned when reading or writing a delimited file fails.
    #[error("csv i/o failed for {path}")]
    Csv {
        /// Path of the file being read or written.
        path: PathBuf,
        /// The underlying csv error.
        #[source]
        source: csv::Error,
    },
}
