/// Cleaning steps for raw records
pub mod cleaning;
/// Records, datasets and holdout splits
pub mod dataset;
