/// Tree builder and classifier
pub mod classifier;
/// Decision tree node
pub mod node;
/// Tree hyperparameters
pub mod params;
/// Reduced-error pruning
pub mod prune;
/// Information-gain split search
pub mod split;
