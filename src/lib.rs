//! # Rusty-tree
//!
//! `rusty-tree` trains binary decision trees on string-typed tabular data by
//! recursive information-gain splitting, then simplifies them with
//! reduced-error pruning against a held-out validation set.
//! It also contains utilities for loading, cleaning and splitting data and for
//! measuring accuracy.
//!
//! ## Getting Started
//!
//! To use `rusty-tree`, add the following to your `Cargo.toml` file:
//!
//! ```toml
//! [dependencies]
//! rusty-tree = "*"
//! ```
//!
//! ## Example Usage
//!
//! As a quick example, here's how you can grow, prune and evaluate a tree on a
//! small dataset:
//!
//! ```rust
//! use rusty_tree::data::dataset::Dataset;
//! use rusty_tree::trees::classifier::DecisionTreeClassifier;
//!
//! let train = Dataset::from_rows(&[
//!     vec!["1", "A", "yes"],
//!     vec!["2", "B", "no"],
//!     vec!["1", "A", "yes"],
//!     vec!["2", "B", "no"],
//! ])
//! .unwrap();
//!
//! let mut model = DecisionTreeClassifier::with_params(Some(8), None, Some(42)).unwrap();
//! model.fit(&train).unwrap();
//! model.prune(&train).unwrap();
//!
//! assert_eq!(model.accuracy(&train).unwrap(), 1.0);
//! ```

/// Dataset and data manipulation utilities
pub mod data;
/// Error type shared by every module
pub mod error;
/// Functions for evaluating model performance
pub mod metrics;
/// End-to-end training runs
pub mod pipeline;
/// Decision trees
pub mod trees;

pub use error::TreeError;
