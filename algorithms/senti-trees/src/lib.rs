//!
//! # Gradient boosted trees
//! `senti-trees` provides an ensemble of regression trees, fitted with gradient boosting on the
//! logistic loss, for binary classification of sparse records.
//!
//! ## Current state
//!
//! `senti-trees` currently provides an implementation of leaf-wise grown trees on histogram
//! binned features. Records are given as a sparse CSR matrix, missing entries are zero.
//!
//! Features are split on thresholds between the distinct values seen during training, at most
//! `max_bins` bins are built per feature. Split candidates are ranked by the reduction of the
//! second order approximation of the loss.
//!
//! ## Example
//!
//! ```ignore
//! use senti::prelude::*;
//! use senti_trees::GradientBoostedTrees;
//!
//! let model = GradientBoostedTrees::params()
//!     .num_trees(50)
//!     .num_leaves(50)
//!     .min_datapoints_per_leaf(20)
//!     .fit(&train)?;
//!
//! let scores: ndarray::Array1<f64> = model.predict(test.records());
//! ```

mod error;
mod gradient_boost;

pub use error::{BoostError, Result};
pub use gradient_boost::*;
