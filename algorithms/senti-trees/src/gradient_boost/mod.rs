//! Gradient boosted decision trees for binary classification
mod algorithm;
mod binning;
mod hyperparams;
mod tree;

pub use algorithm::*;
pub use hyperparams::*;
pub use tree::{RegressionTree, TreeNode};
