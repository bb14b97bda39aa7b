use senti::{error::Error, Float, ParamGuard};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::BoostError;
use crate::GradientBoostedTrees;

/// The set of hyperparameters that can be specified for fitting
/// [gradient boosted trees](crate::GradientBoostedTrees).
///
/// ### Example
///
/// ```rust
/// use senti_trees::GradientBoostedTrees;
/// use senti::ParamGuard;
///
/// let params = GradientBoostedTrees::<f64>::params()
///     .num_trees(50)
///     .num_leaves(50)
///     .min_datapoints_per_leaf(20);
/// assert!(params.check_ref().is_ok());
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientBoostValidParams<F> {
    num_trees: usize,
    num_leaves: usize,
    min_datapoints_per_leaf: usize,
    learning_rate: F,
    max_bins: usize,
    l2_regularization: F,
    min_split_gain: F,
}

impl<F: Float> GradientBoostValidParams<F> {
    pub fn num_trees(&self) -> usize {
        self.num_trees
    }

    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    pub fn min_datapoints_per_leaf(&self) -> usize {
        self.min_datapoints_per_leaf
    }

    pub fn learning_rate(&self) -> F {
        self.learning_rate
    }

    pub fn max_bins(&self) -> usize {
        self.max_bins
    }

    pub fn l2_regularization(&self) -> F {
        self.l2_regularization
    }

    pub fn min_split_gain(&self) -> F {
        self.min_split_gain
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientBoostParams<F>(GradientBoostValidParams<F>);

impl<F: Float> GradientBoostParams<F> {
    pub fn new() -> Self {
        Self(GradientBoostValidParams {
            num_trees: 50,
            num_leaves: 50,
            min_datapoints_per_leaf: 20,
            learning_rate: F::cast(0.2),
            max_bins: 255,
            l2_regularization: F::zero(),
            min_split_gain: F::cast(1e-6),
        })
    }

    /// Sets the number of boosting rounds, one tree is added per round
    pub fn num_trees(mut self, num_trees: usize) -> Self {
        self.0.num_trees = num_trees;
        self
    }

    /// Sets the maximal number of leaves of a single tree
    pub fn num_leaves(mut self, num_leaves: usize) -> Self {
        self.0.num_leaves = num_leaves;
        self
    }

    /// Sets the minimal number of training samples that a split has to place in each leaf
    pub fn min_datapoints_per_leaf(mut self, min_datapoints_per_leaf: usize) -> Self {
        self.0.min_datapoints_per_leaf = min_datapoints_per_leaf;
        self
    }

    /// Sets the shrinkage applied to the output of every tree
    pub fn learning_rate(mut self, learning_rate: F) -> Self {
        self.0.learning_rate = learning_rate;
        self
    }

    /// Sets the maximal number of histogram bins per feature
    pub fn max_bins(mut self, max_bins: usize) -> Self {
        self.0.max_bins = max_bins;
        self
    }

    /// Sets the L2 penalty on leaf values, added to the hessian sums
    pub fn l2_regularization(mut self, l2_regularization: F) -> Self {
        self.0.l2_regularization = l2_regularization;
        self
    }

    /// Sets the minimal gain a split needs to bring in order for it to be applied
    pub fn min_split_gain(mut self, min_split_gain: F) -> Self {
        self.0.min_split_gain = min_split_gain;
        self
    }
}

impl<F: Float> Default for GradientBoostParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> GradientBoostedTrees<F> {
    /// Defaults are provided if the optional parameters are not specified:
    /// * `num_trees = 50`
    /// * `num_leaves = 50`
    /// * `min_datapoints_per_leaf = 20`
    /// * `learning_rate = 0.2`
    /// * `max_bins = 255`
    /// * `l2_regularization = 0.0`
    /// * `min_split_gain = 1e-6`
    // Violates the convention that new should return a value of type `Self`
    #[allow(clippy::new_ret_no_self)]
    pub fn params() -> GradientBoostParams<F> {
        GradientBoostParams::new()
    }
}

impl<F: Float> ParamGuard for GradientBoostParams<F> {
    type Checked = GradientBoostValidParams<F>;
    type Error = BoostError;

    fn check_ref(&self) -> Result<&Self::Checked, BoostError> {
        let params = &self.0;

        let message = if params.num_trees == 0 {
            Some("the number of trees should be positive".to_string())
        } else if params.num_leaves < 2 {
            Some(format!(
                "a tree needs at least two leaves, but num_leaves was {}",
                params.num_leaves
            ))
        } else if params.min_datapoints_per_leaf == 0 {
            Some("the minimal number of datapoints per leaf should be positive".to_string())
        } else if !params.learning_rate.is_finite() || params.learning_rate <= F::zero() {
            Some(format!(
                "the learning rate should be positive, but was {}",
                params.learning_rate
            ))
        } else if params.max_bins < 2 {
            Some(format!(
                "at least two bins are required, but max_bins was {}",
                params.max_bins
            ))
        } else if params.l2_regularization < F::zero() {
            Some(format!(
                "the L2 regularization should not be negative, but was {}",
                params.l2_regularization
            ))
        } else if params.min_split_gain < F::zero() {
            Some(format!(
                "the minimal split gain should not be negative, but was {}",
                params.min_split_gain
            ))
        } else {
            None
        };

        match message {
            Some(message) => Err(Error::Parameters(message).into()),
            None => Ok(&self.0),
        }
    }

    fn check(self) -> Result<Self::Checked, BoostError> {
        self.check_ref()?;
        Ok(self.0)
    }
}
