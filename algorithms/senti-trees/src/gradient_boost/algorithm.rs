use log::{debug, info, warn};
use ndarray::Array1;
use senti::{
    dataset::{AsTargets, DatasetBase},
    traits::{Fit, PredictInplace},
    Float,
};
use sprs::CsMat;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use super::binning::BinnedRecords;
use super::hyperparams::GradientBoostValidParams;
use super::tree::{RegressionTree, TreeLearner, TreeNode};
use crate::error::{BoostError, Result};

/// A gradient boosted ensemble of regression trees for binary classification
///
/// The model predicts a raw score, the log-odds of the positive class. Scores are the sum of a
/// constant initial score and the outputs of all trees. Trees are fitted one after the other on
/// the gradients of the logistic loss of the ensemble built so far.
///
/// ### Example
///
/// ```rust
/// use ndarray::{array, Array1};
/// use senti::prelude::*;
/// use senti_trees::GradientBoostedTrees;
/// use sprs::CsMat;
///
/// let records = CsMat::csr_from_dense(
///     array![[0f64, 1.], [0., 1.], [1., 0.], [1., 0.]].view(),
///     0.0,
/// );
/// let dataset = DatasetBase::new(records, array![false, false, true, true]);
///
/// let model = GradientBoostedTrees::params()
///     .min_datapoints_per_leaf(1)
///     .num_trees(10)
///     .fit(&dataset)
///     .unwrap();
///
/// let predictions: Array1<bool> = model.predict(dataset.records());
/// assert_eq!(&predictions, dataset.targets());
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostedTrees<F> {
    init_score: F,
    trees: Vec<RegressionTree<F>>,
    nfeatures: usize,
    feature_importance: Vec<F>,
}

impl<F: Float, T: AsTargets<Elem = bool>> Fit<CsMat<F>, T, BoostError>
    for GradientBoostValidParams<F>
{
    type Object = GradientBoostedTrees<F>;

    /// Fit gradient boosted trees using the hyperparameters in `self` on the `dataset`
    ///
    /// Records have to be stored in row-major (CSR) layout.
    fn fit(&self, dataset: &DatasetBase<CsMat<F>, T>) -> Result<Self::Object> {
        dataset.check_shapes()?;

        let records = dataset.records();
        let targets = dataset.as_targets();
        let nsamples = targets.len();
        if nsamples == 0 {
            return Err(BoostError::EmptyDataset);
        }

        let npositive = targets.iter().filter(|x| **x).count();
        if npositive == 0 {
            return Err(BoostError::SingleClass(false));
        } else if npositive == nsamples {
            return Err(BoostError::SingleClass(true));
        }

        let records = if records.is_csr() {
            BinnedRecords::new(records, self.max_bins())
        } else {
            BinnedRecords::new(&records.to_csr(), self.max_bins())
        };

        let labels = targets
            .iter()
            .map(|x| if *x { F::one() } else { F::zero() })
            .collect::<Vec<_>>();

        let init_score = F::cast(npositive as f64 / (nsamples - npositive) as f64).ln();
        let mut scores = vec![init_score; nsamples];
        let mut gradients = vec![F::zero(); nsamples];
        let mut hessians = vec![F::zero(); nsamples];

        let mut trees = Vec::with_capacity(self.num_trees());
        let mut feature_importance = vec![F::zero(); records.nfeatures()];

        for round in 0..self.num_trees() {
            for i in 0..nsamples {
                let p = sigmoid(scores[i]);
                gradients[i] = p - labels[i];
                hessians[i] = p * (F::one() - p);
            }

            let (tree, outputs) = TreeLearner::new(&records, self, &gradients, &hessians).grow();
            if tree.num_leaves() < 2 {
                info!(
                    "stopped boosting after {} trees, no further split improves the loss",
                    round
                );
                break;
            }

            for node in tree.nodes() {
                if let TreeNode::Split { feature, gain, .. } = node {
                    feature_importance[*feature] += *gain;
                }
            }
            for (score, output) in scores.iter_mut().zip(outputs.iter()) {
                *score += *output;
            }

            debug!(
                "tree {} with {} leaves, training log-loss {:.6}",
                round,
                tree.num_leaves(),
                log_loss(&scores, &labels)
            );
            trees.push(tree);
        }

        if trees.is_empty() {
            warn!(
                "no split keeps {} samples in both leaves, every sample gets the prior log-odds {}",
                self.min_datapoints_per_leaf(),
                init_score
            );
        }

        info!(
            "fitted {} trees on {} samples with {} features",
            trees.len(),
            nsamples,
            records.nfeatures()
        );

        Ok(GradientBoostedTrees {
            init_score,
            trees,
            nfeatures: records.nfeatures(),
            feature_importance,
        })
    }
}

impl<F: Float> GradientBoostedTrees<F> {
    /// Number of trees in the ensemble
    pub fn ntrees(&self) -> usize {
        self.trees.len()
    }

    /// The log-odds of the positive class in the training targets
    pub fn init_score(&self) -> F {
        self.init_score
    }

    pub fn trees(&self) -> &[RegressionTree<F>] {
        &self.trees
    }

    /// Number of features the model was fitted on
    pub fn nfeatures(&self) -> usize {
        self.nfeatures
    }

    /// Return the accumulated split gain of every feature
    ///
    /// Features never used in a split have an importance of zero.
    pub fn feature_importance(&self) -> &[F] {
        &self.feature_importance
    }
}

/// Predict the raw score, the log-odds of the positive class, of every sample
impl<F: Float> PredictInplace<CsMat<F>, Array1<F>> for GradientBoostedTrees<F> {
    fn predict_inplace(&self, x: &CsMat<F>, y: &mut Array1<F>) {
        assert!(x.is_csr(), "records have to be stored in CSR layout");
        assert_eq!(
            x.cols(),
            self.nfeatures,
            "the number of features has to match the fitted model"
        );
        assert_eq!(
            x.rows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        for (row, target) in x.outer_iterator().zip(y.iter_mut()) {
            *target = self.init_score
                + self
                    .trees
                    .iter()
                    .map(|tree| tree.predict_row(row.view()))
                    .sum::<F>();
        }
    }

    fn default_target(&self, x: &CsMat<F>) -> Array1<F> {
        Array1::zeros(x.rows())
    }
}

/// Predict the class of every sample, positive if the score is larger than zero
///
/// Implemented per float type, a generic impl would overlap with the score prediction.
macro_rules! impl_predict_classes {
    ($($t:ty),*) => {
        $(
            impl PredictInplace<CsMat<$t>, Array1<bool>> for GradientBoostedTrees<$t> {
                fn predict_inplace(&self, x: &CsMat<$t>, y: &mut Array1<bool>) {
                    let mut scores = Array1::<$t>::zeros(x.rows());
                    self.predict_inplace(x, &mut scores);

                    for (target, score) in y.iter_mut().zip(scores.iter()) {
                        *target = *score > 0.0;
                    }
                }

                fn default_target(&self, x: &CsMat<$t>) -> Array1<bool> {
                    Array1::from_elem(x.rows(), false)
                }
            }
        )*
    };
}

impl_predict_classes!(f32, f64);

fn sigmoid<F: Float>(x: F) -> F {
    F::one() / (F::one() + (-x).exp())
}

/// Mean logistic loss of raw scores
fn log_loss<F: Float>(scores: &[F], labels: &[F]) -> F {
    let total = scores
        .iter()
        .zip(labels.iter())
        .map(|(s, y)| {
            // log(1 + exp(-s)) for positives, log(1 + exp(s)) for negatives
            let margin = if *y > F::zero() { -*s } else { *s };
            margin.max(F::zero()) + (-margin.abs()).exp().ln_1p()
        })
        .sum::<F>();

    total / F::cast(scores.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};
    use rand::{rngs::SmallRng, Rng, SeedableRng};
    use senti::{error::Error, traits::Predict, ParamGuard};

    fn separable(nsamples: usize, rng: &mut SmallRng) -> DatasetBase<CsMat<f64>, Array1<bool>> {
        let mut records = Array2::zeros((nsamples, 3));
        let mut targets = Array1::from_elem(nsamples, false);

        for i in 0..nsamples {
            let positive = i % 2 == 0;
            targets[i] = positive;
            // the first feature carries the signal, the others are noise
            records[[i, 0]] = if positive { 1.0 } else { 0.0 };
            if rng.gen_bool(0.5) {
                records[[i, 1]] = rng.gen_range(0.1..1.0);
            }
            records[[i, 2]] = rng.gen_range(0.1..1.0);
        }

        DatasetBase::new(CsMat::csr_from_dense(records.view(), 0.0), targets)
    }

    #[test]
    fn separable_data_is_learned() {
        let mut rng = SmallRng::seed_from_u64(42);
        let dataset = separable(100, &mut rng);

        let model = GradientBoostedTrees::params()
            .num_trees(10)
            .fit(&dataset)
            .unwrap();

        let predictions: Array1<bool> = model.predict(dataset.records());
        assert_eq!(&predictions, dataset.targets());

        let importance = model.feature_importance();
        assert!(importance[0] > importance[1]);
        assert!(importance[0] > importance[2]);

        // balanced classes start with even odds
        assert_abs_diff_eq!(model.init_score(), 0.0);
        assert_eq!(model.nfeatures(), 3);
    }

    #[test]
    fn scores_are_log_odds() {
        let mut rng = SmallRng::seed_from_u64(42);
        let dataset = separable(60, &mut rng);

        let model = GradientBoostedTrees::params()
            .num_trees(5)
            .fit(&dataset)
            .unwrap();

        let scores: Array1<f64> = model.predict(dataset.records());
        let classes: Array1<bool> = model.predict(dataset.records());
        for (score, class) in scores.iter().zip(classes.iter()) {
            assert_eq!(*score > 0.0, *class);
        }

        // more trees bring the scores further apart
        let more = GradientBoostedTrees::params()
            .num_trees(20)
            .fit(&dataset)
            .unwrap();
        let more_scores: Array1<f64> = more.predict(dataset.records());
        assert!(more_scores[0] > scores[0]);
        assert!(more_scores[1] < scores[1]);
    }

    #[test]
    fn single_precision_classes() {
        let records = CsMat::csr_from_dense(
            array![[0f32, 1.], [0., 1.], [1., 0.], [1., 0.]].view(),
            0.0,
        );
        let dataset = DatasetBase::new(records, array![false, false, true, true]);

        let model = GradientBoostedTrees::<f32>::params()
            .min_datapoints_per_leaf(1)
            .num_trees(5)
            .fit(&dataset)
            .unwrap();

        let classes: Array1<bool> = model.predict(dataset.records());
        assert_eq!(&classes, dataset.targets());
    }

    #[test]
    fn init_score_follows_class_balance() {
        let records = CsMat::csr_from_dense(Array2::<f64>::zeros((4, 1)).view(), 0.0);
        let dataset = DatasetBase::new(records, array![true, true, true, false]);

        let model = GradientBoostedTrees::params()
            .min_datapoints_per_leaf(1)
            .fit(&dataset)
            .unwrap();

        // nothing to split on
        assert_eq!(model.ntrees(), 0);
        assert_abs_diff_eq!(model.init_score(), 3.0f64.ln());
    }

    #[test]
    fn too_few_samples_for_default_leaves() {
        let mut rng = SmallRng::seed_from_u64(42);
        let dataset = separable(10, &mut rng);

        // 20 datapoints per leaf cannot be met with 10 samples
        let model = GradientBoostedTrees::params().fit(&dataset).unwrap();
        assert_eq!(model.ntrees(), 0);

        let scores: Array1<f64> = model.predict(dataset.records());
        assert!(scores.iter().all(|x| *x == model.init_score()));
    }

    #[test]
    fn fitting_is_deterministic() {
        let mut rng = SmallRng::seed_from_u64(7);
        let dataset = separable(80, &mut rng);
        let params = GradientBoostedTrees::params().num_trees(8).check().unwrap();

        let first = params.fit(&dataset).unwrap();
        let second = params.fit(&dataset).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn leaves_hold_enough_samples() {
        let mut rng = SmallRng::seed_from_u64(3);
        let dataset = separable(100, &mut rng);

        let model = GradientBoostedTrees::params()
            .num_trees(5)
            .num_leaves(50)
            .min_datapoints_per_leaf(20)
            .fit(&dataset)
            .unwrap();

        for tree in model.trees() {
            assert!(tree.num_leaves() <= 100 / 20);
        }
    }

    #[test]
    fn empty_dataset() {
        let records: CsMat<f64> = CsMat::empty(sprs::CompressedStorage::CSR, 3);
        let dataset = DatasetBase::new(records, Array1::<bool>::from_elem(0, false));

        let res = GradientBoostedTrees::params().fit(&dataset);
        assert!(matches!(res, Err(BoostError::EmptyDataset)));
    }

    #[test]
    fn single_class() {
        let records = CsMat::csr_from_dense(array![[1.0], [2.0]].view(), 0.0);

        let dataset = DatasetBase::new(records.clone(), array![true, true]);
        let res = GradientBoostedTrees::params().fit(&dataset);
        assert!(matches!(res, Err(BoostError::SingleClass(true))));

        let dataset = DatasetBase::new(records, array![false, false]);
        let res = GradientBoostedTrees::params().fit(&dataset);
        assert!(matches!(res, Err(BoostError::SingleClass(false))));
    }

    #[test]
    fn mismatched_targets() {
        let records = CsMat::csr_from_dense(array![[1.0], [2.0]].view(), 0.0);
        let dataset = DatasetBase::new(records, array![true, false, true]);

        let res = GradientBoostedTrees::params().fit(&dataset);
        assert!(matches!(
            res,
            Err(BoostError::SentiError(Error::MismatchedShapes(2, 3)))
        ));
    }

    #[test]
    #[should_panic]
    fn feature_count_has_to_match() {
        let records = CsMat::csr_from_dense(array![[0.0, 1.0], [1.0, 0.0]].view(), 0.0);
        let dataset = DatasetBase::new(records, array![false, true]);
        let model = GradientBoostedTrees::params()
            .min_datapoints_per_leaf(1)
            .fit(&dataset)
            .unwrap();

        let other = CsMat::csr_from_dense(array![[0.0, 1.0, 0.0]].view(), 0.0);
        let _: Array1<f64> = model.predict(&other);
    }

    #[test]
    fn stable_log_loss() {
        assert_abs_diff_eq!(
            log_loss(&[0.0, 0.0], &[1.0, 0.0]),
            2.0f64.ln(),
            epsilon = 1e-12
        );
        assert!(log_loss::<f64>(&[1000.0], &[1.0]).is_finite());
        assert!(log_loss(&[1000.0], &[0.0]) > 999.0);
    }
}
