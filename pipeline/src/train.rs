use log::info;
use ndarray::{ArrayBase, Data, Ix1};
use senti::composing::PlattValidParams;
use senti::dataset::{AsTargets, DatasetBase};
use senti::traits::{Fit, FitWith};
use senti_text::TextFeaturizerValidParams;
use senti_trees::{GradientBoostValidParams, GradientBoostedTrees};
use sprs::CsMat;

use crate::error::{PipelineError, Result};
use crate::model::{SentimentClassifier, SentimentModel};

/// The training stages of a sentiment model
///
/// Fitting learns the featurizer vocabulary, trains the tree ensemble on the featurized
/// documents and calibrates the ensemble scores into probabilities. All three stages only see
/// the dataset passed to [`fit`](Fit::fit).
#[derive(Clone, Debug)]
pub struct SentimentPipeline {
    featurizer: TextFeaturizerValidParams,
    boosting: GradientBoostValidParams<f64>,
    calibration: PlattValidParams<f64, GradientBoostedTrees<f64>>,
}

impl SentimentPipeline {
    pub fn new(
        featurizer: TextFeaturizerValidParams,
        boosting: GradientBoostValidParams<f64>,
        calibration: PlattValidParams<f64, GradientBoostedTrees<f64>>,
    ) -> Self {
        SentimentPipeline {
            featurizer,
            boosting,
            calibration,
        }
    }

    pub fn featurizer(&self) -> &TextFeaturizerValidParams {
        &self.featurizer
    }

    pub fn boosting(&self) -> &GradientBoostValidParams<f64> {
        &self.boosting
    }
}

impl<T, D, S> Fit<ArrayBase<D, Ix1>, S, PipelineError> for SentimentPipeline
where
    T: ToString,
    D: Data<Elem = T>,
    S: AsTargets<Elem = bool>,
{
    type Object = SentimentModel;

    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix1>, S>) -> Result<SentimentModel> {
        dataset.check_shapes()?;

        info!("learning vocabulary of {} documents", dataset.nsamples());
        let featurizer = self.featurizer.fit(dataset)?;
        let records: CsMat<f64> = featurizer.transform(dataset.records())?;
        let features = DatasetBase::new(records, dataset.as_targets());

        info!(
            "training tree ensemble on {} samples with {} features",
            features.nsamples(),
            features.nfeatures()
        );
        let trees = self.boosting.fit(&features)?;

        info!("calibrating {} trees", trees.ntrees());
        let classifier: SentimentClassifier = self.calibration.fit_with(trees, &features)?;

        Ok(SentimentModel::new(featurizer, classifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PipelineParams;
    use ndarray::array;
    use senti::ParamGuard;
    use senti_trees::BoostError;

    fn pipeline(min_datapoints_per_leaf: usize) -> SentimentPipeline {
        PipelineParams::new()
            .boosting(
                GradientBoostedTrees::params()
                    .num_trees(10)
                    .min_datapoints_per_leaf(min_datapoints_per_leaf),
            )
            .check()
            .unwrap()
            .pipeline()
            .unwrap()
    }

    #[test]
    fn learns_training_vocabulary() {
        let dataset = DatasetBase::new(
            array!["good food", "great place", "bad food", "awful place"],
            array![true, true, false, false],
        );
        let model = pipeline(1).fit(&dataset).unwrap();

        let vocabulary = model.featurizer().word_vectorizer().unwrap().vocabulary();
        assert!(vocabulary.contains(&"great".to_string()));
        assert!(!vocabulary.contains(&"terrible".to_string()));
        assert_eq!(
            model.classifier().inner().nfeatures(),
            model.featurizer().nfeatures()
        );

        let predictions = model.predict_texts(&array!["good food", "awful place"]).unwrap();
        assert!(predictions[0].probability > predictions[1].probability);
    }

    #[test]
    fn empty_training_set() {
        let dataset = DatasetBase::new(
            ndarray::Array1::<String>::from(vec![]),
            ndarray::Array1::<bool>::from(vec![]),
        );
        let res = pipeline(1).fit(&dataset);
        assert!(matches!(
            res,
            Err(PipelineError::Boost(BoostError::EmptyDataset))
        ));
    }

    #[test]
    fn single_class_training_set() {
        let dataset = DatasetBase::new(array!["good", "great"], array![true, true]);
        let res = pipeline(1).fit(&dataset);
        assert!(matches!(
            res,
            Err(PipelineError::Boost(BoostError::SingleClass(true)))
        ));
    }

    #[test]
    fn mismatched_labels() {
        let dataset = DatasetBase::new(array!["good", "bad"], array![true]);
        let res = pipeline(1).fit(&dataset);
        assert!(matches!(
            res,
            Err(PipelineError::SentiError(senti::Error::MismatchedShapes(2, 1)))
        ));
    }
}
