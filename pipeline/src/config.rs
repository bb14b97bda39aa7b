use std::path::{Path, PathBuf};

use senti::composing::{Platt, PlattParams};
use senti::{error::Error, ParamGuard};
use senti_text::{TextFeaturizer, TextFeaturizerParams};
use senti_trees::{GradientBoostParams, GradientBoostedTrees};

use crate::error::PipelineError;
use crate::train::SentimentPipeline;

/// Calibration parameters of the tree ensemble
pub type CalibrationParams = PlattParams<f64, GradientBoostedTrees<f64>>;

/// Configuration of a complete demo run
///
/// Holds where the corpus is read from, where the model is written to, how the corpus is split
/// and the hyperparameters of every pipeline stage.
#[derive(Clone, Debug)]
pub struct PipelineValidParams {
    data_path: PathBuf,
    model_path: PathBuf,
    delimiter: u8,
    test_fraction: f32,
    seed: u64,
    featurizer: TextFeaturizerParams,
    boosting: GradientBoostParams<f64>,
    calibration: CalibrationParams,
}

impl PipelineValidParams {
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn test_fraction(&self) -> f32 {
        self.test_fraction
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn featurizer(&self) -> &TextFeaturizerParams {
        &self.featurizer
    }

    pub fn boosting(&self) -> &GradientBoostParams<f64> {
        &self.boosting
    }

    pub fn calibration(&self) -> &CalibrationParams {
        &self.calibration
    }

    /// The training stages configured with checked hyperparameters
    pub fn pipeline(&self) -> Result<SentimentPipeline, PipelineError> {
        Ok(SentimentPipeline::new(
            self.featurizer.check_ref()?.clone(),
            *self.boosting.check_ref()?,
            self.calibration.check_ref()?.clone(),
        ))
    }
}

#[derive(Clone, Debug)]
pub struct PipelineParams(PipelineValidParams);

impl Default for PipelineParams {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineParams {
    /// Defaults are provided if the optional parameters are not specified:
    /// * `data_path = Data/yelp_labelled.txt`
    /// * `model_path = Data/Model.json`
    /// * `delimiter = \t`
    /// * `test_fraction = 0.2`
    /// * `seed = 42`
    /// * featurizer, boosting and calibration with their default parameters
    pub fn new() -> Self {
        Self(PipelineValidParams {
            data_path: PathBuf::from("Data").join("yelp_labelled.txt"),
            model_path: PathBuf::from("Data").join("Model.json"),
            delimiter: senti_datasets::DEFAULT_DELIMITER,
            test_fraction: 0.2,
            seed: 42,
            featurizer: TextFeaturizer::params(),
            boosting: GradientBoostedTrees::params(),
            calibration: Platt::params(),
        })
    }

    /// Sets the labelled corpus to train and evaluate on
    pub fn data_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.0.data_path = path.into();
        self
    }

    /// Sets the file the trained model is written to and reloaded from
    pub fn model_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.0.model_path = path.into();
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.0.delimiter = delimiter;
        self
    }

    /// Sets the fraction of samples held out for evaluation
    pub fn test_fraction(mut self, test_fraction: f32) -> Self {
        self.0.test_fraction = test_fraction;
        self
    }

    /// Sets the seed of the random number generator shuffling the corpus
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }

    pub fn featurizer(mut self, featurizer: TextFeaturizerParams) -> Self {
        self.0.featurizer = featurizer;
        self
    }

    pub fn boosting(mut self, boosting: GradientBoostParams<f64>) -> Self {
        self.0.boosting = boosting;
        self
    }

    pub fn calibration(mut self, calibration: CalibrationParams) -> Self {
        self.0.calibration = calibration;
        self
    }
}

impl ParamGuard for PipelineParams {
    type Checked = PipelineValidParams;
    type Error = PipelineError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        let params = &self.0;

        if !(params.test_fraction > 0.0 && params.test_fraction < 1.0) {
            return Err(Error::Parameters(format!(
                "the test fraction should lie strictly between 0 and 1, but was {}",
                params.test_fraction
            ))
            .into());
        }

        params.featurizer.check_ref()?;
        params.boosting.check_ref()?;
        params.calibration.check_ref()?;

        Ok(params)
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}
