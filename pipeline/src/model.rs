use ndarray::{Array1, ArrayBase, Data, Ix1};
use senti::composing::Platt;
use senti::traits::{Predict, Transformer};
use senti_text::TextFeaturizer;
use senti_trees::GradientBoostedTrees;
use serde_crate::{Deserialize, Serialize};
use sprs::CsMat;

use crate::error::{PipelineError, Result};

/// Version of the model file layout written by this crate
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Probabilities above this threshold are predicted as positive
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Calibrated tree ensemble
pub type SentimentClassifier = Platt<f64, GradientBoostedTrees<f64>>;

/// The sentiment predicted for a single document
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(crate = "serde_crate")]
pub struct SentimentPrediction {
    /// `true` for positive sentiment
    pub predicted_label: bool,
    /// Calibrated probability of positive sentiment
    pub probability: f32,
    /// Raw margin of the tree ensemble
    pub score: f64,
}

impl SentimentPrediction {
    /// Human-readable name of the predicted class
    pub fn sentiment(&self) -> &'static str {
        if self.predicted_label {
            "Positive"
        } else {
            "Negative"
        }
    }
}

/// A trained sentiment model
///
/// Bundles the vocabulary of the featurizer with the calibrated tree ensemble trained on its
/// output. This is the only state persisted between training and prediction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "serde_crate")]
pub struct SentimentModel {
    format_version: u32,
    featurizer: TextFeaturizer,
    classifier: SentimentClassifier,
}

impl SentimentModel {
    pub(crate) fn new(featurizer: TextFeaturizer, classifier: SentimentClassifier) -> Self {
        SentimentModel {
            format_version: MODEL_FORMAT_VERSION,
            featurizer,
            classifier,
        }
    }

    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    pub fn featurizer(&self) -> &TextFeaturizer {
        &self.featurizer
    }

    pub fn classifier(&self) -> &SentimentClassifier {
        &self.classifier
    }

    /// Featurize documents with the vocabulary learned at training time
    pub fn features<T: ToString, D: Data<Elem = T>>(
        &self,
        texts: &ArrayBase<D, Ix1>,
    ) -> Result<CsMat<f64>> {
        let features = self.featurizer.transform(texts)?;
        self.check_width(&features)?;

        Ok(features)
    }

    /// Predict from a feature matrix
    ///
    /// Fails if the width of `features` differs from the width the ensemble was trained on.
    pub fn predict_features(&self, features: &CsMat<f64>) -> Result<Vec<SentimentPrediction>> {
        self.check_width(features)?;

        let scores: Array1<f64> = self.classifier.inner().predict(features);
        let predictions = scores
            .iter()
            .map(|score| {
                let probability = *self.classifier.probability(*score);
                SentimentPrediction {
                    predicted_label: probability > DECISION_THRESHOLD,
                    probability,
                    score: *score,
                }
            })
            .collect();

        Ok(predictions)
    }

    /// Predict the sentiment of every document, in input order
    pub fn predict_texts<T: ToString, D: Data<Elem = T>>(
        &self,
        texts: &ArrayBase<D, Ix1>,
    ) -> Result<Vec<SentimentPrediction>> {
        let features = self.features(texts)?;
        self.predict_features(&features)
    }

    fn check_width(&self, features: &CsMat<f64>) -> Result<()> {
        let expected = self.classifier.inner().nfeatures();
        if features.cols() != expected {
            return Err(PipelineError::FeatureMismatch {
                expected,
                found: features.cols(),
            });
        }

        Ok(())
    }
}

impl<'a, T: ToString + Clone> Transformer<&'a [T], Result<Vec<SentimentPrediction>>>
    for SentimentModel
{
    fn transform(&self, x: &'a [T]) -> Result<Vec<SentimentPrediction>> {
        self.predict_texts(&Array1::from(x.to_vec()))
    }
}
