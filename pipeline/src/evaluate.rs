//! Quality metrics of a trained model on held-out data

use std::fmt;

use log::info;
use ndarray::{Array1, ArrayBase, Data, Ix1};
use senti::dataset::{AsTargets, DatasetBase};
use senti::metrics::{BinaryClassification, ConfusionMatrix, ToConfusionMatrix};
use senti::traits::Predict;
use senti::Pr;

use crate::error::Result;
use crate::model::SentimentModel;

/// Metrics of a calibrated binary classifier
///
/// Accuracy, F1 score, precision and recall are measured at the default decision threshold,
/// AUC over the ranking of probabilities. Losses are given in nats.
#[derive(Clone)]
pub struct BinaryClassificationMetrics {
    pub accuracy: f32,
    pub auc: f32,
    pub f1_score: f32,
    pub positive_precision: f32,
    pub positive_recall: f32,
    pub negative_precision: f32,
    pub negative_recall: f32,
    pub log_loss: f32,
    /// Entropy of the class prior, the log-loss of always predicting the positive rate
    pub entropy: f32,
    /// Relative improvement of the log-loss over the prior
    pub log_loss_reduction: f32,
    pub confusion_matrix: ConfusionMatrix<bool>,
}

impl BinaryClassificationMetrics {
    /// Calculate the metrics of predicted probabilities against the ground truth
    ///
    /// Fails if the ground truth does not contain both classes.
    pub fn from_probabilities<D: Data<Elem = Pr>, T: AsTargets<Elem = bool>>(
        probabilities: &ArrayBase<D, Ix1>,
        ground_truth: &T,
    ) -> Result<Self> {
        let truth = ground_truth.as_targets();
        let predicted = probabilities.map(|p| **p > crate::model::DECISION_THRESHOLD);

        let confusion_matrix = predicted.confusion_matrix(&truth)?;
        let auc = probabilities.roc(ground_truth)?.area_under_curve();
        let log_loss = probabilities.log_loss(ground_truth)?;

        let prior = truth.iter().filter(|x| **x).count() as f32 / truth.len() as f32;
        let entropy = binary_entropy(prior);
        let log_loss_reduction = if entropy > 0.0 {
            (entropy - log_loss) / entropy
        } else {
            0.0
        };

        Ok(BinaryClassificationMetrics {
            accuracy: confusion_matrix.accuracy(),
            auc,
            f1_score: confusion_matrix.f1_for(&true),
            positive_precision: confusion_matrix.precision_for(&true),
            positive_recall: confusion_matrix.recall_for(&true),
            negative_precision: confusion_matrix.precision_for(&false),
            negative_recall: confusion_matrix.recall_for(&false),
            log_loss,
            entropy,
            log_loss_reduction,
            confusion_matrix,
        })
    }
}

/// Evaluate `model` on `dataset`
///
/// Only the documents and labels of `dataset` are used, the model is not changed.
pub fn evaluate<T, D, S>(
    model: &SentimentModel,
    dataset: &DatasetBase<ArrayBase<D, Ix1>, S>,
) -> Result<BinaryClassificationMetrics>
where
    T: ToString,
    D: Data<Elem = T>,
    S: AsTargets<Elem = bool>,
{
    dataset.check_shapes()?;

    let features = model.features(dataset.records())?;
    let probabilities: Array1<Pr> = model.classifier().predict(&features);

    let metrics = BinaryClassificationMetrics::from_probabilities(&probabilities, dataset)?;
    info!(
        "evaluated {} samples, accuracy {:.4}, auc {:.4}",
        dataset.nsamples(),
        metrics.accuracy,
        metrics.auc
    );

    Ok(metrics)
}

/// Entropy in nats of a Bernoulli distribution with success probability `p`
fn binary_entropy(p: f32) -> f32 {
    let term = |x: f32| if x > 0.0 { -x * x.ln() } else { 0.0 };
    term(p) + term(1.0 - p)
}

/// The report of the demo, rates are printed as percentages
impl fmt::Display for BinaryClassificationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Accuracy: {:.2}%", self.accuracy * 100.0)?;
        writeln!(
            f,
            "AUC (the higher the AUC, the better the model distinguishes the two classes): {:.2}%",
            self.auc * 100.0
        )?;
        write!(f, "F1 score: {:.2}%", self.f1_score * 100.0)
    }
}

impl fmt::Debug for BinaryClassificationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self)?;
        writeln!(
            f,
            "Positive precision: {:.4}, recall: {:.4}",
            self.positive_precision, self.positive_recall
        )?;
        writeln!(
            f,
            "Negative precision: {:.4}, recall: {:.4}",
            self.negative_precision, self.negative_recall
        )?;
        writeln!(
            f,
            "Log-loss: {:.4}, entropy: {:.4}, log-loss reduction: {:.4}",
            self.log_loss, self.entropy, self.log_loss_reduction
        )?;
        write!(f, "{:?}", self.confusion_matrix)
    }
}
