//! `senti` holds the shared building blocks of the sentiment classification workspace.
//!
//! The crate is deliberately small. It defines
//!
//! * [`DatasetBase`](dataset::DatasetBase), a pairing of records (texts or sparse feature
//!   matrices) with their targets, together with shuffling and train/test splitting;
//! * the algorithm traits [`Fit`](traits::Fit), [`FitWith`](traits::FitWith),
//!   [`PredictInplace`](traits::PredictInplace), [`Predict`](traits::Predict) and
//!   [`Transformer`](traits::Transformer) shared by the featurizer and the tree ensemble;
//! * [`ParamGuard`], the checked/unchecked hyperparameter split;
//! * classification metrics (confusion matrix, ROC curve, log-loss);
//! * Platt calibration, turning raw classifier margins into probabilities.
//!
//! The algorithms themselves live in `senti-text` (text featurization) and `senti-trees`
//! (gradient boosted trees), and are composed into a runnable pipeline by `senti-pipeline`.

pub mod composing;
pub mod dataset;
pub mod error;
mod metrics_classification;
mod param_guard;
pub mod prelude;
pub mod traits;

pub use dataset::{DatasetBase, Float, Label, Pr, TextDataset};
pub use error::{Error, Result};
pub use param_guard::ParamGuard;

/// Common metrics functions for binary and multi-class classification
pub mod metrics {
    pub use crate::metrics_classification::{
        BinaryClassification, ConfusionMatrix, ReceiverOperatingCharacteristic, ToConfusionMatrix,
    };
}
