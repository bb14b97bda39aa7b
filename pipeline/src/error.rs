//! Error definitions of the sentiment pipeline
use thiserror::Error;

use senti::composing::PlattError;
use senti_datasets::DatasetError;
use senti_text::FeaturizerError;
use senti_trees::BoostError;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("loading the dataset failed")]
    Dataset(#[from] DatasetError),
    #[error("featurization failed")]
    Featurizer(#[from] FeaturizerError),
    #[error("training the tree ensemble failed")]
    Boost(#[from] BoostError),
    #[error("calibrating the classifier failed")]
    Platt(#[from] PlattError),
    #[error(transparent)]
    SentiError(#[from] senti::Error),
    #[error("could not access the model file")]
    Io(#[from] std::io::Error),
    #[error("could not (de)serialize the model")]
    Serialization(#[from] serde_json::Error),
    #[error("model file has format version {found}, but version {expected} is supported")]
    ModelVersion { expected: u32, found: u32 },
    #[error("the model expects {expected} features, but {found} were given")]
    FeatureMismatch { expected: usize, found: usize },
}
