//! Error definitions for gradient boosting
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoostError>;

#[derive(Error, Debug, Clone)]
pub enum BoostError {
    #[error("cannot fit gradient boosted trees on an empty dataset")]
    EmptyDataset,
    #[error("all training targets belong to the same class ({0}), both classes are required")]
    SingleClass(bool),
    #[error(transparent)]
    SentiError(#[from] senti::Error),
}
