//! Error definitions for text featurization
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FeaturizerError>;

#[derive(Error, Debug, Clone)]
pub enum FeaturizerError {
    #[error("n_gram boundaries cannot be zero (min = {0}, max = {1})")]
    InvalidNGramBoundaries(usize, usize),
    #[error("n_gram min boundary cannot be greater than max boundary (min = {0}, max = {1})")]
    FlippedNGramBoundaries(usize, usize),
    #[error("document frequencies have to be between 0 and 1 (min = {0}, max = {1})")]
    InvalidDocumentFrequencies(f32, f32),
    #[error("min document frequency cannot be greater than max document frequency (min = {0}, max = {1})")]
    FlippedDocumentFrequencies(f32, f32),
    #[error("the maximal number of features has to be positive")]
    ZeroMaxFeatures,
    #[error("at least one of the word and character blocks has to be enabled")]
    NoBlocks,
    #[error(transparent)]
    RegexError(#[from] regex::Error),
    #[error(transparent)]
    SentiError(#[from] senti::Error),
}
