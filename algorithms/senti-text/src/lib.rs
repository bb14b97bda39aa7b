//! # Text featurization
//!
//! `senti-text` turns raw documents into sparse numerical features for the sentiment
//! classifier.
//!
//! * [`CountVectorizer`](countgrams::CountVectorizer) learns a vocabulary of word or character
//!   n-grams and counts their occurrences;
//! * [`TextFeaturizer`](featurizer::TextFeaturizer) concatenates a word n-gram block and a
//!   character n-gram block, normalizing each of them separately.
//!
//! Documents are NFKD-normalized and lowercased before tokenization. Vocabularies are learned at
//! fit time only and stored in lexicographical order.
//!
//! ```ignore
//! use senti::traits::Fit;
//! use senti_text::TextFeaturizer;
//!
//! let featurizer = TextFeaturizer::params().fit(&train)?;
//! let features: sprs::CsMat<f64> = featurizer.transform(test.records())?;
//! ```

pub mod countgrams;
pub mod error;
pub mod featurizer;
mod helpers;

pub use countgrams::{Analyzer, CountVectorizer, CountVectorizerParams};
pub use error::{FeaturizerError, Result};
pub use featurizer::{Norm, TextFeaturizer, TextFeaturizerParams, TextFeaturizerValidParams};
