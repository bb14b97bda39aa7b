use crate::error::FeaturizerError;
use regex::Regex;
use senti::ParamGuard;
use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// What a single token of a document is
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Analyzer {
    /// Tokens are the matches of the split regex, n-grams are joined with a space
    Word,
    /// Tokens are the characters of the document, wrapped in start-of-text and end-of-text
    /// markers. N-grams are joined without separator.
    Char,
}

/// Count vectorizer: learns a vocabulary from a sequence of documents and maps each
/// vocabulary entry to an integer value, producing a [CountVectorizer](crate::CountVectorizer) that can
/// be used to count the occurrences of each vocabulary entry in any sequence of documents.
///
/// ### Attributes
///
/// * `analyzer`: whether n-grams are built from words or from characters. Defaults to [`Analyzer::Word`].
/// * `split_regex`: the regex espression used to split documents into word tokens. Defaults to r"\\b\\w\\w+\\b", which selects "words", using whitespaces and
/// punctuation symbols as separators. Ignored by the character analyzer.
/// * `convert_to_lowercase`: if true, all documents will be converted to lowercase. Defaults to `true`.
/// * `n_gram_range`: if set to `(1,1)` single tokens will be candidate vocabulary entries, if `(2,2)` then adjacent token pairs will be considered,
///    if `(1,2)` then both single tokens and adjacent token pairs will be considered, and so on. The default value is `(1,1)`.
/// * `normalize`: if true, all characters in the documents will be normalized according to unicode's NFKD normalization. Defaults to `true`.
/// * `document_frequency`: specifies the minimum and maximum (relative) document frequencies that each vocabulary entry must satisfy. Defaults to `(0., 1.)` (i.e. 0% minimum and 100% maximum)
/// * `stopwords`: optional list of entries to be excluded from the generated vocabulary. Defaults to `None`
/// * `max_features`: optional bound on the vocabulary size, the entries with the highest document frequency are kept. Defaults to `None`
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct CountVectorizerValidParams {
    analyzer: Analyzer,
    convert_to_lowercase: bool,
    split_regex_expr: String,
    n_gram_range: (usize, usize),
    normalize: bool,
    document_frequency: (f32, f32),
    stopwords: Option<BTreeSet<String>>,
    max_features: Option<usize>,
}

impl CountVectorizerValidParams {
    pub fn analyzer(&self) -> Analyzer {
        self.analyzer
    }

    pub fn convert_to_lowercase(&self) -> bool {
        self.convert_to_lowercase
    }

    /// Compiles the split regex
    ///
    /// The expression was validated when the parameters were checked, but deserialized
    /// parameters are not checked again.
    pub fn split_regex(&self) -> Result<Regex, FeaturizerError> {
        Ok(Regex::new(&self.split_regex_expr)?)
    }

    pub fn n_gram_range(&self) -> (usize, usize) {
        self.n_gram_range
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    pub fn document_frequency(&self) -> (f32, f32) {
        self.document_frequency
    }

    pub fn stopwords(&self) -> &Option<BTreeSet<String>> {
        &self.stopwords
    }

    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CountVectorizerParams(CountVectorizerValidParams);

impl std::default::Default for CountVectorizerParams {
    fn default() -> Self {
        Self(CountVectorizerValidParams {
            analyzer: Analyzer::Word,
            convert_to_lowercase: true,
            split_regex_expr: r"\b\w\w+\b".to_string(),
            n_gram_range: (1, 1),
            normalize: true,
            document_frequency: (0., 1.),
            stopwords: None,
            max_features: None,
        })
    }
}

impl CountVectorizerParams {
    /// Build n-grams from words or from characters
    pub fn analyzer(mut self, analyzer: Analyzer) -> Self {
        self.0.analyzer = analyzer;
        self
    }

    ///If true, all documents will be converted to lowercase.
    pub fn convert_to_lowercase(mut self, convert_to_lowercase: bool) -> Self {
        self.0.convert_to_lowercase = convert_to_lowercase;
        self
    }

    /// Sets the regex espression used to split documents into tokens
    pub fn split_regex(mut self, regex_str: &str) -> Self {
        self.0.split_regex_expr = regex_str.to_string();
        self
    }

    /// If set to `(1,1)` single tokens will be candidate vocabulary entries, if `(2,2)` then adjacent token pairs will be considered,
    /// if `(1,2)` then both single tokens and adjacent token pairs will be considered, and so on. The definition of token depends on the
    /// analyzer and on the regex used for splitting the documents.
    ///
    /// `min_n` should not be greater than `max_n`
    pub fn n_gram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.0.n_gram_range = (min_n, max_n);
        self
    }

    /// If true, all characters in the documents will be normalized according to unicode's NFKD normalization.
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.0.normalize = normalize;
        self
    }

    /// Specifies the minimum and maximum (relative) document frequencies that each vocabulary entry must satisfy.
    /// `min_freq` and `max_freq` must lie in `0..=1` and `min_freq` should not be greater than `max_freq`
    pub fn document_frequency(mut self, min_freq: f32, max_freq: f32) -> Self {
        self.0.document_frequency = (min_freq, max_freq);
        self
    }

    /// List of entries to be excluded from the generated vocabulary.
    pub fn stopwords<T: ToString>(mut self, stopwords: &[T]) -> Self {
        self.0.stopwords = Some(stopwords.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Keep at most `max_features` vocabulary entries, preferring those found in most documents
    pub fn max_features(mut self, max_features: Option<usize>) -> Self {
        self.0.max_features = max_features;
        self
    }
}

impl ParamGuard for CountVectorizerParams {
    type Checked = CountVectorizerValidParams;
    type Error = FeaturizerError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        let (n_gram_min, n_gram_max) = self.0.n_gram_range;
        let (min_freq, max_freq) = self.0.document_frequency;

        if n_gram_min == 0 || n_gram_max == 0 {
            Err(FeaturizerError::InvalidNGramBoundaries(
                n_gram_min, n_gram_max,
            ))
        } else if n_gram_min > n_gram_max {
            Err(FeaturizerError::FlippedNGramBoundaries(
                n_gram_min, n_gram_max,
            ))
        } else if min_freq < 0. || max_freq < 0. || min_freq > 1. || max_freq > 1. {
            Err(FeaturizerError::InvalidDocumentFrequencies(
                min_freq, max_freq,
            ))
        } else if max_freq < min_freq {
            Err(FeaturizerError::FlippedDocumentFrequencies(
                min_freq, max_freq,
            ))
        } else if self.0.max_features == Some(0) {
            Err(FeaturizerError::ZeroMaxFeatures)
        } else {
            self.0.split_regex()?;

            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}
