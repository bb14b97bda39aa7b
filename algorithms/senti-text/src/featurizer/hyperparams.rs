use crate::countgrams::{Analyzer, CountVectorizer, CountVectorizerParams};
use crate::error::FeaturizerError;
use senti::ParamGuard;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Normalization applied to each block of counts
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Norm {
    /// Keep the raw counts
    None,
    /// Divide by the sum of the counts
    L1,
    /// Divide by the euclidean length of the counts
    L2,
    /// Divide by the largest count
    LInf,
}

/// Text featurizer: concatenates a block of word n-gram counts and a block of character n-gram
/// counts, each block normalized on its own.
///
/// ### Attributes
///
/// * `word_grams`: count vectorizer parameters of the word block, `None` disables the block.
///   Defaults to word uni- and bigrams.
/// * `char_grams`: count vectorizer parameters of the character block, `None` disables the block.
///   Defaults to character trigrams.
/// * `norm`: the normalization of each block. Defaults to [`Norm::L2`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextFeaturizerValidParams {
    word_grams: Option<CountVectorizerParams>,
    char_grams: Option<CountVectorizerParams>,
    norm: Norm,
}

impl TextFeaturizerValidParams {
    pub fn word_grams(&self) -> Option<&CountVectorizerParams> {
        self.word_grams.as_ref()
    }

    pub fn char_grams(&self) -> Option<&CountVectorizerParams> {
        self.char_grams.as_ref()
    }

    pub fn norm(&self) -> Norm {
        self.norm
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextFeaturizerParams(TextFeaturizerValidParams);

impl Default for TextFeaturizerParams {
    fn default() -> Self {
        Self(TextFeaturizerValidParams {
            word_grams: Some(CountVectorizer::params().n_gram_range(1, 2)),
            char_grams: Some(
                CountVectorizer::params()
                    .analyzer(Analyzer::Char)
                    .n_gram_range(3, 3),
            ),
            norm: Norm::L2,
        })
    }
}

impl TextFeaturizerParams {
    /// Set the parameters of the word block, or disable it with `None`
    ///
    /// The analyzer of the parameters is forced to [`Analyzer::Word`].
    pub fn word_grams(mut self, params: Option<CountVectorizerParams>) -> Self {
        self.0.word_grams = params.map(|p| p.analyzer(Analyzer::Word));
        self
    }

    /// Set the parameters of the character block, or disable it with `None`
    ///
    /// The analyzer of the parameters is forced to [`Analyzer::Char`].
    pub fn char_grams(mut self, params: Option<CountVectorizerParams>) -> Self {
        self.0.char_grams = params.map(|p| p.analyzer(Analyzer::Char));
        self
    }

    /// Set the normalization of each block
    pub fn norm(mut self, norm: Norm) -> Self {
        self.0.norm = norm;
        self
    }
}

impl ParamGuard for TextFeaturizerParams {
    type Checked = TextFeaturizerValidParams;
    type Error = FeaturizerError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.word_grams.is_none() && self.0.char_grams.is_none() {
            return Err(FeaturizerError::NoBlocks);
        }

        for params in self.0.word_grams.iter().chain(self.0.char_grams.iter()) {
            params.check_ref()?;
        }

        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}
