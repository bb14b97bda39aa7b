//! Text featurization with concatenated word and character n-gram blocks

use log::debug;
use ndarray::{ArrayBase, Data, Ix1};
use senti::{traits::Fit, DatasetBase, Float, ParamGuard};
use sprs::{CsMat, CsVec};

use crate::countgrams::CountVectorizer;
use crate::error::{FeaturizerError, Result};
pub use hyperparams::{Norm, TextFeaturizerParams, TextFeaturizerValidParams};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

mod hyperparams;

impl<T: ToString, D: Data<Elem = T>, S> Fit<ArrayBase<D, Ix1>, S, FeaturizerError>
    for TextFeaturizerValidParams
{
    type Object = TextFeaturizer;

    /// Learns the vocabularies of both blocks from the records of `dataset`
    ///
    /// The targets are not used.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix1>, S>) -> Result<TextFeaturizer> {
        let word_vectorizer = self
            .word_grams()
            .map(|params| params.fit(dataset.records()))
            .transpose()?;
        let char_vectorizer = self
            .char_grams()
            .map(|params| params.fit(dataset.records()))
            .transpose()?;

        let featurizer = TextFeaturizer {
            word_vectorizer,
            char_vectorizer,
            norm: self.norm(),
        };
        debug!(
            "text featurizer learned {} features from {} documents",
            featurizer.nfeatures(),
            dataset.records().len()
        );

        Ok(featurizer)
    }
}

/// Maps documents to sparse feature vectors
///
/// A feature vector consists of the word n-gram counts followed by the character n-gram counts
/// of the document. Each of the two blocks is normalized separately, so that long documents
/// do not dominate short ones and both blocks carry the same weight.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct TextFeaturizer {
    word_vectorizer: Option<CountVectorizer>,
    char_vectorizer: Option<CountVectorizer>,
    norm: Norm,
}

impl TextFeaturizer {
    /// Construct a new set of parameters
    pub fn params() -> TextFeaturizerParams {
        TextFeaturizerParams::default()
    }

    pub fn word_vectorizer(&self) -> Option<&CountVectorizer> {
        self.word_vectorizer.as_ref()
    }

    pub fn char_vectorizer(&self) -> Option<&CountVectorizer> {
        self.char_vectorizer.as_ref()
    }

    /// Number of columns of the transformed records
    pub fn nfeatures(&self) -> usize {
        self.blocks().map(|v| v.nentries()).sum()
    }

    /// Human-readable name of every column, prefixed with the block it belongs to
    pub fn feature_names(&self) -> Vec<String> {
        let words = self
            .word_vectorizer
            .iter()
            .flat_map(|v| v.vocabulary().iter().map(|e| format!("word:{}", e)));
        let chars = self.char_vectorizer.iter().flat_map(|v| {
            v.vocabulary()
                .iter()
                .map(|e| format!("char:{}", e.escape_default()))
        });

        words.chain(chars).collect()
    }

    fn blocks(&self) -> impl Iterator<Item = &CountVectorizer> {
        self.word_vectorizer
            .iter()
            .chain(self.char_vectorizer.iter())
    }

    /// Given a sequence of `n` documents, produces a sparse array of size `(n, nfeatures)`
    ///
    /// Documents are featurized with the vocabularies learned at fit time, n-grams unseen
    /// during fitting are dropped.
    pub fn transform<F: Float, T: ToString, D: Data<Elem = T>>(
        &self,
        x: &ArrayBase<D, Ix1>,
    ) -> Result<CsMat<F>> {
        let blocks = self
            .blocks()
            .map(|v| v.properties().split_regex().map(|regex| (v, regex)))
            .collect::<Result<Vec<_>>>()?;

        let nfeatures = self.nfeatures();
        let mut features = CsMat::empty(sprs::CompressedStorage::CSR, nfeatures);
        features.reserve_outer_dim_exact(x.len());

        for document in x.iter().map(|s| s.to_string()) {
            let mut row = CsVec::empty(nfeatures);
            let mut offset = 0;

            for (vectorizer, regex) in &blocks {
                let counts = vectorizer.analyze_document(document.clone(), regex);
                let norm = block_norm::<F>(counts.data(), self.norm);

                for (idx, count) in counts.iter() {
                    row.append(offset + idx, F::cast(*count) / norm);
                }
                offset += vectorizer.nentries();
            }

            features = features.append_outer_csvec(row.view());
        }

        Ok(features)
    }
}

/// Divisor of a block of counts, one for empty blocks
fn block_norm<F: Float>(counts: &[usize], norm: Norm) -> F {
    let value = match norm {
        Norm::None => F::one(),
        Norm::L1 => counts.iter().map(|c| F::cast(*c)).sum(),
        Norm::L2 => counts.iter().map(|c| F::cast(c * c)).sum::<F>().sqrt(),
        Norm::LInf => counts
            .iter()
            .max()
            .map(|c| F::cast(*c))
            .unwrap_or_else(F::one),
    };

    if value > F::zero() {
        value
    } else {
        F::one()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};
    use senti::traits::Fit;

    fn fit(texts: ndarray::Array1<&str>, params: TextFeaturizerParams) -> TextFeaturizer {
        let dataset = DatasetBase::new(texts, ());
        params.fit(&dataset).unwrap()
    }

    #[test]
    fn blocks_are_concatenated() {
        let featurizer = fit(array!["good food", "bad food"], TextFeaturizer::params());

        let words = featurizer.word_vectorizer().unwrap();
        let chars = featurizer.char_vectorizer().unwrap();
        assert_eq!(
            words.vocabulary(),
            &vec!["bad", "bad food", "food", "good", "good food"]
        );
        assert_eq!(
            featurizer.nfeatures(),
            words.nentries() + chars.nentries()
        );

        let names = featurizer.feature_names();
        assert_eq!(names.len(), featurizer.nfeatures());
        assert_eq!(names[0], "word:bad");
        assert!(names[5].starts_with("char:"));
    }

    #[test]
    fn each_block_has_unit_length() {
        let featurizer = fit(
            array!["good food", "bad food", "good good service"],
            TextFeaturizer::params(),
        );
        let features: Array2<f64> = featurizer
            .transform(&array!["good food, good service"])
            .unwrap()
            .to_dense();

        let nwords = featurizer.word_vectorizer().unwrap().nentries();
        let row = features.row(0);
        let word_norm = row.slice(ndarray::s![..nwords]).mapv(|x| x * x).sum();
        let char_norm = row.slice(ndarray::s![nwords..]).mapv(|x| x * x).sum();

        assert_abs_diff_eq!(word_norm, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(char_norm, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn other_norms() {
        let params = TextFeaturizer::params().char_grams(None);

        let featurizer = fit(array!["a bb bb cc"], params.clone().norm(Norm::None));
        let features: Array2<f32> = featurizer.transform(&array!["bb bb cc"]).unwrap().to_dense();
        // "bb", "bb bb", "bb cc", "cc"
        assert_eq!(features, array![[2.0, 1.0, 1.0, 1.0]]);

        let featurizer = fit(array!["a bb bb cc"], params.clone().norm(Norm::L1));
        let features: Array2<f32> = featurizer.transform(&array!["bb bb cc"]).unwrap().to_dense();
        assert_abs_diff_eq!(features, array![[0.4, 0.2, 0.2, 0.2]], epsilon = 1e-6);

        let featurizer = fit(array!["a bb bb cc"], params.norm(Norm::LInf));
        let features: Array2<f32> = featurizer.transform(&array!["bb bb cc"]).unwrap().to_dense();
        assert_abs_diff_eq!(features, array![[1.0, 0.5, 0.5, 0.5]], epsilon = 1e-6);
    }

    #[test]
    fn unseen_documents_have_empty_rows() {
        let featurizer = fit(
            array!["good food"],
            TextFeaturizer::params().char_grams(None),
        );
        let features: CsMat<f64> = featurizer.transform(&array!["xyz", "good"]).unwrap();

        assert_eq!(features.shape(), (2, featurizer.nfeatures()));
        assert_eq!(features.outer_view(0).unwrap().nnz(), 0);
        assert_eq!(features.outer_view(1).unwrap().nnz(), 1);
    }

    #[test]
    fn vocabulary_is_learned_from_fitted_documents_only() {
        let featurizer = fit(array!["good food"], TextFeaturizer::params());
        let other = fit(array!["good food"], TextFeaturizer::params());
        assert_eq!(featurizer, other);

        let features: Array2<f64> = featurizer
            .transform(&array!["completely different words"])
            .unwrap()
            .to_dense();
        assert_eq!(features.dim(), (1, featurizer.nfeatures()));
        // only character trigrams shared with "good food" may be present
        let nwords = featurizer.word_vectorizer().unwrap().nentries();
        assert!(features.row(0).iter().take(nwords).all(|x| *x == 0.0));
    }

    #[test]
    fn invalid_params() {
        let params = TextFeaturizer::params().word_grams(None).char_grams(None);
        assert!(matches!(params.check_ref(), Err(FeaturizerError::NoBlocks)));

        let params =
            TextFeaturizer::params().word_grams(Some(CountVectorizer::params().n_gram_range(2, 1)));
        assert!(matches!(
            params.check(),
            Err(FeaturizerError::FlippedNGramBoundaries(2, 1))
        ));
    }
}
