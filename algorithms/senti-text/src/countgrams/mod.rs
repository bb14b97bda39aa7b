//! Count vectorization methods

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use std::iter;

use itertools::sorted;
use log::debug;
use ndarray::{ArrayBase, Data, Ix1};
use regex::Regex;
use senti::ParamGuard;
use sprs::{CsMat, CsVec};
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::helpers::NGramList;
pub use hyperparams::{Analyzer, CountVectorizerParams, CountVectorizerValidParams};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

mod hyperparams;

/// Marks the beginning of a document for the character analyzer
pub const START_OF_TEXT: char = '\u{2}';
/// Marks the end of a document for the character analyzer
pub const END_OF_TEXT: char = '\u{3}';

impl CountVectorizerValidParams {
    /// Learns a vocabulary from the documents in `x`, according to the specified attributes and maps each
    /// vocabulary entry to an integer value, producing a [CountVectorizer](CountVectorizer).
    ///
    /// Vocabulary entries are indexed in lexicographical order, so that fitting the same documents
    /// twice always results in the same mapping.
    pub fn fit<T: ToString, D: Data<Elem = T>>(
        &self,
        x: &ArrayBase<D, Ix1>,
    ) -> Result<CountVectorizer> {
        let regex = self.split_regex()?;

        // entry -> document frequency
        let mut frequencies: BTreeMap<String, usize> = BTreeMap::new();
        for string in x.iter().map(|s| transform_string(s.to_string(), self)) {
            let document_vocabulary: HashSet<String> =
                ngrams(&string, &regex, self).into_iter().collect();
            for entry in document_vocabulary {
                *frequencies.entry(entry).or_insert(0) += 1;
            }
        }

        let frequencies = self.filter_vocabulary(frequencies, x.len());

        let mut vocabulary = BTreeMap::new();
        let mut vec_vocabulary = Vec::with_capacity(frequencies.len());
        for (entry, freq) in frequencies {
            vocabulary.insert(entry.clone(), (vec_vocabulary.len(), freq));
            vec_vocabulary.push(entry);
        }

        debug!(
            "learned {:?} vocabulary with {} entries from {} documents",
            self.analyzer(),
            vec_vocabulary.len(),
            x.len()
        );

        Ok(CountVectorizer {
            vocabulary,
            vec_vocabulary,
            properties: self.clone(),
        })
    }

    /// Removes vocabulary items that do not satisfy the document frequencies constraints or if they appear in the
    /// optional stopwords list. At most `max_features` entries with the highest document frequency
    /// are kept afterwards.
    ///
    /// The total number of documents is needed to convert from relative document frequencies to
    /// their absolute counterparts.
    fn filter_vocabulary(
        &self,
        vocabulary: BTreeMap<String, usize>,
        n_documents: usize,
    ) -> BTreeMap<String, usize> {
        let (min_df, max_df) = self.document_frequency();
        let len_f32 = n_documents as f32;
        let (min_abs_df, max_abs_df) = ((min_df * len_f32) as usize, (max_df * len_f32) as usize);

        let vocabulary = vocabulary
            .into_iter()
            .filter(|(entry, abs_count)| {
                *abs_count >= min_abs_df
                    && *abs_count <= max_abs_df
                    && !self
                        .stopwords()
                        .as_ref()
                        .map(|stopwords| stopwords.contains(entry))
                        .unwrap_or(false)
            })
            .collect::<BTreeMap<_, _>>();

        if let Some(max_features) = self.max_features() {
            sorted(
                vocabulary
                    .into_iter()
                    .map(|(entry, freq)| (Reverse(freq), entry)),
            )
            .take(max_features)
            .map(|(freq, entry)| (entry, freq.0))
            .collect()
        } else {
            vocabulary
        }
    }
}

impl CountVectorizerParams {
    /// Learns a vocabulary from the documents in `x`, according to the specified attributes and maps each
    /// vocabulary entry to an integer value, producing a [CountVectorizer](CountVectorizer).
    ///
    /// Returns an error if:
    /// * one of the `n_gram` boundaries is set to zero or the minimum value is greater than the maximum value
    /// * if the minimum document frequency is greater than one or than the maximum frequency, or if the maximum frequency is
    ///   smaller than zero
    /// * if `max_features` is zero
    /// * if the regex expression for the split is invalid
    pub fn fit<T: ToString, D: Data<Elem = T>>(
        &self,
        x: &ArrayBase<D, Ix1>,
    ) -> Result<CountVectorizer> {
        self.check_ref().and_then(|params| params.fit(x))
    }
}

/// Counts the occurrences of each vocabulary entry, learned during fitting, in a sequence of documents. Each vocabulary entry is mapped
/// to an integer value that is used to index the count in the result.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct CountVectorizer {
    pub(crate) vocabulary: BTreeMap<String, (usize, usize)>,
    pub(crate) vec_vocabulary: Vec<String>,
    pub(crate) properties: CountVectorizerValidParams,
}

impl CountVectorizer {
    /// Construct a new set of parameters
    pub fn params() -> CountVectorizerParams {
        CountVectorizerParams::default()
    }

    /// Number of vocabulary entries learned during fitting
    pub fn nentries(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of training documents containing `entry`, if it is part of the vocabulary
    pub fn document_frequency(&self, entry: &str) -> Option<usize> {
        self.vocabulary.get(entry).map(|(_, freq)| *freq)
    }

    /// The parameters the vocabulary was learned with
    pub fn properties(&self) -> &CountVectorizerValidParams {
        &self.properties
    }

    /// Given a sequence of `n` documents, produces a sparse array of size `(n, vocabulary_entries)` where column `j` of row `i`
    /// is the number of occurrences of vocabulary entry `j` in the document of index `i`. Vocabulary entry `j` is the string
    /// at the `j`-th position in the vocabulary. N-grams which are not part of the vocabulary are ignored.
    pub fn transform<T: ToString, D: Data<Elem = T>>(
        &self,
        x: &ArrayBase<D, Ix1>,
    ) -> Result<CsMat<usize>> {
        let regex = self.properties.split_regex()?;

        let mut sprs_vectorized = CsMat::empty(sprs::CompressedStorage::CSR, self.nentries());
        sprs_vectorized.reserve_outer_dim_exact(x.len());
        for string in x.iter().map(|s| s.to_string()) {
            let row = self.analyze_document(string, &regex);
            sprs_vectorized = sprs_vectorized.append_outer_csvec(row.view());
        }

        Ok(sprs_vectorized)
    }

    /// Contains all vocabulary entries, in the same order used by the `transform` methods.
    pub fn vocabulary(&self) -> &Vec<String> {
        &self.vec_vocabulary
    }

    /// Produces a sparse array which counts the occurrences of each vocabulary entry in the given
    /// document.
    pub(crate) fn analyze_document(&self, document: String, regex: &Regex) -> CsVec<usize> {
        // sparse vectors only accept insertions with increasing index, so counts are collected
        // in an ordered map first
        let mut term_frequencies: BTreeMap<usize, usize> = BTreeMap::new();
        let string = transform_string(document, &self.properties);
        for item in ngrams(&string, regex, &self.properties) {
            if let Some((item_index, _)) = self.vocabulary.get(&item) {
                *term_frequencies.entry(*item_index).or_insert(0) += 1;
            }
        }

        let mut sprs_term_frequencies = CsVec::empty(self.nentries());
        for (i, freq) in term_frequencies {
            sprs_term_frequencies.append(i, freq);
        }
        sprs_term_frequencies
    }
}

/// All n-grams of a preprocessed document, in order of appearance
fn ngrams(document: &str, regex: &Regex, properties: &CountVectorizerValidParams) -> Vec<String> {
    match properties.analyzer() {
        Analyzer::Word => {
            let words = regex
                .find_iter(document)
                .map(|mat| mat.as_str())
                .collect::<Vec<_>>();
            NGramList::new(words, properties.n_gram_range())
                .into_iter()
                .flatten()
                .collect()
        }
        Analyzer::Char => {
            let chars = iter::once(START_OF_TEXT)
                .chain(document.chars())
                .chain(iter::once(END_OF_TEXT))
                .collect::<Vec<_>>();
            NGramList::new(chars, properties.n_gram_range())
                .separator("")
                .into_iter()
                .flatten()
                .collect()
        }
    }
}

fn transform_string(mut string: String, properties: &CountVectorizerValidParams) -> String {
    if properties.normalize() {
        string = string.nfkd().collect();
    }
    if properties.convert_to_lowercase() {
        string = string.to_lowercase();
    }
    string
}
