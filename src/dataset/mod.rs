//! Datasets
//!
//! This module implements the dataset struct and various helper traits to extend its
//! functionality.
use ndarray::{Array1, ArrayView1};
use num_traits::{FromPrimitive, NumAssignOps, NumCast};

use std::cmp::{Ordering, PartialOrd};
use std::fmt;
use std::hash::Hash;
use std::iter::Sum;
use std::ops::Deref;

mod impl_dataset;
mod impl_records;
mod impl_targets;

/// Floating point numbers
///
/// This trait bound multiplexes to the most common assumption of floating point number and
/// implement them for 32bit and 64bit floating points. They are used in records of a dataset and
/// in the raw scores of a classifier.
pub trait Float:
    FromPrimitive
    + num_traits::Float
    + PartialOrd
    + Sync
    + Send
    + Default
    + fmt::Display
    + fmt::Debug
    + Sum
    + NumAssignOps
    + 'static
{
    fn cast<T: NumCast>(x: T) -> Self {
        NumCast::from(x).unwrap()
    }
}

impl Float for f32 {}

impl Float for f64 {}

/// Discrete labels
///
/// Labels are countable, comparable and hashable. Boolean labels are used for the binary
/// sentiment task, `usize` and strings are supported for completeness.
pub trait Label: PartialEq + Eq + Hash + Clone {}

impl Label for bool {}
impl Label for usize {}
impl Label for String {}
impl Label for &str {}

/// Probability types
///
/// This helper struct exists to distinguish probabilities from floating points. A calibrated
/// classifier predicts `Pr`, while its uncalibrated counterpart predicts raw scores.
#[derive(Debug, Copy, Clone, Default)]
pub struct Pr(pub f32);

impl Pr {
    /// Creates a probability, clamping the value into `[0, 1]`
    pub fn new(p: f32) -> Pr {
        Pr(p.max(0.0).min(1.0))
    }

    pub fn even() -> Pr {
        Pr(0.5)
    }
}

impl PartialEq for Pr {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Pr {
    fn partial_cmp(&self, other: &Pr) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Deref for Pr {
    type Target = f32;

    fn deref(&self) -> &f32 {
        &self.0
    }
}

/// DatasetBase
///
/// This is the fundamental structure of a dataset. It contains a number of records about the data
/// and their targets. The dataset base is only generic over the records and targets and
/// introduces a trait bound on the records.
///
/// # Fields
///
/// * `records`: a one-dimensional array of documents, or a sparse matrix with dimensionality
/// (nsamples, nfeatures)
/// * `targets`: a one-dimensional array with one target per sample
///
/// # Trait bounds
///
/// * `R: Records`: generic over documents and sparse feature matrices
/// * `T`: generic over anything which can act as targets, see [`AsTargets`]
pub struct DatasetBase<R, T>
where
    R: Records,
{
    pub records: R,
    pub targets: T,
}

/// TextDataset
///
/// The shape of a labelled sentiment corpus: one document and one boolean label per sample.
pub type TextDataset = DatasetBase<Array1<String>, Array1<bool>>;

/// Record trait
pub trait Records: Sized {
    type Elem;

    fn nsamples(&self) -> usize;
    fn nfeatures(&self) -> usize;
}

/// Return a view on the single target variable
pub trait AsTargets {
    type Elem;

    /// Returns a view on targets as one-dimensional array
    fn as_targets(&self) -> ArrayView1<Self::Elem>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};
    use std::collections::HashSet;

    fn numbered(n: usize) -> TextDataset {
        named(n, "doc")
    }

    fn named(n: usize, prefix: &str) -> TextDataset {
        let records = (0..n)
            .map(|i| format!("{} {}", prefix, i))
            .collect::<Array1<_>>();
        let targets = (0..n).map(|i| i % 2 == 0).collect::<Array1<_>>();

        TextDataset::new(records, targets)
    }

    #[test]
    fn dataset_implements_required_methods() {
        let mut rng = SmallRng::seed_from_u64(42);
        let dataset = numbered(50);
        assert_eq!(dataset.nsamples(), 50);
        assert_eq!(dataset.nfeatures(), 1);
        assert!(dataset.check_shapes().is_ok());

        // Shuffle keeps every sample together with its target
        let shuffled = dataset.shuffle(&mut rng);
        assert_eq!(shuffled.nsamples(), 50);
        for (doc, target) in shuffled.records().iter().zip(shuffled.targets().iter()) {
            let index: usize = doc["doc ".len()..].parse().unwrap();
            assert_eq!(index % 2 == 0, *target);
        }

        let mismatched =
            DatasetBase::new(Array1::from(vec!["a", "b"]), Array1::from(vec![true]));
        assert!(mismatched.check_shapes().is_err());
    }

    #[test]
    fn train_test_split_sizes_and_disjointness() {
        let mut rng = SmallRng::seed_from_u64(7);

        for &n in &[0usize, 1, 5, 10, 11, 999, 1000] {
            let dataset = numbered(n);
            let (train, test) = dataset.train_test_split(0.2, &mut rng).unwrap();

            assert_eq!(train.nsamples() + test.nsamples(), n);
            assert_eq!(test.nsamples(), (n as f32 * 0.2).round() as usize);

            let train_docs: HashSet<_> = train.records().iter().cloned().collect();
            let test_docs: HashSet<_> = test.records().iter().cloned().collect();
            assert!(train_docs.is_disjoint(&test_docs));
            assert_eq!(train_docs.len() + test_docs.len(), n);
        }
    }

    #[test]
    fn train_test_split_is_reproducible_and_content_blind() {
        let dataset = numbered(100);
        let (train_a, test_a) = dataset
            .train_test_split(0.2, &mut SmallRng::seed_from_u64(42))
            .unwrap();

        // same seed, same partition
        let (train_b, _) = numbered(100)
            .train_test_split(0.2, &mut SmallRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(train_a.records(), train_b.records());

        // the permutation depends only on the number of samples, not on the texts
        let (_, test_c) = named(100, "text")
            .train_test_split(0.2, &mut SmallRng::seed_from_u64(42))
            .unwrap();
        let renamed = test_a.records().map(|doc| doc.replacen("doc", "text", 1));
        assert_eq!(test_c.records(), &renamed);
    }

    #[test]
    fn invalid_test_fraction() {
        let mut rng = SmallRng::seed_from_u64(42);
        assert!(numbered(10).train_test_split(1.5, &mut rng).is_err());
        assert!(numbered(10).train_test_split(-0.1, &mut rng).is_err());
    }
}
