use super::{AsTargets, DatasetBase, Records};
use crate::error::{Error, Result};
use ndarray::{Array1, Axis};
use rand::{seq::SliceRandom, Rng};

/// Implementation without constraints on records and targets
///
/// This implementation block provides a method for the creation of datasets
/// from records and targets, as well as methods to access them.
impl<R: Records, S> DatasetBase<R, S> {
    /// Create a new dataset from records and targets
    ///
    /// # Example
    ///
    /// ```ignore
    /// let dataset = DatasetBase::new(records, targets);
    /// ```
    pub fn new(records: R, targets: S) -> DatasetBase<R, S> {
        DatasetBase { records, targets }
    }

    /// Returns reference to targets
    pub fn targets(&self) -> &S {
        &self.targets
    }

    /// Returns reference to records
    pub fn records(&self) -> &R {
        &self.records
    }

    /// Return the number of samples in the dataset
    pub fn nsamples(&self) -> usize {
        self.records.nsamples()
    }

    /// Return the number of features in the records
    pub fn nfeatures(&self) -> usize {
        self.records.nfeatures()
    }
}

impl<R: Records, T: AsTargets> DatasetBase<R, T> {
    /// Verifies that there is exactly one target per record
    pub fn check_shapes(&self) -> Result<()> {
        let ntargets = self.targets.as_targets().len();
        if ntargets != self.records.nsamples() {
            return Err(Error::MismatchedShapes(self.records.nsamples(), ntargets));
        }

        Ok(())
    }
}

impl<R: Records, T: AsTargets> AsTargets for DatasetBase<R, T> {
    type Elem = T::Elem;

    fn as_targets(&self) -> ndarray::ArrayView1<Self::Elem> {
        self.targets.as_targets()
    }
}

/// Sample-wise operations on datasets whose records are one-dimensional, like a corpus of
/// documents.
///
/// All of them keep records and targets aligned: the `i`-th record always stays with the `i`-th
/// target.
impl<D: Clone, L: Clone> DatasetBase<Array1<D>, Array1<L>> {
    /// Copies the samples at `indices`, in that order, into a new dataset
    pub fn select(&self, indices: &[usize]) -> Self {
        DatasetBase {
            records: self.records.select(Axis(0), indices),
            targets: self.targets.select(Axis(0), indices),
        }
    }

    /// Shuffle the samples of the dataset
    ///
    /// The permutation only depends on the state of `rng` and the number of samples.
    pub fn shuffle<Rn: Rng>(self, rng: &mut Rn) -> Self {
        let mut indices = (0..self.nsamples()).collect::<Vec<_>>();
        indices.shuffle(rng);

        self.select(&indices)
    }

    /// Shuffle the dataset and hold out a fraction of it for testing
    ///
    /// Returns `(train, test)` where the test chunk contains `round(nsamples * test_fraction)`
    /// samples. Fails if `test_fraction` does not lie in `[0, 1]`.
    pub fn train_test_split<Rn: Rng>(
        self,
        test_fraction: f32,
        rng: &mut Rn,
    ) -> Result<(Self, Self)> {
        if !(0.0..=1.0).contains(&test_fraction) {
            return Err(Error::Parameters(format!(
                "test fraction should lie in [0, 1], but was {}",
                test_fraction
            )));
        }

        let nsamples = self.nsamples();
        let ntest = (nsamples as f32 * test_fraction).round() as usize;

        Ok(self.shuffle(rng).split_at(nsamples - ntest.min(nsamples)))
    }

    fn split_at(&self, n: usize) -> (Self, Self) {
        let first = (0..n).collect::<Vec<_>>();
        let second = (n..self.nsamples()).collect::<Vec<_>>();

        (self.select(&first), self.select(&second))
    }
}
