use super::Records;
use ndarray::{ArrayBase, Data, Ix1};
use sprs::CsMat;

/// Implement records for one-dimensional arrays, for example a corpus of documents
impl<S: Data> Records for ArrayBase<S, Ix1> {
    type Elem = S::Elem;

    fn nsamples(&self) -> usize {
        self.len()
    }

    fn nfeatures(&self) -> usize {
        1
    }
}

/// Implement records for sparse matrices, one sample per row
impl<N> Records for CsMat<N> {
    type Elem = N;

    fn nsamples(&self) -> usize {
        self.rows()
    }

    fn nfeatures(&self) -> usize {
        self.cols()
    }
}
