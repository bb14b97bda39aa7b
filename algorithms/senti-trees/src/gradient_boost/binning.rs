//! Histogram binning of sparse feature matrices

use senti::Float;
use sprs::CsMat;
use std::cmp::Ordering;

/// Maps the values of a single feature onto a small number of ordered bins
///
/// A value `v` falls into bin `i` when exactly `i` thresholds are smaller than `v`. Hence all
/// values of the bins `0..=i` satisfy `v <= thresholds[i]`, which is the decision rule of a
/// split after bin `i`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FeatureBins<F> {
    thresholds: Vec<F>,
    zero_bin: usize,
}

impl<F: Float> FeatureBins<F> {
    /// Bins for the stored values of a feature
    ///
    /// Zero is always part of the value range, because sparse features are zero in most samples.
    /// Thresholds are placed halfway between neighbouring distinct values. If there are more
    /// distinct values than bins, the thresholds are spread evenly over the distinct values.
    pub fn new(mut values: Vec<F>, max_bins: usize) -> Self {
        values.push(F::zero());
        values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        values.dedup();

        let two = F::one() + F::one();
        let ndistinct = values.len();
        let cuts: Vec<usize> = if ndistinct <= max_bins {
            (1..ndistinct).collect()
        } else {
            (1..max_bins).map(|j| j * ndistinct / max_bins).collect()
        };

        let thresholds = cuts
            .into_iter()
            .map(|i| (values[i - 1] + values[i]) / two)
            .collect::<Vec<_>>();

        let mut bins = FeatureBins {
            thresholds,
            zero_bin: 0,
        };
        bins.zero_bin = bins.bin(F::zero());
        bins
    }

    pub fn nbins(&self) -> usize {
        self.thresholds.len() + 1
    }

    pub fn bin(&self, value: F) -> usize {
        self.thresholds.partition_point(|t| *t < value)
    }

    /// The upper bound of `bin`, only valid for all but the last bin
    pub fn threshold(&self, bin: usize) -> F {
        self.thresholds[bin]
    }

    pub fn zero_bin(&self) -> usize {
        self.zero_bin
    }
}

/// A sparse feature matrix with every value replaced by its bin
///
/// Rows only store the entries whose bin differs from the zero bin of the feature, sorted by
/// feature index.
#[derive(Debug, Clone)]
pub(crate) struct BinnedRecords<F> {
    bins: Vec<FeatureBins<F>>,
    offsets: Vec<usize>,
    rows: Vec<Vec<(usize, usize)>>,
}

impl<F: Float> BinnedRecords<F> {
    pub fn new(records: &CsMat<F>, max_bins: usize) -> Self {
        let (nsamples, nfeatures) = records.shape();

        let mut columns = vec![Vec::new(); nfeatures];
        for (value, (_, col)) in records.iter() {
            columns[col].push(*value);
        }

        let bins = columns
            .into_iter()
            .map(|values| FeatureBins::new(values, max_bins))
            .collect::<Vec<_>>();

        let mut offsets = Vec::with_capacity(nfeatures + 1);
        offsets.push(0);
        for feature_bins in &bins {
            offsets.push(offsets[offsets.len() - 1] + feature_bins.nbins());
        }

        let mut rows = vec![Vec::new(); nsamples];
        for (value, (row, col)) in records.iter() {
            let bin = bins[col].bin(*value);
            if bin != bins[col].zero_bin() {
                rows[row].push((col, bin));
            }
        }
        for row in &mut rows {
            row.sort_unstable();
        }

        BinnedRecords {
            bins,
            offsets,
            rows,
        }
    }

    pub fn nsamples(&self) -> usize {
        self.rows.len()
    }

    pub fn nfeatures(&self) -> usize {
        self.bins.len()
    }

    pub fn feature_bins(&self, feature: usize) -> &FeatureBins<F> {
        &self.bins[feature]
    }

    /// Position of the first bin of `feature` in a flat histogram
    pub fn offset(&self, feature: usize) -> usize {
        self.offsets[feature]
    }

    /// Number of bins over all features
    pub fn total_bins(&self) -> usize {
        self.offsets[self.bins.len()]
    }

    /// The entries of `row` not lying in the zero bin
    pub fn row(&self, row: usize) -> &[(usize, usize)] {
        &self.rows[row]
    }

    pub fn bin_of(&self, row: usize, feature: usize) -> usize {
        let entries = &self.rows[row];
        match entries.binary_search_by_key(&feature, |(f, _)| *f) {
            Ok(idx) => entries[idx].1,
            Err(_) => self.bins[feature].zero_bin(),
        }
    }
}
