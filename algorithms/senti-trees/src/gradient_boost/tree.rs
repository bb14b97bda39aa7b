//! Regression trees grown leaf-wise on gradient statistics

use senti::Float;
use sprs::CsVecView;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use super::binning::BinnedRecords;
use super::hyperparams::GradientBoostValidParams;

/// A node of a regression tree
///
/// Samples whose value of `feature` is smaller or equal to `threshold` continue in the `left`
/// child, all others in the `right` child. Children are indices into the node list of the tree.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode<F> {
    Split {
        feature: usize,
        threshold: F,
        gain: F,
        left: usize,
        right: usize,
    },
    Leaf {
        value: F,
    },
}

/// A regression tree predicting additive score updates
///
/// The root is the first node.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree<F> {
    nodes: Vec<TreeNode<F>>,
}

impl<F: Float> RegressionTree<F> {
    pub fn nodes(&self) -> &[TreeNode<F>] {
        &self.nodes
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, TreeNode::Leaf { .. }))
            .count()
    }

    /// Follow the decision rules for a single sample down to its leaf value
    pub fn predict_row(&self, row: CsVecView<F>) -> F {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let value = row.get(*feature).copied().unwrap_or_else(F::zero);
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Gradient and hessian sums of the samples in a histogram bin
#[derive(Debug, Clone, Copy)]
struct BinStats<F> {
    gradient: F,
    hessian: F,
    count: usize,
}

impl<F: Float> BinStats<F> {
    fn zero() -> Self {
        BinStats {
            gradient: F::zero(),
            hessian: F::zero(),
            count: 0,
        }
    }
}

/// The best way to divide a leaf
#[derive(Debug, Clone)]
struct SplitCandidate<F> {
    feature: usize,
    bin: usize,
    threshold: F,
    gain: F,
}

#[derive(Debug)]
struct LeafCandidate<F> {
    node: usize,
    rows: Vec<usize>,
    gradient: F,
    hessian: F,
    split: Option<SplitCandidate<F>>,
}

/// Grows a single tree on the first and second order gradients of the loss
pub(crate) struct TreeLearner<'a, F> {
    data: &'a BinnedRecords<F>,
    params: &'a GradientBoostValidParams<F>,
    gradients: &'a [F],
    hessians: &'a [F],
}

impl<'a, F: Float> TreeLearner<'a, F> {
    pub fn new(
        data: &'a BinnedRecords<F>,
        params: &'a GradientBoostValidParams<F>,
        gradients: &'a [F],
        hessians: &'a [F],
    ) -> Self {
        TreeLearner {
            data,
            params,
            gradients,
            hessians,
        }
    }

    /// Grow a tree leaf by leaf
    ///
    /// In every step the leaf whose best split has the highest gain is divided, until
    /// `num_leaves` leaves exist or no leaf can be split anymore. Leaf values are Newton steps
    /// scaled by the learning rate.
    ///
    /// Returns the tree and the output of the tree for every training sample.
    pub fn grow(&self) -> (RegressionTree<F>, Vec<F>) {
        let mut nodes = vec![TreeNode::Leaf { value: F::zero() }];
        let root = self.leaf_candidate(0, (0..self.data.nsamples()).collect());
        let mut leaves = vec![root];

        while leaves.len() < self.params.num_leaves() {
            // the first leaf wins ties
            let mut best: Option<(usize, F)> = None;
            for (i, leaf) in leaves.iter().enumerate() {
                if let Some(split) = &leaf.split {
                    if best.map(|(_, gain)| split.gain > gain).unwrap_or(true) {
                        best = Some((i, split.gain));
                    }
                }
            }

            let leaf = match best {
                Some((i, _)) => leaves.swap_remove(i),
                None => break,
            };
            let split = match leaf.split {
                Some(split) => split,
                None => break,
            };

            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = leaf
                .rows
                .iter()
                .partition(|row| self.data.bin_of(**row, split.feature) <= split.bin);

            let (left, right) = (nodes.len(), nodes.len() + 1);
            nodes[leaf.node] = TreeNode::Split {
                feature: split.feature,
                threshold: split.threshold,
                gain: split.gain,
                left,
                right,
            };
            nodes.push(TreeNode::Leaf { value: F::zero() });
            nodes.push(TreeNode::Leaf { value: F::zero() });

            leaves.push(self.leaf_candidate(left, left_rows));
            leaves.push(self.leaf_candidate(right, right_rows));
            // leaves are visited in order of creation
            leaves.sort_by_key(|l| l.node);
        }

        let mut outputs = vec![F::zero(); self.data.nsamples()];
        for leaf in &leaves {
            let value = self.leaf_value(leaf.gradient, leaf.hessian);
            nodes[leaf.node] = TreeNode::Leaf { value };
            for row in &leaf.rows {
                outputs[*row] = value;
            }
        }

        (RegressionTree { nodes }, outputs)
    }

    fn leaf_candidate(&self, node: usize, rows: Vec<usize>) -> LeafCandidate<F> {
        let gradient = rows.iter().map(|r| self.gradients[*r]).sum();
        let hessian = rows.iter().map(|r| self.hessians[*r]).sum();
        let split = self.find_split(&rows, gradient, hessian);

        LeafCandidate {
            node,
            rows,
            gradient,
            hessian,
            split,
        }
    }

    fn leaf_value(&self, gradient: F, hessian: F) -> F {
        let denominator = hessian + self.params.l2_regularization();
        if denominator > F::zero() {
            -self.params.learning_rate() * gradient / denominator
        } else {
            F::zero()
        }
    }

    fn score(&self, gradient: F, hessian: F) -> F {
        let denominator = hessian + self.params.l2_regularization();
        if denominator > F::zero() {
            gradient * gradient / denominator
        } else {
            F::zero()
        }
    }

    /// Scan the histograms of all features for the split with the highest gain
    ///
    /// Splits leaving fewer than `min_datapoints_per_leaf` samples on either side are not
    /// considered. Ties are resolved in favour of the smallest feature index and bin, gains
    /// differing only by rounding count as ties.
    fn find_split(&self, rows: &[usize], gradient: F, hessian: F) -> Option<SplitCandidate<F>> {
        let min_leaf = self.params.min_datapoints_per_leaf();
        if rows.len() < 2 * min_leaf {
            return None;
        }

        let mut histogram = vec![BinStats::zero(); self.data.total_bins()];
        for row in rows {
            for (feature, bin) in self.data.row(*row) {
                let stats = &mut histogram[self.data.offset(*feature) + *bin];
                stats.gradient += self.gradients[*row];
                stats.hessian += self.hessians[*row];
                stats.count += 1;
            }
        }

        let parent_score = self.score(gradient, hessian);
        let mut best: Option<SplitCandidate<F>> = None;

        for feature in 0..self.data.nfeatures() {
            let bins = self.data.feature_bins(feature);
            let nbins = bins.nbins();
            if nbins < 2 {
                continue;
            }

            let offset = self.data.offset(feature);
            let stats = &mut histogram[offset..offset + nbins];

            // samples without a stored entry all lie in the zero bin
            let mut rest = BinStats::zero();
            for s in stats.iter() {
                rest.gradient += s.gradient;
                rest.hessian += s.hessian;
                rest.count += s.count;
            }
            let zero_bin = bins.zero_bin();
            stats[zero_bin].gradient = gradient - rest.gradient;
            stats[zero_bin].hessian = hessian - rest.hessian;
            stats[zero_bin].count = rows.len() - rest.count;

            let mut left = BinStats::zero();
            for (bin, s) in stats.iter().enumerate().take(nbins - 1) {
                left.gradient += s.gradient;
                left.hessian += s.hessian;
                left.count += s.count;

                let right_count = rows.len() - left.count;
                if left.count < min_leaf || right_count < min_leaf {
                    continue;
                }

                let gain = self.score(left.gradient, left.hessian)
                    + self.score(gradient - left.gradient, hessian - left.hessian)
                    - parent_score;

                if gain > self.params.min_split_gain()
                    && best.as_ref().map(|b| improves(gain, b.gain)).unwrap_or(true)
                {
                    best = Some(SplitCandidate {
                        feature,
                        bin,
                        threshold: bins.threshold(bin),
                        gain,
                    });
                }
            }
        }

        best
    }
}

/// Whether `gain` is larger than `best` by more than floating point noise
fn improves<F: Float>(gain: F, best: F) -> bool {
    gain - best > F::cast(1e-10) * best.abs()
}
