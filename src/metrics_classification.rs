//! Common metrics for performance evaluation of classifier
//!
//! Scoring is essential for classification tasks. This module implements common scoring
//! functions like precision, accuracy, recall, f1-score, log-loss, ROC and ROC
//! Area-Under-Curve.
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use ndarray::prelude::*;
use ndarray::Data;

use crate::dataset::{AsTargets, Label, Pr};
use crate::error::{Error, Result};

/// Confusion matrix for multi-label evaluation
///
/// A confusion matrix shows predictions in a matrix, where rows correspond to predicted and
/// columns to target labels. The diagonal entries are correct predictions.
#[derive(Clone, PartialEq)]
pub struct ConfusionMatrix<A> {
    matrix: Array2<f32>,
    members: Array1<A>,
}

impl<A: Label> ConfusionMatrix<A> {
    fn index_of(&self, label: &A) -> Option<usize> {
        self.members.iter().position(|x| x == label)
    }

    /// Classes of the matrix, in row (and column) order
    pub fn members(&self) -> ArrayView1<A> {
        self.members.view()
    }

    /// Number of samples predicted as `predicted` while belonging to `target`
    pub fn count(&self, predicted: &A, target: &A) -> f32 {
        match (self.index_of(predicted), self.index_of(target)) {
            (Some(i), Some(j)) => self.matrix[(i, j)],
            _ => 0.0,
        }
    }

    /// Calculate precision for every class
    ///
    /// Classes which were never predicted have a precision of zero.
    pub fn precision(&self) -> Array1<f32> {
        let sum = self.matrix.sum_axis(Axis(1));

        self.matrix
            .diag()
            .iter()
            .zip(sum.iter())
            .map(|(a, b)| ratio(*a, *b))
            .collect()
    }

    /// Calculate recall for every class
    ///
    /// Classes which never occur in the ground truth have a recall of zero.
    pub fn recall(&self) -> Array1<f32> {
        let sum = self.matrix.sum_axis(Axis(0));

        self.matrix
            .diag()
            .iter()
            .zip(sum.iter())
            .map(|(a, b)| ratio(*a, *b))
            .collect()
    }

    /// Return mean accuracy
    pub fn accuracy(&self) -> f32 {
        ratio(self.matrix.diag().sum(), self.matrix.sum())
    }

    /// Return beta score for every class
    pub fn f_score(&self, beta: f32) -> Array1<f32> {
        let sb = beta * beta;
        let precision = self.precision();
        let recall = self.recall();

        precision
            .iter()
            .zip(recall.iter())
            .map(|(p, r)| ratio((1.0 + sb) * (p * r), sb * p + r))
            .collect()
    }

    /// Return beta=1 score for every class
    pub fn f1_score(&self) -> Array1<f32> {
        self.f_score(1.0)
    }

    /// Precision of a single class, zero if the class is unknown
    pub fn precision_for(&self, label: &A) -> f32 {
        self.index_of(label)
            .map(|i| self.precision()[i])
            .unwrap_or(0.0)
    }

    /// Recall of a single class, zero if the class is unknown
    pub fn recall_for(&self, label: &A) -> f32 {
        self.index_of(label).map(|i| self.recall()[i]).unwrap_or(0.0)
    }

    /// F1 score of a single class, zero if the class is unknown
    pub fn f1_for(&self, label: &A) -> f32 {
        self.index_of(label)
            .map(|i| self.f1_score()[i])
            .unwrap_or(0.0)
    }
}

fn ratio(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        0.0
    } else {
        a / b
    }
}

/// Print a confusion matrix
impl<A: fmt::Display> fmt::Debug for ConfusionMatrix<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let len = self.matrix.len_of(Axis(0));
        writeln!(f)?;
        write!(f, "{: <10}", "classes")?;
        for member in self.members.iter() {
            write!(f, " | {: <10}", member)?;
        }
        writeln!(f)?;

        for i in 0..len {
            write!(f, "{: <10}", self.members[i])?;

            for j in 0..len {
                write!(f, " | {: <10}", self.matrix[(i, j)])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Classification functions
///
/// Contains only routine for Confusion Matrix, as all other current metrices can be derived from
/// the entries in the matrix.
pub trait ToConfusionMatrix<A, T> {
    fn confusion_matrix(&self, ground_truth: T) -> Result<ConfusionMatrix<A>>;
}

impl<A, C, D> ToConfusionMatrix<A, &ArrayBase<D, Ix1>> for ArrayBase<C, Ix1>
where
    A: Label + Ord,
    C: Data<Elem = A>,
    D: Data<Elem = A>,
{
    fn confusion_matrix(&self, ground_truth: &ArrayBase<D, Ix1>) -> Result<ConfusionMatrix<A>> {
        if self.len() != ground_truth.len() {
            return Err(Error::MismatchedShapes(self.len(), ground_truth.len()));
        }

        // every label seen in either prediction or ground truth becomes a class
        let mut classes = ground_truth
            .iter()
            .chain(self.iter())
            .cloned()
            .collect::<Vec<_>>();
        classes.sort();
        classes.dedup();

        let indices = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c, i))
            .collect::<HashMap<_, usize>>();

        let mut matrix = Array2::zeros((classes.len(), classes.len()));
        for (predicted, target) in self.iter().zip(ground_truth.iter()) {
            matrix[(indices[predicted], indices[target])] += 1.0;
        }

        Ok(ConfusionMatrix {
            matrix,
            members: Array1::from(classes),
        })
    }
}

/// Integration using the trapezoidal rule.
fn trapezoidal(vals: &[(f32, f32)]) -> f32 {
    let mut prev_x = vals[0].0;
    let mut prev_y = vals[0].1;
    let mut integral = 0.0;

    for (x, y) in vals.iter().skip(1) {
        integral += (*x - prev_x) * (prev_y + *y) / 2.0;
        prev_x = *x;
        prev_y = *y;
    }
    integral
}

/// Receiver operating characteristic of a probabilistic binary classifier
///
/// The curve consists of `(false positive rate, true positive rate)` pairs, starting at `(0, 0)`
/// and ending at `(1, 1)`. Each further point belongs to a threshold, samples with tied
/// probabilities are added together.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverOperatingCharacteristic {
    curve: Vec<(f32, f32)>,
    thresholds: Vec<f32>,
}

impl ReceiverOperatingCharacteristic {
    pub fn get_curve(&self) -> Vec<(f32, f32)> {
        self.curve.clone()
    }

    pub fn get_thresholds(&self) -> Vec<f32> {
        self.thresholds.clone()
    }

    pub fn area_under_curve(&self) -> f32 {
        trapezoidal(&self.curve)
    }
}

/// Metrics for calibrated binary classifiers
///
/// Implemented for predicted probabilities of the positive class.
pub trait BinaryClassification<T> {
    /// The ROC curve of the predictions, fails unless both classes are present
    fn roc(&self, y: T) -> Result<ReceiverOperatingCharacteristic>;

    /// Mean negative log-likelihood of the ground truth, in nats
    fn log_loss(&self, y: T) -> Result<f32>;
}

/// The ROC curve gives insight about the seperability of a binary classification task. This
/// functions returns the ROC curve and threshold belonging to each position on the curve.
impl<D, T> BinaryClassification<&T> for ArrayBase<D, Ix1>
where
    D: Data<Elem = Pr>,
    T: AsTargets<Elem = bool>,
{
    fn roc(&self, y: &T) -> Result<ReceiverOperatingCharacteristic> {
        let y = y.as_targets();
        if self.len() != y.len() {
            return Err(Error::MismatchedShapes(self.len(), y.len()));
        }

        let mut tuples = self
            .iter()
            .zip(y.iter())
            .map(|(a, b)| (**a, *b))
            .collect::<Vec<(f32, bool)>>();

        let (max_tp, max_fp) = tuples.iter().fold((0.0f32, 0.0f32), |(tp, fp), (_, t)| {
            if *t {
                (tp + 1.0, fp)
            } else {
                (tp, fp + 1.0)
            }
        });
        if max_tp == 0.0 || max_fp == 0.0 {
            return Err(Error::MissingClass);
        }

        // highest probabilities first
        tuples.sort_unstable_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let (mut tp, mut fp) = (0.0, 0.0);
        let mut curve = vec![(0.0, 0.0)];
        let mut thresholds = Vec::new();

        for (i, (s, t)) in tuples.iter().enumerate() {
            if *t {
                tp += 1.0;
            } else {
                fp += 1.0;
            }

            // close the group of tied probabilities
            if tuples.get(i + 1).map(|next| next.0 != *s).unwrap_or(true) {
                curve.push((fp / max_fp, tp / max_tp));
                thresholds.push(*s);
            }
        }

        Ok(ReceiverOperatingCharacteristic { curve, thresholds })
    }

    fn log_loss(&self, y: &T) -> Result<f32> {
        let y = y.as_targets();
        if self.len() != y.len() {
            return Err(Error::MismatchedShapes(self.len(), y.len()));
        }
        if self.is_empty() {
            return Err(Error::NotEnoughSamples);
        }

        let eps = 1e-15;
        let sum = self
            .iter()
            .zip(y.iter())
            .map(|(p, t)| {
                let p = (p.0 as f64).max(eps).min(1.0 - eps);
                if *t {
                    -p.ln()
                } else {
                    -(1.0 - p).ln()
                }
            })
            .sum::<f64>();

        Ok((sum / self.len() as f64) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::{BinaryClassification, ToConfusionMatrix};
    use crate::dataset::Pr;
    use crate::error::Error;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1, ArrayBase, ArrayView1, Data, Dimension};
    use rand::{distributions::Uniform, rngs::SmallRng, Rng, SeedableRng};

    fn assert_eq_slice<S: Data<Elem = f32>, D: Dimension>(a: ArrayBase<S, D>, b: &[f32]) {
        let a = a.iter().cloned().collect::<Vec<_>>();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-6);
        }
    }

    fn probabilities(values: &[f32]) -> Array1<Pr> {
        values.iter().map(|x| Pr::new(*x)).collect()
    }

    #[test]
    fn test_confusion_matrix() {
        let predicted = ArrayView1::from(&[0, 1, 0, 1, 0, 1]);
        let ground_truth = ArrayView1::from(&[1, 1, 0, 1, 0, 1]);

        let cm = predicted.confusion_matrix(&ground_truth).unwrap();

        assert_eq_slice(cm.matrix, &[2., 1., 0., 3.]);
    }

    #[test]
    fn test_cm_metrices() {
        let predicted = Array1::from(vec![0usize, 1, 0, 1, 0, 1]);
        let ground_truth = Array1::from(vec![1usize, 1, 0, 1, 0, 1]);

        let x = predicted.confusion_matrix(&ground_truth).unwrap();

        assert_abs_diff_eq!(x.accuracy(), 5.0 / 6.0);
        assert_eq_slice(x.precision(), &[2. / 3., 1.0]);
        assert_eq_slice(x.recall(), &[1.0, 3. / 4.]);
        assert_eq_slice(x.f1_score(), &[4.0 / 5.0, 6.0 / 7.0]);

        assert_abs_diff_eq!(x.precision_for(&1), 1.0);
        assert_abs_diff_eq!(x.recall_for(&1), 0.75);
        assert_abs_diff_eq!(x.f1_for(&1), 6.0 / 7.0, epsilon = 1e-6);
        assert_abs_diff_eq!(x.count(&0, &1), 1.0);
    }

    #[test]
    fn zero_division_gives_zero() {
        // the positive class is never predicted
        let predicted = array![false, false, false];
        let ground_truth = array![true, false, false];

        let cm = predicted.confusion_matrix(&ground_truth).unwrap();
        assert_abs_diff_eq!(cm.precision_for(&true), 0.0);
        assert_abs_diff_eq!(cm.recall_for(&true), 0.0);
        assert_abs_diff_eq!(cm.f1_for(&true), 0.0);

        // an unknown class
        let cm = array![false].confusion_matrix(&array![false]).unwrap();
        assert_abs_diff_eq!(cm.f1_for(&true), 0.0);
        assert_abs_diff_eq!(cm.accuracy(), 1.0);
    }

    #[test]
    fn mismatched_lengths() {
        let predicted = array![true, false];
        let ground_truth = array![true];

        assert!(matches!(
            predicted.confusion_matrix(&ground_truth),
            Err(Error::MismatchedShapes(2, 1))
        ));
    }

    #[test]
    fn test_roc_curve() {
        let predicted = probabilities(&[0.1, 0.3, 0.5, 0.7, 0.8, 0.9]);
        let groundtruth = array![false, true, false, true, true, true];

        let result = &[
            (0.0, 0.0),   // start
            (0.0, 0.25),  // three highest probabilities are positive
            (0.0, 0.5),
            (0.0, 0.75),
            (0.5, 0.75),  // first negative
            (0.5, 1.0),   // last positive
            (1.0, 1.0),
        ];

        let roc = predicted.roc(&groundtruth).unwrap();
        assert_eq!(roc.get_curve(), result);
        assert_eq!(roc.get_thresholds(), vec![0.9, 0.8, 0.7, 0.5, 0.3, 0.1]);
        assert_abs_diff_eq!(roc.area_under_curve(), 0.875);
    }

    #[test]
    fn roc_groups_ties() {
        let predicted = probabilities(&[0.5, 0.5, 0.5, 0.5]);
        let groundtruth = array![true, false, true, false];

        let roc = predicted.roc(&groundtruth).unwrap();
        assert_eq!(roc.get_curve(), vec![(0.0, 0.0), (1.0, 1.0)]);
        assert_abs_diff_eq!(roc.area_under_curve(), 0.5);
    }

    #[test]
    fn test_roc_auc() {
        let predicted = probabilities(&Array1::<f32>::linspace(0.0, 1.0, 1000).to_vec());

        let mut rng = SmallRng::seed_from_u64(42);
        let range = Uniform::new(0, 2);

        // randomly sample ground truth
        let ground_truth = (0..1000)
            .map(|_| rng.sample(&range) == 1)
            .collect::<Array1<_>>();

        // ROC Area-Under-Curve should be approximately 0.5
        let roc = predicted.roc(&ground_truth).unwrap();
        assert!((roc.area_under_curve() - 0.5).abs() < 0.06);

        // a perfect ranking
        let perfect = predicted.iter().map(|p| **p > 0.5).collect::<Array1<_>>();
        assert_abs_diff_eq!(predicted.roc(&perfect).unwrap().area_under_curve(), 1.0);
    }

    #[test]
    fn roc_requires_both_classes() {
        let predicted = probabilities(&[0.2, 0.9]);

        assert!(matches!(
            predicted.roc(&array![true, true]),
            Err(Error::MissingClass)
        ));
        assert!(matches!(
            predicted.roc(&array![false, false]),
            Err(Error::MissingClass)
        ));
    }

    #[test]
    fn log_loss() {
        let predicted = probabilities(&[0.5, 0.5]);
        let loss = predicted.log_loss(&array![true, false]).unwrap();
        assert_abs_diff_eq!(loss, std::f32::consts::LN_2, epsilon = 1e-6);

        // confident and correct predictions are almost free
        let predicted = probabilities(&[1.0, 0.0]);
        let loss = predicted.log_loss(&array![true, false]).unwrap();
        assert!(loss < 1e-6);

        // confident and wrong predictions are clipped, but expensive
        let loss = predicted.log_loss(&array![false, true]).unwrap();
        assert!(loss > 30.0 && loss.is_finite());
    }
}
