//! Implement Platt calibration with Newton method
//!
//! Platt scaling is a way of transforming the raw scores of a classification model into a
//! probability distribution over classes. It fits a sigmoid
//!
//! ```text
//! p(score) = 1 / (1 + exp(A * score + B))
//! ```
//!
//! to the scores of a trained model and the ground truth of the dataset it was trained on. The
//! optimization follows the Newton method with backtracking line search of Lin et al., "A Note
//! on Platt's Probabilistic Outputs for Support Vector Machines".

use std::marker::PhantomData;

use crate::dataset::{AsTargets, DatasetBase, Float, Pr, Records};
use crate::param_guard::ParamGuard;
use crate::traits::{FitWith, Predict, PredictInplace};

use log::warn;
use ndarray::{Array1, ArrayView1};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use thiserror::Error;

/// Fitted Platt model
///
/// This model contains a sigmoid scaling parameter and a second parameter for the decision
/// threshold. The original model is kept and predictions of it are transformed into
/// probabilities.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Platt<F, O> {
    a: F,
    b: F,
    obj: O,
}

/// Parameters for Platt's Newton method
#[derive(Debug, Clone, PartialEq)]
pub struct PlattValidParams<F, O> {
    maxiter: usize,
    minstep: F,
    eps: F,
    phantom: PhantomData<O>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlattParams<F, O>(PlattValidParams<F, O>);

impl<F: Float, O> Default for PlattParams<F, O> {
    fn default() -> Self {
        Self(PlattValidParams {
            maxiter: 100,
            minstep: F::cast(1e-10),
            eps: F::cast(1e-12),
            phantom: PhantomData,
        })
    }
}

impl<F: Float, O> Platt<F, O> {
    /// Create default parameter set for the Platt scaling algorithm
    ///
    /// The default values are:
    /// * `maxiter`: 100,
    /// * `minstep`: 1e-10,
    /// * `eps`: 1e-12
    pub fn params() -> PlattParams<F, O> {
        PlattParams::default()
    }

    /// The sigmoid parameters `(A, B)`
    pub fn sigmoid(&self) -> (F, F) {
        (self.a, self.b)
    }

    /// The calibrated model
    pub fn inner(&self) -> &O {
        &self.obj
    }

    /// Map a raw score of the calibrated model to a probability
    pub fn probability(&self, score: F) -> Pr {
        Pr::new(platt_predict(score, self.a, self.b).to_f32().unwrap_or(0.5))
    }
}

impl<F: Float, O> PlattParams<F, O> {
    /// Set the maximum number of iterations in the optimization process
    ///
    /// The Newton's method is an iterative optimization process, which uses the first and second
    /// order gradients to find optimal `A` and `B`. This function caps the maximal number of
    /// iterations.
    pub fn maxiter(mut self, maxiter: usize) -> Self {
        self.0.maxiter = maxiter;
        self
    }

    /// Set the minimum stepsize in the line search
    ///
    /// This is scaled by the Hessian and then used to update the parameters `A` and `B`.
    pub fn minstep(mut self, minstep: F) -> Self {
        self.0.minstep = minstep;
        self
    }

    /// Set the regularization added to the Hessian diagonal
    pub fn eps(mut self, eps: F) -> Self {
        self.0.eps = eps;
        self
    }
}

impl<F: Float, O> ParamGuard for PlattParams<F, O> {
    type Checked = PlattValidParams<F, O>;
    type Error = PlattError;

    fn check_ref(&self) -> Result<&Self::Checked, PlattError> {
        if self.0.maxiter == 0 {
            Err(PlattError::MaxIterReached)
        } else if self.0.minstep < F::zero() {
            Err(PlattError::MinStepNegative(
                self.0.minstep.to_f32().unwrap_or(f32::NAN),
            ))
        } else if self.0.eps < F::zero() {
            Err(PlattError::EpsNegative(
                self.0.eps.to_f32().unwrap_or(f32::NAN),
            ))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, PlattError> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Platt Newton's method errors
///
/// Errors occur when setting invalid parameters or the dataset does not fit the model.
#[derive(Error, Debug)]
pub enum PlattError {
    #[error("maxiter should be larger than zero")]
    MaxIterReached,
    #[error("minstep should be positive, is {0}")]
    MinStepNegative(f32),
    #[error("eps should be positive, is {0}")]
    EpsNegative(f32),
    #[error(transparent)]
    SentiError(#[from] crate::error::Error),
}

impl<'a, F, R, T, O> FitWith<'a, R, T, PlattError> for PlattValidParams<F, O>
where
    F: Float,
    R: Records,
    T: AsTargets<Elem = bool>,
    O: PredictInplace<R, Array1<F>> + 'a,
{
    type ObjectIn = O;
    type ObjectOut = Platt<F, O>;

    /// Calibrate another model with Platt scaling
    ///
    /// This function takes another model and binary decision dataset and calibrates it to
    /// produce probability values. The returned model therefore implements the prediction trait
    /// for probability targets.
    fn fit_with(
        &self,
        obj: O,
        ds: &'a DatasetBase<R, T>,
    ) -> Result<Self::ObjectOut, PlattError> {
        let targets = ds.as_targets();
        if targets.len() != ds.nsamples() {
            return Err(crate::error::Error::MismatchedShapes(ds.nsamples(), targets.len()).into());
        }
        if targets.is_empty() {
            return Err(crate::error::Error::NotEnoughSamples.into());
        }

        let scores: Array1<F> = obj.predict(ds);
        let (a, b) = platt_newton_method(scores.view(), targets, self);

        Ok(Platt { a, b, obj })
    }
}

impl<R: Records, F: Float, O> PredictInplace<R, Array1<Pr>> for Platt<F, O>
where
    O: PredictInplace<R, Array1<F>>,
{
    fn predict_inplace(&self, data: &R, targets: &mut Array1<Pr>) {
        assert_eq!(
            data.nsamples(),
            targets.len(),
            "The number of data points must match the number of output targets."
        );

        let mut scores = self.obj.default_target(data);
        self.obj.predict_inplace(data, &mut scores);

        for (score, target) in scores.iter().zip(targets.iter_mut()) {
            *target = self.probability(*score);
        }
    }

    fn default_target(&self, data: &R) -> Array1<Pr> {
        Array1::from_elem(data.nsamples(), Pr::even())
    }
}

/// Predict a probability with the sigmoid parameters
///
/// The exponent is always taken of a non-positive number to avoid overflow.
fn platt_predict<F: Float>(x: F, a: F, b: F) -> F {
    let f_apb = a * x + b;

    if f_apb >= F::zero() {
        (-f_apb).exp() / (F::one() + (-f_apb).exp())
    } else {
        F::one() / (F::one() + f_apb.exp())
    }
}

/// Negative log-likelihood of the regularized targets under the sigmoid `(a, b)`
fn platt_objective<F: Float>(scores: &[F], targets: &[F], a: F, b: F) -> F {
    scores
        .iter()
        .zip(targets.iter())
        .map(|(v, t)| {
            let f_apb = *v * a + b;
            if f_apb >= F::zero() {
                *t * f_apb + (F::one() + (-f_apb).exp()).ln()
            } else {
                (*t - F::one()) * f_apb + (F::one() + f_apb.exp()).ln()
            }
        })
        .sum()
}

/// Run Newton's method to find optimal `A` and `B`
///
/// The targets are regularized to `(N+ + 1) / (N+ + 2)` and `1 / (N- + 2)` instead of one and
/// zero, which keeps the optimum finite even for perfectly separated scores. Running out of
/// iterations or a failing line search stops the optimization with the best parameters found
/// so far.
fn platt_newton_method<F: Float, O>(
    scores: ArrayView1<F>,
    labels: ArrayView1<bool>,
    params: &PlattValidParams<F, O>,
) -> (F, F) {
    let (num_pos, num_neg) = labels.iter().fold((0usize, 0usize), |mut val, x| {
        match x {
            true => val.0 += 1,
            false => val.1 += 1,
        }

        val
    });
    let (num_pos, num_neg) = (F::cast(num_pos), F::cast(num_neg));
    let two = F::one() + F::one();

    let (hi_target, lo_target) = ((num_pos + F::one()) / (num_pos + two), F::one() / (num_neg + two));

    let t = labels
        .iter()
        .map(|x| if *x { hi_target } else { lo_target })
        .collect::<Vec<_>>();
    let scores = scores.to_vec();

    let mut a = F::zero();
    let mut b = ((num_neg + F::one()) / (num_pos + F::one())).ln();
    let mut fval = platt_objective(&scores, &t, a, b);

    let stop = F::cast(1e-5);
    let sufficient_decrease = F::cast(1e-4);

    let mut converged = false;
    for _ in 0..params.maxiter {
        let (mut h11, mut h22) = (params.eps, params.eps);
        let (mut h21, mut g1, mut g2) = (F::zero(), F::zero(), F::zero());

        for (v, t) in scores.iter().zip(t.iter()) {
            let f_apb = *v * a + b;

            let (p, q) = if f_apb >= F::zero() {
                (
                    (-f_apb).exp() / (F::one() + (-f_apb).exp()),
                    F::one() / (F::one() + (-f_apb).exp()),
                )
            } else {
                (
                    F::one() / (F::one() + f_apb.exp()),
                    f_apb.exp() / (F::one() + f_apb.exp()),
                )
            };

            let d2 = p * q;
            h11 += *v * *v * d2;
            h22 += d2;
            h21 += *v * d2;

            let d1 = *t - p;
            g1 += *v * d1;
            g2 += d1;
        }

        if g1.abs() < stop && g2.abs() < stop {
            converged = true;
            break;
        }

        let det = h11 * h22 - h21 * h21;
        let d_a = -(h22 * g1 - h21 * g2) / det;
        let d_b = -(-h21 * g1 + h11 * g2) / det;
        let gd = g1 * d_a + g2 * d_b;

        let mut stepsize = F::one();
        while stepsize >= params.minstep {
            let new_a = a + stepsize * d_a;
            let new_b = b + stepsize * d_b;
            let newf = platt_objective(&scores, &t, new_a, new_b);

            if newf < fval + sufficient_decrease * stepsize * gd {
                a = new_a;
                b = new_b;
                fval = newf;
                break;
            }

            stepsize /= two;
        }

        if stepsize < params.minstep {
            warn!("platt calibration: line search failed, keeping A = {}, B = {}", a, b);
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            "platt calibration did not converge in {} iterations, keeping A = {}, B = {}",
            params.maxiter, a, b
        );
    }

    (a, b)
}
