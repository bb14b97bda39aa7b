//! Composition models
//!
//! This module contains a single composition model:
//!  * `Platt`: calibrate a classifier (i.e. a boosted tree ensemble) to predicted posterior
//!    probabilities
pub mod platt_scaling;

pub use platt_scaling::{Platt, PlattError, PlattParams, PlattValidParams};
