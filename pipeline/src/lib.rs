//! # Sentiment classification pipeline
//!
//! `senti-pipeline` composes the workspace crates into a binary sentiment classifier for short
//! reviews:
//!
//! * documents are featurized with word and character n-gram counts ([`senti_text`]);
//! * a gradient boosted tree ensemble is trained on the features ([`senti_trees`]);
//! * ensemble scores are calibrated into probabilities with Platt scaling.
//!
//! [`run`] executes the complete demo: load a labelled corpus, hold out a test fraction, train
//! on the rest, evaluate on the held-out samples, save the model, reload it and classify a few
//! hand-written sentences.
//!
//! ```ignore
//! use senti::ParamGuard;
//! use senti_pipeline::{run, PipelineParams};
//!
//! let params = PipelineParams::new().data_path("Data/yelp_labelled.txt").check()?;
//! let summary = run(&params)?;
//! println!("{}", summary.metrics);
//! ```

use log::info;
use rand::{rngs::SmallRng, SeedableRng};
use senti::traits::Fit;

mod config;
mod error;
mod evaluate;
mod model;
pub mod persistence;
mod predict;
mod train;

pub use config::{CalibrationParams, PipelineParams, PipelineValidParams};
pub use error::{PipelineError, Result};
pub use evaluate::{evaluate, BinaryClassificationMetrics};
pub use model::{
    SentimentClassifier, SentimentModel, SentimentPrediction, DECISION_THRESHOLD,
    MODEL_FORMAT_VERSION,
};
pub use predict::{predict_batch, BatchPrediction, DEMO_SENTENCES};
pub use train::SentimentPipeline;

/// Outcome of a demo run
#[derive(Debug)]
pub struct RunSummary {
    pub ntrain: usize,
    pub ntest: usize,
    pub metrics: BinaryClassificationMetrics,
    pub predictions: Vec<BatchPrediction>,
}

/// Run the demo with the configuration in `params`
///
/// Progress markers and reports are printed to stdout.
pub fn run(params: &PipelineValidParams) -> Result<RunSummary> {
    let dataset = senti_datasets::load_labelled_text(params.data_path(), params.delimiter())?;
    info!(
        "loaded {} samples from {}",
        dataset.nsamples(),
        params.data_path().display()
    );

    let mut rng = SmallRng::seed_from_u64(params.seed());
    let (train, test) = dataset.train_test_split(params.test_fraction(), &mut rng)?;
    info!(
        "split into {} training and {} test samples",
        train.nsamples(),
        test.nsamples()
    );

    println!(">>> Training the model");
    let model = params.pipeline()?.fit(&train)?;
    println!(">>>>> Finished training the model");
    println!();

    println!(">>> Evaluating the model on the test data");
    let metrics = evaluate(&model, &test)?;
    println!();
    println!(">>> Model quality metrics");
    println!("--------------------------------");
    println!("{}", metrics);
    println!(">>> End of model quality metrics");

    persistence::save(&model, params.model_path())?;
    println!("Model saved to: {}", params.model_path().display());

    let model = persistence::load(params.model_path())?;
    let predictions = predict_batch(&model, &DEMO_SENTENCES)?;

    println!();
    println!(">>> Prediction of multiple samples");
    println!();
    for item in &predictions {
        println!("{}", item);
    }
    println!();
    println!(">>> End of predictions");

    Ok(RunSummary {
        ntrain: train.nsamples(),
        ntest: test.nsamples(),
        metrics,
        predictions,
    })
}
