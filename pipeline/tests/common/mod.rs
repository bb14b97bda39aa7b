#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use senti::ParamGuard;
use senti_pipeline::{PipelineParams, SentimentPipeline};
use senti_trees::GradientBoostedTrees;

const POSITIVE: [&str; 6] = ["good", "great", "excellent", "tasty", "friendly", "amazing"];
const NEGATIVE: [&str; 6] = ["bad", "terrible", "awful", "bland", "rude", "disappointing"];
const NEUTRAL: [&str; 5] = ["food", "service", "place", "staff", "menu"];

/// Labelled review lines, alternating between positive and negative sentiment
pub fn reviews(n: usize) -> Vec<(String, bool)> {
    (0..n)
        .map(|i| {
            let positive = i % 2 == 0;
            let words = if positive { &POSITIVE } else { &NEGATIVE };
            let text = format!(
                "The {} was {} and {}",
                NEUTRAL[i % NEUTRAL.len()],
                words[i % words.len()],
                words[(i / 2 + 1) % words.len()]
            );
            (text, positive)
        })
        .collect()
}

pub fn write_dataset(dir: &Path, lines: &[(String, bool)]) -> PathBuf {
    let path = dir.join("labelled.txt");
    let mut file = std::fs::File::create(&path).unwrap();
    for (text, label) in lines {
        writeln!(file, "{}\t{}", text, if *label { 1 } else { 0 }).unwrap();
    }

    path
}

/// Default parameters with small trees, suited for tiny corpora
pub fn small_params() -> PipelineParams {
    PipelineParams::new().boosting(
        GradientBoostedTrees::params()
            .num_trees(20)
            .min_datapoints_per_leaf(2),
    )
}

pub fn small_pipeline() -> SentimentPipeline {
    small_params().check().unwrap().pipeline().unwrap()
}
