use std::error::Error;
use std::io::BufRead;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use senti::ParamGuard;
use senti_pipeline::{PipelineParams, PipelineValidParams};
use senti_trees::GradientBoostedTrees;

/// Train, evaluate and apply a sentiment classifier on a labelled review corpus
#[derive(Parser, Debug)]
#[command(name = "sentiment-demo", version, about)]
struct Args {
    /// Labelled corpus with one `text<delimiter>label` pair per line
    #[arg(long, default_value = "Data/yelp_labelled.txt")]
    data: PathBuf,

    /// Where the trained model is saved to and reloaded from
    #[arg(long, default_value = "Data/Model.json")]
    model: PathBuf,

    /// Fraction of the corpus held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f32,

    /// Seed of the train/test shuffle
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of boosted trees
    #[arg(long, default_value_t = 50)]
    num_trees: usize,

    /// Maximum number of leaves per tree
    #[arg(long, default_value_t = 50)]
    num_leaves: usize,

    /// Minimum number of training samples in a leaf
    #[arg(long, default_value_t = 20)]
    min_datapoints_per_leaf: usize,

    /// Shrinkage applied to the output of every tree
    #[arg(long, default_value_t = 0.2)]
    learning_rate: f64,

    /// Field delimiter of the corpus
    #[arg(long, default_value_t = '\t')]
    delimiter: char,

    /// Wait for Enter before exiting
    #[arg(long)]
    wait: bool,
}

impl Args {
    fn params(&self) -> Result<PipelineValidParams, Box<dyn Error>> {
        if !self.delimiter.is_ascii() {
            return Err(format!(
                "the delimiter has to be an ASCII character, got {:?}",
                self.delimiter
            )
            .into());
        }

        let boosting = GradientBoostedTrees::params()
            .num_trees(self.num_trees)
            .num_leaves(self.num_leaves)
            .min_datapoints_per_leaf(self.min_datapoints_per_leaf)
            .learning_rate(self.learning_rate);

        let params = PipelineParams::new()
            .data_path(&self.data)
            .model_path(&self.model)
            .test_fraction(self.test_fraction)
            .seed(self.seed)
            .delimiter(self.delimiter as u8)
            .boosting(boosting)
            .check()?;

        Ok(params)
    }
}

fn report(err: &dyn Error) {
    eprintln!("error: {}", err);

    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let result = args
        .params()
        .and_then(|params| senti_pipeline::run(&params).map_err(|err| err.into()));

    let status = match result {
        Ok(_) => {
            println!();
            println!("Done!");
            0
        }
        Err(err) => {
            report(err.as_ref());
            1
        }
    };

    if args.wait {
        let mut line = String::new();
        // the demo exits either way
        let _ = std::io::stdin().lock().read_line(&mut line);
    }

    process::exit(status);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn every_flag_is_documented() {
        Args::command().debug_assert();

        let command = Args::command();
        for arg in command.get_arguments() {
            if arg.get_id() == "help" || arg.get_id() == "version" {
                continue;
            }
            assert!(arg.get_help().is_some(), "--{} has no help", arg.get_id());
        }
    }

    #[test]
    fn flags_reach_the_boosting_params() {
        let args = Args::try_parse_from([
            "sentiment-demo",
            "--num-trees",
            "7",
            "--num-leaves",
            "9",
            "--min-datapoints-per-leaf",
            "3",
            "--learning-rate",
            "0.5",
        ])
        .unwrap();

        let params = args.params().unwrap();
        let boosting = params.boosting().check_ref().unwrap();
        assert_eq!(boosting.num_trees(), 7);
        assert_eq!(boosting.num_leaves(), 9);
        assert_eq!(boosting.min_datapoints_per_leaf(), 3);
        assert_eq!(boosting.learning_rate(), 0.5);
    }
}
