use std::fmt;

use senti::traits::Transformer;

use crate::error::Result;
use crate::model::{SentimentModel, SentimentPrediction};

/// The sentences classified at the end of the demo
pub const DEMO_SENTENCES: [&str; 2] = ["I didn't like this outfit.", "I want so much a new computer!"];

/// A document together with the prediction made for it
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPrediction {
    pub text: String,
    pub prediction: SentimentPrediction,
}

impl fmt::Display for BatchPrediction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Sentiment: {} | Prediction: {} | Probability: {}",
            self.text,
            self.prediction.sentiment(),
            self.prediction.probability
        )
    }
}

/// Predict the sentiment of unlabelled documents
///
/// The `i`-th result pairs the `i`-th document with its prediction.
pub fn predict_batch<T: ToString + Clone>(
    model: &SentimentModel,
    texts: &[T],
) -> Result<Vec<BatchPrediction>> {
    let predictions = model.transform(texts)?;

    Ok(texts
        .iter()
        .zip(predictions.into_iter())
        .map(|(text, prediction)| BatchPrediction {
            text: text.to_string(),
            prediction,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_line() {
        let item = BatchPrediction {
            text: "I didn't like this outfit.".to_string(),
            prediction: SentimentPrediction {
                predicted_label: false,
                probability: 0.25,
                score: -1.5,
            },
        };

        assert_eq!(
            item.to_string(),
            "Sentiment: I didn't like this outfit. | Prediction: Negative | Probability: 0.25"
        );
    }
}
