//! Saving and loading trained models as JSON
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::error::{PipelineError, Result};
use crate::model::{SentimentModel, MODEL_FORMAT_VERSION};

/// Write `model` to `path`, creating the file or truncating an existing one
pub fn save<P: AsRef<Path>>(model: &SentimentModel, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer(&mut writer, model)?;
    writer.flush()?;

    debug!("saved model to {}", path.as_ref().display());
    Ok(())
}

/// Read a model written by [`save`]
///
/// Fails if the file was written with another model format version.
pub fn load<P: AsRef<Path>>(path: P) -> Result<SentimentModel> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let model: SentimentModel = serde_json::from_reader(reader)?;

    if model.format_version() != MODEL_FORMAT_VERSION {
        return Err(PipelineError::ModelVersion {
            expected: MODEL_FORMAT_VERSION,
            found: model.format_version(),
        });
    }

    debug!("loaded model from {}", path.as_ref().display());
    Ok(model)
}
