//! `senti-datasets` loads labelled text corpora into a [`TextDataset`](senti::TextDataset).
//!
//! ## File format
//!
//! Every non-empty line holds a document and its sentiment label, separated by a single
//! delimiter (TAB by default) and without a header row:
//!
//! ```text
//! Wow... Loved this place.	1
//! Crust is not good.	0
//! ```
//!
//! Labels are `0`/`1` or `false`/`true`, case-insensitive and with surrounding whitespace
//! ignored. Quote characters are part of the text.
//!
//! ## Using a dataset
//!
//! ```ignore
//! let dataset = senti_datasets::load_labelled_text("Data/yelp_labelled.txt", b'\t')?;
//! let (train, test) = dataset.train_test_split(0.2, &mut rng)?;
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use log::debug;
use ndarray::Array1;
use senti::TextDataset;
use thiserror::Error;

/// The delimiter of the yelp, amazon and imdb sentiment corpora
pub const DEFAULT_DELIMITER: u8 = b'\t';

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("could not read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },
}

/// Read a labelled text file from `path`
///
/// Fails if the file cannot be opened or one of its lines is malformed. `N` valid lines produce
/// exactly `N` samples in file order.
pub fn load_labelled_text<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<TextDataset> {
    let file = File::open(path.as_ref())?;
    let dataset = labelled_text_from_reader(file, delimiter)?;

    debug!(
        "loaded {} samples from {}",
        dataset.nsamples(),
        path.as_ref().display()
    );

    Ok(dataset)
}

/// Parse labelled text from any reader, see the [crate documentation](crate) for the format
pub fn labelled_text_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<TextDataset> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let mut texts = Vec::new();
    let mut labels = Vec::new();

    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() != 2 {
            return Err(DatasetError::Parse {
                line,
                message: format!("expected a text and a label, found {} fields", record.len()),
            });
        }

        labels.push(parse_label(&record[1]).ok_or_else(|| DatasetError::Parse {
            line,
            message: format!("invalid label {:?}, expected 0 or 1", &record[1]),
        })?);
        texts.push(record[0].to_string());
    }

    Ok(TextDataset::new(Array1::from(texts), Array1::from(labels)))
}

fn parse_label(field: &str) -> Option<bool> {
    let field = field.trim();

    if field == "1" || field.eq_ignore_ascii_case("true") {
        Some(true)
    } else if field == "0" || field.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Write;

    fn write_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn every_line_is_a_sample() {
        let file = write_file(
            "Wow... Loved this place.\t1\nCrust is not good.\t0\n\"Great\" service!\t1\n",
        );
        let dataset = load_labelled_text(file.path(), DEFAULT_DELIMITER).unwrap();

        assert_eq!(dataset.nsamples(), 3);
        assert_eq!(
            dataset.records(),
            &array![
                "Wow... Loved this place.".to_string(),
                "Crust is not good.".to_string(),
                "\"Great\" service!".to_string()
            ]
        );
        assert_eq!(dataset.targets(), &array![true, false, true]);
    }

    #[test]
    fn label_spellings() {
        let input = "a\t1\nb\t 0 \nc\tTRUE\nd\tfalse\n";
        let dataset = labelled_text_from_reader(input.as_bytes(), b'\t').unwrap();

        assert_eq!(dataset.targets(), &array![true, false, true, false]);
        let npositive = dataset.targets().iter().filter(|x| **x).count();
        assert_eq!(npositive, 2);
    }

    #[test]
    fn empty_lines_are_skipped() {
        let input = "a\t1\n\nb\t0\n\n";
        let dataset = labelled_text_from_reader(input.as_bytes(), b'\t').unwrap();
        assert_eq!(dataset.nsamples(), 2);

        let dataset = labelled_text_from_reader("".as_bytes(), b'\t').unwrap();
        assert_eq!(dataset.nsamples(), 0);
    }

    #[test]
    fn other_delimiters() {
        let input = "good food;1\nbad food;0";
        let dataset = labelled_text_from_reader(input.as_bytes(), b';').unwrap();

        assert_eq!(dataset.records()[1], "bad food");
        assert_eq!(dataset.targets(), &array![true, false]);
    }

    #[test]
    fn invalid_label_names_the_line() {
        let input = "a\t1\nb\tmaybe\n";
        let res = labelled_text_from_reader(input.as_bytes(), b'\t');

        match res {
            Err(DatasetError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a parse error, got {:?}", other.map(|d| d.nsamples())),
        }
    }

    #[test]
    fn wrong_field_count_names_the_line() {
        let input = "a\t1\nb\t0\nno label here\n";
        let res = labelled_text_from_reader(input.as_bytes(), b'\t');
        assert!(matches!(res, Err(DatasetError::Parse { line: 3, .. })));

        let input = "a\t1\t0\n";
        let res = labelled_text_from_reader(input.as_bytes(), b'\t');
        assert!(matches!(res, Err(DatasetError::Parse { line: 1, .. })));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let res = load_labelled_text(dir.path().join("missing.txt"), DEFAULT_DELIMITER);
        assert!(matches!(res, Err(DatasetError::Io(_))));
    }
}
