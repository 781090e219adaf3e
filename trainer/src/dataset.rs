//! Labelled weather dataset loading and splitting

use std::fs::File;
use std::io::Read;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shared::{FEATURE_NAMES, LABEL_COLUMN, N_FEATURES};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to open dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Line {line}: column {column} has non-numeric value {value:?}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },

    #[error("Line {line}: weather code {value:?} is not an integer")]
    InvalidLabel { line: u64, value: String },

    #[error("No complete rows in dataset")]
    Empty,

    #[error("Invalid split: {0}")]
    InvalidSplit(String),
}

/// Feature rows in [`FEATURE_NAMES`] order with their weather codes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<i32>,
    /// Rows skipped because some field was missing
    pub dropped_rows: usize,
}

impl Dataset {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        Self::from_reader(File::open(path)?)
    }

    /// Parse CSV with a header row. Rows with any empty or `NaN` field are
    /// dropped, whether or not the field is one the model uses.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };
        let mut feature_columns = [0usize; N_FEATURES];
        for (slot, name) in feature_columns.iter_mut().zip(FEATURE_NAMES) {
            *slot = column(name)?;
        }
        let label_column = column(LABEL_COLUMN)?;

        let mut dataset = Dataset::default();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            if record.len() < headers.len() || record.iter().any(is_missing) {
                dataset.dropped_rows += 1;
                continue;
            }

            let mut row = Vec::with_capacity(N_FEATURES);
            for (&idx, name) in feature_columns.iter().zip(FEATURE_NAMES) {
                let raw = &record[idx];
                let value: f64 = raw.parse().map_err(|_| DatasetError::InvalidValue {
                    line,
                    column: name.to_string(),
                    value: raw.to_string(),
                })?;
                row.push(value);
            }

            dataset.features.push(row);
            dataset.labels.push(parse_label(&record[label_column], line)?);
        }

        if dataset.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            dropped_rows: 0,
        }
    }

    /// Shuffle with `seed` and hold out `ceil(test_size * n)` rows; returns `(train, test)`
    pub fn train_test_split(
        &self,
        test_size: f64,
        seed: u64,
    ) -> Result<(Dataset, Dataset), DatasetError> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(DatasetError::InvalidSplit(format!(
                "test size must be between 0 and 1, got {}",
                test_size
            )));
        }
        let n_test = (test_size * self.len() as f64).ceil() as usize;
        if n_test == 0 || n_test >= self.len() {
            return Err(DatasetError::InvalidSplit(format!(
                "{} rows cannot be split with test size {}",
                self.len(),
                test_size
            )));
        }

        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));
        let (test, train) = order.split_at(n_test);

        Ok((self.subset(train), self.subset(test)))
    }
}

/// Cell values read as missing, matched exactly
const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(field: &str) -> bool {
    NA_VALUES.contains(&field)
}

/// Weather codes may be written as integral floats (`3.0`)
fn parse_label(raw: &str, line: u64) -> Result<i32, DatasetError> {
    let invalid = || DatasetError::InvalidLabel {
        line,
        value: raw.to_string(),
    };
    if let Ok(code) = raw.parse::<i32>() {
        return Ok(code);
    }
    let value: f64 = raw.parse().map_err(|_| invalid())?;
    if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
        return Err(invalid());
    }
    Ok(value as i32)
}
