use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::core::catalog::Catalog;
use crate::core::cell::CellValue;
use crate::model::GenrePredictor;
use crate::parsing::csv::{to_csv_string, write_csv, ParseError};
use crate::utils::text::clean;

/// Column appended with each row's predicted genre
pub const PREDICTION_COLUMN: &str = "pred_genre";

/// Text column used when none is requested and it exists
pub const DEFAULT_TEXT_COLUMN: &str = "Lyrics";

/// Number of rows shown when previewing batch results
pub const PREVIEW_ROWS: usize = 50;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Input CSV has no columns")]
    NoColumns,

    #[error("Column '{column}' not found; available columns: {available}")]
    UnknownColumn { column: String, available: String },

    #[error(transparent)]
    Write(#[from] ParseError),

    #[error("Failed to write predictions: {0}")]
    Io(#[from] std::io::Error),
}

/// Input rows with their predicted genres
#[derive(Debug, Clone)]
pub struct BatchPredictions {
    /// The input rows plus the [`PREDICTION_COLUMN`] column
    pub table: Catalog,
    pub text_column: String,
    /// Distinct predicted labels, sorted
    pub genres: Vec<String>,
}

/// Pick the column holding lyrics.
///
/// An explicitly requested column must exist. Otherwise `Lyrics` is used when
/// present, falling back to the first column.
///
/// # Errors
///
/// Returns `BatchError::UnknownColumn` for a requested column that does not
/// exist, or `BatchError::NoColumns` for a table without columns.
pub fn choose_text_column(table: &Catalog, requested: Option<&str>) -> Result<String, BatchError> {
    if let Some(column) = requested {
        if table.has_column(column) {
            return Ok(column.to_string());
        }
        return Err(BatchError::UnknownColumn {
            column: column.to_string(),
            available: table.columns().join(", "),
        });
    }

    if table.has_column(DEFAULT_TEXT_COLUMN) {
        return Ok(DEFAULT_TEXT_COLUMN.to_string());
    }
    table.columns().first().cloned().ok_or(BatchError::NoColumns)
}

/// Predict a genre for every row of `table`.
///
/// Missing text cells are treated as empty strings. Every text is cleaned
/// before prediction.
///
/// # Errors
///
/// See [`choose_text_column`].
pub fn predict_batch(
    predictor: &dyn GenrePredictor,
    mut table: Catalog,
    text_column: Option<&str>,
) -> Result<BatchPredictions, BatchError> {
    let text_column = choose_text_column(&table, text_column)?;

    let texts: Vec<String> = table
        .rows()
        .map(|row| clean(&row.get(&text_column).map(ToString::to_string).unwrap_or_default()))
        .collect();

    let predictions = predictor.predict(&texts);
    tracing::info!("Predicted {} rows using column '{text_column}'", predictions.len());

    let genres: Vec<String> = predictions
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    table.push_column(
        PREDICTION_COLUMN,
        predictions.into_iter().map(CellValue::Text).collect(),
    );

    Ok(BatchPredictions {
        table,
        text_column,
        genres,
    })
}

impl BatchPredictions {
    /// The first [`PREVIEW_ROWS`] rows
    #[must_use]
    pub fn preview(&self) -> Catalog {
        self.table.head(PREVIEW_ROWS)
    }

    /// Whether `genre` is one of the predicted labels
    #[must_use]
    pub fn contains_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }

    /// Render all rows as CSV
    ///
    /// # Errors
    ///
    /// Returns `BatchError::Write` if serialization fails.
    pub fn to_csv(&self) -> Result<String, BatchError> {
        Ok(to_csv_string(&self.table)?)
    }

    /// Write all rows as CSV to `path`.
    ///
    /// The file is written next to its destination and moved into place, so
    /// a failed write never leaves a truncated file behind.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::Io` or `BatchError::Write` if writing fails.
    pub fn write_to(&self, path: &Path) -> Result<(), BatchError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        write_csv(&self.table, temp.as_file_mut())?;
        temp.as_file_mut().flush()?;
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}
