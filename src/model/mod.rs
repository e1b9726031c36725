//! Genre prediction from cleaned lyrics.
//!
//! The classifier is consumed as a black box through [`GenrePredictor`].
//! [`linear::LinearModel`] loads the trained artifact written by the training
//! pipeline; [`artifacts`] reports which artifacts are present and memoizes
//! the loaded model; [`batch`] runs predictions over a CSV.

pub mod artifacts;
pub mod batch;
pub mod linear;

use thiserror::Error;

/// Anything that maps cleaned lyrics to genre labels.
///
/// Implementations return exactly one label per input, in input order.
pub trait GenrePredictor: Send + Sync {
    fn predict(&self, texts: &[String]) -> Vec<String>;

    /// Predict a single text
    fn predict_one(&self, text: &str) -> String {
        self.predict(&[text.to_string()])
            .into_iter()
            .next()
            .unwrap_or_default()
    }
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Missing model artifact {0}. Please run the training notebook to generate artifacts.")]
    Missing(String),

    #[error("Failed to read model artifact: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse model artifact: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}
