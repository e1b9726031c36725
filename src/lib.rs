//! # lyrics-genre
//!
//! A library for predicting a song's genre from its lyrics and browsing the
//! songs of that genre in a local catalog.
//!
//! Lyrics are normalised with [`utils::text::clean`] and classified by a
//! pre-trained model loaded from disk. The predicted label then selects songs
//! from a catalog CSV whose columns are recognised by name, and each song is
//! presented with the best audio source available.
//!
//! ## Features
//!
//! - **Schema-tolerant catalogs**: genre, title, artist and audio columns are
//!   found through synonym lists, case-insensitively
//! - **Layered catalog sources**: `combined.csv`, `combined.csv.gz`, or
//!   `train.csv` + `test.csv`, with an optional user upload taking precedence
//! - **Audio fallback chain**: local file bytes, remote URL, or a search link
//! - **Batch mode**: predict every row of a CSV and download the results
//!
//! ## Example
//!
//! ```rust,no_run
//! use lyrics_genre::{AppConfig, GenreBrowser, GenrePredictor, LinearModel};
//! use lyrics_genre::catalog::loader::CatalogLoader;
//! use lyrics_genre::utils::text::clean;
//!
//! let config = AppConfig::default();
//! let model = LinearModel::load_from_file(&config.model_path()).unwrap();
//! let genre = model.predict_one(&clean("Dancing all night under the city lights"));
//!
//! let catalog = CatalogLoader::from_config(&config).load();
//! let outcome = GenreBrowser::default().browse(&genre, catalog.as_ref(), None);
//! println!("{genre}: {} songs listed", outcome.rendered());
//! ```
//!
//! ## Modules
//!
//! - [`audio`]: Audio presentation for one catalog row
//! - [`browser`]: Genre filtering and listing
//! - [`catalog`]: Catalog discovery, caching and column-role resolution
//! - [`core`]: Tabular data types and configuration
//! - [`model`]: Predictor trait, model artifacts and batch prediction
//! - [`parsing`]: CSV reading and writing
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: Web server for the interactive interface

pub mod audio;
pub mod browser;
pub mod catalog;
pub mod cli;
pub mod core;
pub mod model;
pub mod parsing;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use audio::{resolve_audio, AudioPresentation, AudioResolver, ResolvedAudio};
pub use browser::{browse, BrowseOutcome, GenreBrowser};
pub use catalog::schema::resolve;
pub use core::catalog::Catalog;
pub use core::cell::CellValue;
pub use core::config::AppConfig;
pub use core::types::*;
pub use model::linear::LinearModel;
pub use model::GenrePredictor;
