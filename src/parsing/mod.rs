//! Parsers for the tabular files the tool consumes.
//!
//! Song catalogs and batch prediction inputs are both CSV with a header line
//! and an arbitrary set of columns:
//!
//! ```rust,no_run
//! use lyrics_genre::parsing::csv::read_csv_file;
//! use std::path::Path;
//!
//! let catalog = read_csv_file(Path::new("combined.csv.gz")).unwrap();
//! println!("{} songs, columns: {:?}", catalog.len(), catalog.columns());
//! ```

pub mod csv;
