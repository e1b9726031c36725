//! Song catalog discovery and schema inference.
//!
//! A catalog is any CSV describing songs. Its columns are not known in
//! advance, so [`schema::resolve`] guesses which columns hold the genre,
//! title, artist and audio source from ordered lists of synonyms.
//!
//! ## Sources
//!
//! [`loader::CatalogLoader`] looks in the data directory for, in order:
//!
//! | Priority | Source |
//! |----------|--------|
//! | 1 | `combined.csv` |
//! | 2 | `combined.csv.gz` |
//! | 3 | `train.csv` + `test.csv` (rows concatenated) |
//!
//! [`loader::CatalogCache`] memoizes the result for the session and holds a
//! user-uploaded catalog that overrides it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lyrics_genre::catalog::loader::CatalogLoader;
//! use lyrics_genre::catalog::schema;
//! use lyrics_genre::core::config::AppConfig;
//!
//! let loader = CatalogLoader::from_config(&AppConfig::default());
//! if let Some(catalog) = loader.load() {
//!     let roles = schema::resolve(&catalog);
//!     println!("genre column: {:?}", roles.genre);
//! }
//! ```

pub mod loader;
pub mod schema;
