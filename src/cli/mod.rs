//! Command-line interface for lyrics-genre.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **predict**: Predict the genre of one lyrics text and list matching songs
//! - **batch**: Predict genres for every row of a CSV
//! - **browse**: List the catalog songs of a genre
//! - **status**: Show which training artifacts are present
//! - **serve**: Start the interactive web interface
//!
//! ## Usage
//!
//! ```text
//! # Predict from text
//! lyrics-genre predict "I've been walking these streets all night"
//!
//! # Pipe lyrics in
//! cat song.txt | lyrics-genre predict -
//!
//! # Batch predictions, then browse one predicted genre
//! lyrics-genre batch lyrics.csv --output predictions.csv --browse pop
//!
//! # Browse a catalog directly, as JSON
//! lyrics-genre browse rock --catalog songs.csv --format json
//!
//! # Start web UI
//! lyrics-genre serve --port 8080 --open
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::config::{AppConfig, DEFAULT_BROWSE_LIMIT};

pub mod batch;
pub mod browse;
pub mod predict;
pub mod status;

#[derive(Parser)]
#[command(name = "lyrics-genre")]
#[command(version)]
#[command(about = "Predict a song's genre from its lyrics and browse matching songs")]
#[command(
    long_about = "lyrics-genre classifies lyrics into a genre with a pre-trained model and lists songs of that genre from a local catalog.\n\nThe catalog may be any CSV: genre, title, artist and audio columns are recognised by name. Songs are presented with:\n- Local audio files when the audio column names an existing file\n- Remote URLs otherwise\n- A search link when no audio is available"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Directory holding pipeline_lr.json and metadata.json
    #[arg(long, global = true, default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// Directory searched for combined.csv(.gz) or train.csv/test.csv
    #[arg(long, global = true, default_value = ".")]
    pub data_dir: PathBuf,
}

impl Cli {
    /// Resolve the runtime configuration from global flags
    #[must_use]
    pub fn config(&self) -> AppConfig {
        AppConfig::new(&self.artifacts_dir, &self.data_dir)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict the genre of a lyrics text
    Predict(predict::PredictArgs),

    /// Predict genres for every row of a CSV
    Batch(batch::BatchArgs),

    /// List catalog songs of a genre
    Browse(browse::BrowseArgs),

    /// Show which training artifacts are present
    Status,

    /// Start the web server
    Serve(ServeArgs),
}

/// Options shared by every command that lists songs
#[derive(clap::Args, Debug, Clone)]
pub struct CatalogOptions {
    /// Catalog CSV to use instead of the files in --data-dir
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Maximum number of songs to list
    #[arg(short = 'n', long, default_value_t = DEFAULT_BROWSE_LIMIT)]
    pub limit: usize,

    /// Do not build search links for songs without audio
    #[arg(long)]
    pub no_search_links: bool,
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
