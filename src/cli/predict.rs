use std::io::{self, Read};

use anyhow::Context;
use clap::Args;

use crate::cli::browse::{browser_for, open_catalog, print_outcome};
use crate::cli::{CatalogOptions, OutputFormat};
use crate::core::config::AppConfig;
use crate::model::artifacts::ModelCache;
use crate::utils::text::clean;

#[derive(Args)]
pub struct PredictArgs {
    /// Lyrics to classify. Use '-' to read them from stdin
    #[arg(required = true)]
    pub text: String,

    /// Only print the predicted genre
    #[arg(long)]
    pub no_browse: bool,

    #[command(flatten)]
    pub options: CatalogOptions,
}

/// Execute predict subcommand
///
/// # Errors
///
/// Returns an error if the lyrics are empty, stdin cannot be read, the model
/// artifact is missing or invalid, or `--catalog` cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: PredictArgs,
    config: &AppConfig,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let raw = read_text(&args.text)?;
    if raw.trim().is_empty() {
        anyhow::bail!(
            "Please provide some lyrics to classify. Blank input is refused rather than classified as an empty song."
        );
    }

    let model = ModelCache::new()
        .get_or_load(&config.model_path())
        .context("Cannot predict without a trained model")?;

    let cleaned = clean(&raw);
    if verbose {
        eprintln!(
            "Cleaned text: {} words",
            cleaned.split_whitespace().count()
        );
    }
    let genre = model.predict_one(&cleaned);
    tracing::debug!("Predicted '{genre}'");

    let outcome = if args.no_browse {
        None
    } else {
        let catalog = open_catalog(config, &args.options, verbose)?;
        Some(browser_for(config, &args.options).browse(&genre, catalog.as_deref(), None))
    };

    match format {
        OutputFormat::Text => {
            println!("Predicted genre: {genre}");
            if let Some(outcome) = &outcome {
                println!();
                print_outcome(outcome, format)?;
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "genre": genre,
                "browse": outcome.as_ref().map(crate::browser::BrowseOutcome::to_json),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn read_text(text: &str) -> anyhow::Result<String> {
    if text == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read lyrics from stdin")?;
        return Ok(buffer);
    }
    Ok(text.to_string())
}
