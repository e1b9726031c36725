use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::browse::{browser_for, open_catalog, print_outcome};
use crate::cli::{CatalogOptions, OutputFormat};
use crate::core::config::AppConfig;
use crate::model::artifacts::ModelCache;
use crate::model::batch::{predict_batch, BatchPredictions, PREVIEW_ROWS};
use crate::parsing::csv::{read_csv_file, to_csv_string};

#[derive(Args)]
pub struct BatchArgs {
    /// Input CSV (optionally gzip-compressed) with one lyrics text per row
    #[arg(required = true)]
    pub input: PathBuf,

    /// Column holding the lyrics (default: 'Lyrics', else the first column)
    #[arg(long)]
    pub text_column: Option<String>,

    /// Where to write the predictions CSV
    #[arg(short, long, default_value = "predictions.csv")]
    pub output: PathBuf,

    /// After predicting, list catalog songs of this genre
    #[arg(long)]
    pub browse: Option<String>,

    #[command(flatten)]
    pub options: CatalogOptions,
}

/// Execute batch subcommand
///
/// # Errors
///
/// Returns an error if the input cannot be read, the text column does not
/// exist, the model is missing, or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: BatchArgs,
    config: &AppConfig,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let table = read_csv_file(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    if verbose {
        eprintln!(
            "Read {} rows with columns: {}",
            table.len(),
            table.columns().join(", ")
        );
    }

    let model = ModelCache::new()
        .get_or_load(&config.model_path())
        .context("Cannot predict without a trained model")?;

    let predictions = predict_batch(model.as_ref(), table, args.text_column.as_deref())?;
    predictions
        .write_to(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let outcome = match &args.browse {
        Some(genre) => {
            if !predictions.contains_genre(genre) {
                tracing::warn!("Genre '{genre}' was not predicted for any row");
            }
            let catalog = open_catalog(config, &args.options, verbose)?;
            Some(browser_for(config, &args.options).browse(genre, catalog.as_deref(), None))
        }
        None => None,
    };

    match format {
        OutputFormat::Text => {
            print_text_summary(&predictions, &args)?;
            if let Some(outcome) = &outcome {
                println!();
                print_outcome(outcome, format)?;
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "rows": predictions.table.len(),
                "text_column": predictions.text_column,
                "genres": predictions.genres,
                "output": args.output.display().to_string(),
                "browse": outcome.as_ref().map(crate::browser::BrowseOutcome::to_json),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn print_text_summary(predictions: &BatchPredictions, args: &BatchArgs) -> anyhow::Result<()> {
    let rows = predictions.table.len();
    println!(
        "Predicted {rows} rows from column '{}'",
        predictions.text_column
    );
    println!("Wrote {}", args.output.display());
    println!();

    if rows > PREVIEW_ROWS {
        println!("Preview (first {PREVIEW_ROWS} of {rows} rows):");
    } else {
        println!("Preview:");
    }
    print!("{}", to_csv_string(&predictions.preview())?);
    println!();

    println!("Predicted genres: {}", predictions.genres.join(", "));
    if args.browse.is_none() && !predictions.genres.is_empty() {
        println!("Use --browse <GENRE> to list catalog songs of one of these genres.");
    }
    Ok(())
}
