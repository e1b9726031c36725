use std::sync::Arc;

use anyhow::Context;
use clap::Args;

use crate::audio::{AudioPresentation, AudioResolver};
use crate::browser::{BrowseOutcome, GenreBrowser};
use crate::catalog::loader::{CatalogCache, CatalogLoader};
use crate::cli::{CatalogOptions, OutputFormat};
use crate::core::catalog::Catalog;
use crate::core::config::AppConfig;
use crate::parsing::csv::read_csv_file;

#[derive(Args)]
pub struct BrowseArgs {
    /// Genre label to list (exact, case-sensitive)
    #[arg(required = true)]
    pub genre: String,

    #[command(flatten)]
    pub options: CatalogOptions,
}

/// Execute browse subcommand
///
/// # Errors
///
/// Returns an error if a catalog passed with `--catalog` cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: BrowseArgs,
    config: &AppConfig,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let catalog = open_catalog(config, &args.options, verbose)?;
    let outcome = browser_for(config, &args.options).browse(&args.genre, catalog.as_deref(), None);
    print_outcome(&outcome, format)?;
    Ok(())
}

/// Resolve the catalog for a command: `--catalog` overrides the data directory
///
/// # Errors
///
/// Returns an error if the `--catalog` file cannot be parsed. Problems with
/// the data-directory sources are only logged.
pub fn open_catalog(
    config: &AppConfig,
    options: &CatalogOptions,
    verbose: bool,
) -> anyhow::Result<Option<Arc<Catalog>>> {
    let cache = CatalogCache::new();
    if let Some(path) = &options.catalog {
        let catalog = read_csv_file(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        cache.set_upload(catalog);
    }

    let catalog = cache.current(&CatalogLoader::from_config(config));
    if verbose {
        match &catalog {
            Some(c) => eprintln!("Catalog: {} songs, {} columns", c.len(), c.columns().len()),
            None => eprintln!("Catalog: none found in {}", config.data_dir.display()),
        }
    }
    Ok(catalog)
}

/// Genre browser configured from command options
#[must_use]
pub fn browser_for(config: &AppConfig, options: &CatalogOptions) -> GenreBrowser {
    let config = if options.no_search_links {
        config.clone().without_search_links()
    } else {
        config.clone()
    };
    GenreBrowser::new(AudioResolver::from_config(&config)).with_limit(options.limit)
}

/// Print a browse outcome in the requested format
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print_outcome(outcome: &BrowseOutcome, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print_text_outcome(outcome),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
        }
    }
    Ok(())
}

fn print_text_outcome(outcome: &BrowseOutcome) {
    println!("Songs in predicted genre: {}", outcome.genre());
    println!("{}", "=".repeat(60));

    let listing = match outcome {
        BrowseOutcome::Listing(listing) => listing,
        BrowseOutcome::NoCatalog { .. } => {
            println!("{}", outcome.message().unwrap_or_default());
            println!("Pass --catalog <CSV> to browse your own song list.");
            return;
        }
        BrowseOutcome::NoGenreColumn { columns, .. } => {
            println!("Error: {}", outcome.message().unwrap_or_default());
            println!("Catalog columns: {}", columns.join(", "));
            return;
        }
        BrowseOutcome::NoMatches { .. } => {
            println!("Warning: {}", outcome.message().unwrap_or_default());
            return;
        }
    };

    println!(
        "Showing up to {} of {} songs\n",
        listing.limit, listing.total
    );

    for item in &listing.items {
        println!("{}", item.audio.caption);
        if let Some(notice) = &item.audio.notice {
            println!("  Note: {notice}");
        }
        match &item.audio.presentation {
            AudioPresentation::InlineBytes { data, path } => {
                println!("  Audio: {} ({} bytes)", path.display(), data.len());
            }
            AudioPresentation::RemoteUrl(url) => println!("  Audio: {url}"),
            AudioPresentation::SearchFallback { url, .. } => {
                if item.audio.notice.is_some() {
                    println!("  Open in search: {url}");
                } else {
                    println!("  No audio URL available. Try: {url}");
                }
            }
            AudioPresentation::Unavailable => println!("  No audio available."),
        }
        println!("{}", "-".repeat(60));
    }
}
