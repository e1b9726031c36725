use clap::Parser;
use tracing_subscriber::EnvFilter;

mod audio;
mod browser;
mod catalog;
mod cli;
mod core;
mod model;
mod parsing;
mod utils;
mod web;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("lyrics_genre=debug,info")
    } else {
        EnvFilter::new("lyrics_genre=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let config = cli.config();

    match cli.command {
        cli::Commands::Predict(args) => {
            cli::predict::run(args, &config, cli.format, cli.verbose)?;
        }
        cli::Commands::Batch(args) => {
            cli::batch::run(args, &config, cli.format, cli.verbose)?;
        }
        cli::Commands::Browse(args) => {
            cli::browse::run(args, &config, cli.format, cli.verbose)?;
        }
        cli::Commands::Status => {
            cli::status::run(&config, cli.format)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args, config)?;
        }
    }

    Ok(())
}
