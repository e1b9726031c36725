use crate::cli::OutputFormat;
use crate::core::config::AppConfig;
use crate::model::artifacts::ArtifactStatus;

/// Execute status subcommand
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(config: &AppConfig, format: OutputFormat) -> anyhow::Result<()> {
    let status = ArtifactStatus::check(config);

    match format {
        OutputFormat::Text => print_text_status(&status)?,
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status.to_json())?),
    }

    Ok(())
}

fn mark(present: bool) -> &'static str {
    if present {
        "✅"
    } else {
        "❌"
    }
}

fn print_text_status(status: &ArtifactStatus) -> anyhow::Result<()> {
    println!("Artifacts status");
    println!("{}", "=".repeat(60));
    println!(
        "- Pipeline: {} {}",
        mark(status.model_present),
        status.model_path.display()
    );
    println!(
        "- Metadata: {} {}",
        mark(status.metadata_present),
        status.metadata_path.display()
    );
    println!();

    match &status.metadata {
        Some(meta) => println!("{}", serde_json::to_string_pretty(meta)?),
        None => println!(
            "No metadata found. It will be created when you run the training cell in the notebook."
        ),
    }
    Ok(())
}
