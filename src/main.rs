//! Main entry point for the retryzip CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use retryzip::{Cli, Extractor, Retry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Only initialize logging if verbose or RUST_LOG is set
    if cli.verbose || std::env::var("RUST_LOG").is_ok() {
        let directive = if cli.verbose { "retryzip=debug" } else { "retryzip=warn" };
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
            .with_writer(std::io::stderr)
            .init();
    }

    let destination = cli.destination();
    let extractor = Extractor::with_retry(Retry::new(cli.retry_policy()));
    let stats = extractor.extract(&cli.file, &destination)?;

    if !cli.is_quiet() {
        println!(
            "Extracted {} files ({}) and {} directories into {}",
            stats.files,
            format_size(stats.bytes),
            stats.directories,
            destination.display()
        );
    }

    Ok(())
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
