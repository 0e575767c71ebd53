use anyhow::{Context, Result};
use cli::Cli;
use config::Configuration;
use indicatif::{ProgressBar, ProgressStyle};
use sinks::pdf::SystemFonts;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod book;
mod cli;
mod config;
mod document;
mod error;
mod image_header;
mod language;
mod sinks;
mod source;

fn main() -> ExitCode {
    if let Err(e) = try_main() {
        eprintln!("{}: {e:#}", console::style("Error").red());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    use clap::Parser;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Configuration::discover(&cli.directory, cli.config.as_deref())?;
    let options = config.build_options(&cli)?;
    let pdf = config.pdf(&cli);
    let fonts = SystemFonts::new(pdf.font.clone());

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .with_context(|| "Failed to parse progress style")?
            .progress_chars("#>-"),
    );
    let report = book::build(&options, pdf, &fonts, &progress);
    progress.finish_and_clear();
    let report = report?;

    println!("Found {} chapters:", report.chapter_files.len());
    for file in &report.chapter_files {
        println!("  {file}");
    }
    if report.front_matter {
        println!("  (with {})", source::FRONT_MATTER_FILE);
    }
    println!();
    for output in &report.outputs {
        println!("  Created: {}", output.display());
    }

    Ok(())
}

/// Route `log` records through a `tracing` subscriber on stderr.
///
/// `RUST_LOG` wins over the verbosity flags when set.
fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
