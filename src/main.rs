//! symlink-walker - Parallel Symlink Reference Finder
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::process::ExitCode;
use symlink_walker::config::{CliArgs, SearchConfig};
use symlink_walker::output::MatchWriter;
use symlink_walker::progress::{print_header, print_summary, ProgressReporter};
use symlink_walker::walker::{run_with_writer, SearchCoordinator};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Parse CLI arguments
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    // Setup logging
    setup_logging(args.verbose, args.quiet)?;

    // Resolve paths and validate options
    let config = SearchConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(
            &config.target.display().to_string(),
            &config.root.display().to_string(),
            config.worker_count,
        );
    }

    let show_progress = config.show_progress;
    let mut coordinator = SearchCoordinator::new(config)?;

    if show_progress {
        let reporter = ProgressReporter::new();
        reporter.set_status("Searching...");
        coordinator = coordinator.with_progress(reporter);
    }

    let writer = MatchWriter::stdout().context("Failed to start match writer")?;

    // Run the search
    let result = run_with_writer(coordinator, writer)?;

    if show_progress {
        print_summary(&result);
    }

    if result.stats.errors > 0 {
        info!(errors = result.stats.errors, "Search completed with errors");
    }

    Ok(())
}

fn setup_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("symlink_walker=debug,warn")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::new("symlink_walker=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Failed to initialize logging")?;

    Ok(())
}
