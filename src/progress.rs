//! Progress reporting for the symlink search
//!
//! Provides a live spinner using indicatif and an end-of-run summary. Both
//! go to stderr so stdout carries nothing but match lines.

use crate::walker::{SearchProgress, SearchResult};
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays search status
pub struct ProgressReporter {
    /// Progress bar
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter drawing on stderr
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &SearchProgress) {
        let msg = format!(
            "Dirs: {} | Links: {} | Matches: {} | Rate: {:.0}/s | Queue: {} | Workers: {}/{}",
            format_number(progress.stats.dirs_scanned),
            format_number(progress.stats.links_checked),
            format_number(progress.stats.matches),
            progress.dirs_per_second(),
            progress.queue_size,
            progress.active_workers,
            progress.total_workers,
        );

        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the search results on stderr
pub fn print_summary(result: &SearchResult) {
    let stats = &result.stats;
    let duration_secs = result.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        stats.dirs_scanned as f64 / duration_secs
    } else {
        0.0
    };

    eprintln!();
    eprintln!("{}", style("Search Complete").green().bold());
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!(
        "  {} {}",
        style("Directories:").bold(),
        format_number(stats.dirs_scanned)
    );
    eprintln!(
        "  {} {}",
        style("Links checked:").bold(),
        format_number(stats.links_checked)
    );
    eprintln!(
        "  {} {}",
        style("Matches:").bold(),
        format_number(stats.matches)
    );
    eprintln!(
        "  {} {:.1}s ({:.0} dirs/sec, {} workers)",
        style("Duration:").bold(),
        duration_secs,
        rate,
        result.workers
    );
    if stats.errors > 0 {
        eprintln!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(stats.errors)
        );
    }
    eprintln!();
}

/// Print a header at the start of the search on stderr
pub fn print_header(target: &str, root: &str, workers: usize) {
    eprintln!();
    eprintln!(
        "{} {}",
        style("symlink-walker").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Target:").bold(), target);
    eprintln!("  {} {}", style("Search:").bold(), root);
    eprintln!("  {} {}", style("Workers:").bold(), workers);
    eprintln!();
}
