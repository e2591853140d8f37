//! Search coordinator - orchestrates the parallel symlink search
//!
//! The coordinator is responsible for:
//! - Checking the search root before any worker starts
//! - Seeding the task queue and spawning the worker pool
//! - Progress reporting while the workers run
//! - Joining the workers and collecting final statistics

use crate::config::SearchConfig;
use crate::error::{Result, SearchError, WorkerError};
use crate::output::{MatchSink, MatchWriter};
use crate::progress::ProgressReporter;
use crate::walker::queue::TaskQueue;
use crate::walker::worker::{SearchContext, SearchStats, StatsSnapshot, Worker};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Exit code for a completed search
pub const EXIT_SUCCESS: u8 = 0;

/// Exit code for a search that could not run
pub const EXIT_FAILURE: u8 = 1;

/// How often the progress display is refreshed
const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Result of a completed search
#[derive(Debug)]
pub struct SearchResult {
    /// Final counters
    pub stats: StatsSnapshot,

    /// Number of workers that ran
    pub workers: usize,

    /// Time taken for the search
    pub duration: Duration,
}

impl SearchResult {
    /// Number of matches emitted
    pub fn matches(&self) -> u64 {
        self.stats.matches
    }
}

/// Progress information for display
#[derive(Debug, Clone)]
pub struct SearchProgress {
    /// Counters so far
    pub stats: StatsSnapshot,

    /// Current queue length
    pub queue_size: usize,

    /// Workers not waiting for work
    pub active_workers: usize,

    /// Total workers
    pub total_workers: usize,

    /// Elapsed time
    pub elapsed: Duration,
}

impl SearchProgress {
    /// Directories listed per second
    pub fn dirs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.stats.dirs_scanned as f64 / secs
        } else {
            0.0
        }
    }
}

/// Coordinates one parallel symlink search
pub struct SearchCoordinator {
    /// Configuration
    config: SearchConfig,

    /// Shared task queue
    queue: Arc<TaskQueue>,

    /// Shared counters
    stats: Arc<SearchStats>,

    /// Worker threads
    workers: Vec<Worker>,

    /// Optional progress display
    reporter: Option<ProgressReporter>,
}

impl SearchCoordinator {
    /// Create a new search coordinator
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;

        let queue = Arc::new(TaskQueue::new(config.worker_count));

        Ok(Self {
            config,
            queue,
            stats: Arc::new(SearchStats::default()),
            workers: Vec::new(),
            reporter: None,
        })
    }

    /// Show a progress spinner while the search runs
    pub fn with_progress(mut self, reporter: ProgressReporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Run the search, sending every match to `sink`
    pub fn run(mut self, sink: Arc<dyn MatchSink>) -> Result<SearchResult> {
        // The only early exit: nothing has started yet. A root link must
        // lead somewhere.
        if fs::metadata(&self.config.root).is_err() {
            return Err(SearchError::RootNotFound(self.config.root.clone()));
        }

        let start_time = Instant::now();

        info!(
            target = %self.config.target.display(),
            root = %self.config.root.display(),
            workers = self.config.worker_count,
            "Starting symlink search"
        );

        let ctx = Arc::new(SearchContext {
            target: Arc::from(self.config.target.as_path()),
            policy: self.config.match_policy,
            max_depth: self.config.max_depth,
            sink,
            stats: Arc::clone(&self.stats),
        });

        self.queue.seed(self.config.root.clone());

        self.spawn_workers(&ctx)?;

        self.wait_for_completion(start_time);

        self.join_workers();

        let duration = start_time.elapsed();
        let stats = self.stats.snapshot();

        if let Some(ref p) = self.reporter {
            p.finish(&format!("Search completed: {} matches", stats.matches));
        }

        info!(
            dirs = stats.dirs_scanned,
            links = stats.links_checked,
            matches = stats.matches,
            errors = stats.errors,
            idle_waits = self.queue.stats().idle_count(),
            duration_ms = duration.as_millis() as u64,
            "Search completed"
        );

        Ok(SearchResult {
            stats,
            workers: self.config.worker_count,
            duration,
        })
    }

    /// Spawn worker threads
    ///
    /// Workers that fail to start give their slot back to the queue so
    /// the others can still detect termination.
    fn spawn_workers(&mut self, ctx: &Arc<SearchContext>) -> Result<()> {
        for id in 0..self.config.worker_count {
            match Worker::spawn(id, Arc::clone(&self.queue), Arc::clone(ctx)) {
                Ok(worker) => self.workers.push(worker),
                Err(e) => {
                    warn!(error = %e, "Worker failed to start");
                    self.queue.retire();
                }
            }
        }

        if self.workers.is_empty() {
            return Err(WorkerError::NoWorkers.into());
        }

        debug!(count = self.workers.len(), "Workers spawned");
        Ok(())
    }

    /// Wait for the queue to report global completion
    fn wait_for_completion(&self, start_time: Instant) {
        while !self.queue.wait_finished(PROGRESS_INTERVAL) {
            if let Some(ref p) = self.reporter {
                p.update(&self.progress(start_time.elapsed()));
            }
        }
    }

    /// Join all worker threads
    fn join_workers(&mut self) {
        for worker in std::mem::take(&mut self.workers) {
            if let Err(e) = worker.join() {
                warn!(error = %e, "Worker failed to join cleanly");
            }
        }
    }

    /// Snapshot of the running search
    pub fn progress(&self, elapsed: Duration) -> SearchProgress {
        SearchProgress {
            stats: self.stats.snapshot(),
            queue_size: self.queue.len(),
            active_workers: self.queue.running(),
            total_workers: self.config.worker_count,
            elapsed,
        }
    }
}

/// Search `root` for links to `target`, printing matches on stdout
///
/// Both paths must already be absolute; `target` canonical. Uses one worker
/// per available CPU. Returns the process exit code.
pub fn search(target: &Path, root: &Path) -> u8 {
    let config = SearchConfig::new(target, root);

    match run_to_stdout(config) {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}

/// Run a search with matches written to stdout by a dedicated writer thread
pub fn run_to_stdout(config: SearchConfig) -> Result<SearchResult> {
    let coordinator = SearchCoordinator::new(config)?;
    run_with_writer(coordinator, MatchWriter::stdout()?)
}

/// Run a coordinator against a writer, flushing it when done
pub fn run_with_writer(coordinator: SearchCoordinator, writer: MatchWriter) -> Result<SearchResult> {
    let result = coordinator.run(Arc::new(writer.handle()));
    // Drain and flush even if the search failed
    let written = writer.finish()?;
    let result = result?;

    debug!(written, "Match output flushed");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_progress_rates() {
        let progress = SearchProgress {
            stats: StatsSnapshot {
                dirs_scanned: 1000,
                ..Default::default()
            },
            queue_size: 500,
            active_workers: 4,
            total_workers: 8,
            elapsed: Duration::from_secs(10),
        };

        assert!((progress.dirs_per_second() - 100.0).abs() < 0.1);
    }

    #[test]
    fn test_missing_root_fails_before_start() {
        let config = SearchConfig::new(Path::new("/target"), Path::new("/no/such/root/anywhere"));
        let coordinator = SearchCoordinator::new(config).unwrap();
        let collector = Arc::new(crate::output::MatchCollector::new());

        let err = coordinator.run(collector.clone()).unwrap_err();
        assert!(matches!(err, SearchError::RootNotFound(_)));
        assert!(collector.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_root_link_fails_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        std::os::unix::fs::symlink(dir.path().join("gone"), &root).unwrap();

        let config = SearchConfig::new(Path::new("/target"), &root);
        let err = SearchCoordinator::new(config)
            .unwrap()
            .run(Arc::new(crate::output::MatchCollector::new()))
            .unwrap_err();
        assert!(matches!(err, SearchError::RootNotFound(_)));
        assert_eq!(search(Path::new("/target"), &root), EXIT_FAILURE);
    }

    #[test]
    fn test_search_exit_code_missing_root() {
        assert_eq!(
            search(Path::new("/target"), Path::new("/no/such/root/anywhere")),
            EXIT_FAILURE
        );
    }
}
