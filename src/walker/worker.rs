//! Worker thread logic for the parallel symlink search
//!
//! Each worker:
//! - Pulls scan tasks from the shared task queue
//! - Lists the directory's immediate entries
//! - Compares every symlink's resolved target with the search target
//! - Pushes subdirectories back to the queue
//!
//! Filesystem errors are scoped to the entry that raised them: they are
//! logged, counted and the worker moves on.

use crate::classify::{classify, classify_entry, is_pseudo_entry, EntryKind};
use crate::config::MatchPolicy;
use crate::error::{ScanError, ScanOutcome, WorkerError};
use crate::output::MatchSink;
use crate::walker::queue::{ScanTask, TaskQueue, WorkerSlot};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace, warn};

/// Counters shared by every worker of one search
#[derive(Debug, Default)]
pub struct SearchStats {
    /// Directories listed
    pub dirs_scanned: AtomicU64,

    /// Symlinks resolved and compared
    pub links_checked: AtomicU64,

    /// Matches emitted
    pub matches: AtomicU64,

    /// Per-entry errors
    pub errors: AtomicU64,

    /// Entries left unexplored (depth limit, non-directory seed)
    pub skipped: AtomicU64,
}

impl SearchStats {
    fn record_dir(&self) {
        self.dirs_scanned.fetch_add(1, Ordering::Relaxed);
    }

    fn record_link(&self) {
        self.links_checked.fetch_add(1, Ordering::Relaxed);
    }

    fn record_match(&self) {
        self.matches.fetch_add(1, Ordering::Relaxed);
    }

    fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a plain-value copy of the counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            dirs_scanned: self.dirs_scanned.load(Ordering::Relaxed),
            links_checked: self.links_checked.load(Ordering::Relaxed),
            matches: self.matches.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SearchStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub dirs_scanned: u64,
    pub links_checked: u64,
    pub matches: u64,
    pub errors: u64,
    pub skipped: u64,
}

/// Read-only state every worker needs to process a task
pub struct SearchContext {
    /// Canonical path links are compared against
    pub target: Arc<Path>,

    /// What to do after the first match in a directory
    pub policy: MatchPolicy,

    /// Deepest directory level to list (root = 0)
    pub max_depth: Option<u32>,

    /// Where matches go
    pub sink: Arc<dyn MatchSink>,

    /// Shared counters
    pub stats: Arc<SearchStats>,
}

impl SearchContext {
    fn is_target(&self, resolved: &Path) -> bool {
        resolved == &*self.target
    }

    fn emit(&self, worker_id: usize, path: &Path) {
        self.stats.record_match();
        if let Err(e) = self.sink.emit(path) {
            error!(worker = worker_id, path = %path.display(), error = %e, "Failed to emit match");
        }
    }

    fn report(&self, worker_id: usize, error: &ScanError) {
        self.stats.record_error();
        if error.is_expected() {
            warn!(worker = worker_id, "{}", error);
        } else {
            error!(worker = worker_id, "{}", error);
        }
    }
}

/// A worker thread that processes scan tasks
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        queue: Arc<TaskQueue>,
        ctx: Arc<SearchContext>,
    ) -> Result<Self, WorkerError> {
        let handle = thread::Builder::new()
            .name(format!("walker-{}", id))
            .spawn(move || worker_loop(id, &queue, &ctx))
            .map_err(|e| WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| WorkerError::Panicked {
                id: self.id,
                message: "Worker thread panicked".into(),
            }),
            None => Ok(()),
        }
    }
}

/// Main worker loop: runs until the queue reports global completion
pub fn worker_loop(id: usize, queue: &TaskQueue, ctx: &SearchContext) {
    debug!(worker = id, "Worker starting");
    let _slot = WorkerSlot::new(queue);

    let mut tasks = 0u64;
    while let Some(task) = queue.next_task() {
        tasks += 1;

        let outcome = process_task(id, &task, queue, ctx);
        match &outcome {
            ScanOutcome::Scanned {
                entries, matches, ..
            } => {
                trace!(worker = id, path = %task.path.display(), entries, matches, "Directory scanned");
            }
            ScanOutcome::Matched { path } => {
                trace!(worker = id, path = %path.display(), "Search root matched");
            }
            ScanOutcome::Skipped { path, reason } => {
                debug!(worker = id, path = %path.display(), reason = %reason, "Task skipped");
            }
            ScanOutcome::Failed { error, .. } => {
                ctx.report(id, error);
            }
        }
    }

    debug!(worker = id, tasks, "Worker shutting down");
}

/// Process one scan task
pub fn process_task(
    worker_id: usize,
    task: &ScanTask,
    queue: &TaskQueue,
    ctx: &SearchContext,
) -> ScanOutcome {
    let kind = match classify(&task.path) {
        Ok(kind) => kind,
        Err(error) => {
            return ScanOutcome::Failed {
                path: task.path.clone(),
                error,
            }
        }
    };

    match kind {
        EntryKind::Directory => scan_directory(worker_id, task, queue, ctx),
        EntryKind::Symlink(resolved) => {
            ctx.stats.record_link();
            if ctx.is_target(&resolved) {
                ctx.emit(worker_id, &task.path);
                return ScanOutcome::Matched {
                    path: task.path.clone(),
                };
            }

            // A seed named through a link is searched at its real location
            match fs::canonicalize(&task.path) {
                Ok(real) if real.is_dir() => {
                    debug!(worker = worker_id, link = %task.path.display(), path = %real.display(), "Following seed link");
                    scan_directory(worker_id, &ScanTask::new(real, task.depth), queue, ctx)
                }
                _ => {
                    ctx.stats.record_skip();
                    ScanOutcome::Skipped {
                        path: task.path.clone(),
                        reason: "Link does not point at the target or a directory".into(),
                    }
                }
            }
        }
        EntryKind::Other => {
            ctx.stats.record_skip();
            ScanOutcome::Skipped {
                path: task.path.clone(),
                reason: "Not a directory".into(),
            }
        }
    }
}

/// List one directory, checking links and queueing subdirectories
fn scan_directory(
    worker_id: usize,
    task: &ScanTask,
    queue: &TaskQueue,
    ctx: &SearchContext,
) -> ScanOutcome {
    let listing = match fs::read_dir(&task.path) {
        Ok(listing) => listing,
        Err(source) => {
            return ScanOutcome::Failed {
                path: task.path.clone(),
                error: ScanError::ReadDir {
                    path: task.path.clone(),
                    source,
                },
            }
        }
    };

    ctx.stats.record_dir();

    let descend = ctx
        .max_depth
        .map(|max| task.depth < max)
        .unwrap_or(true);

    let mut entries = 0;
    let mut subdirs = 0;
    let mut matches = 0;

    for entry in listing {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                ctx.report(
                    worker_id,
                    &ScanError::ReadEntry {
                        dir: task.path.clone(),
                        source,
                    },
                );
                continue;
            }
        };

        if is_pseudo_entry(&entry.file_name()) {
            continue;
        }
        entries += 1;

        match classify_entry(&entry) {
            Ok(EntryKind::Symlink(resolved)) => {
                ctx.stats.record_link();
                if ctx.is_target(&resolved) {
                    matches += 1;
                    ctx.emit(worker_id, &entry.path());
                    if ctx.policy == MatchPolicy::FirstPerDirectory {
                        break;
                    }
                }
            }
            Ok(EntryKind::Directory) => {
                if descend {
                    subdirs += 1;
                    queue.push(task.child(entry.path()));
                } else {
                    ctx.stats.record_skip();
                }
            }
            Ok(EntryKind::Other) => {}
            Err(error) => ctx.report(worker_id, &error),
        }
    }

    ScanOutcome::Scanned {
        path: task.path.clone(),
        entries,
        subdirs,
        matches,
    }
}
