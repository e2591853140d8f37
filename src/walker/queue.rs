//! Shared task queue with cooperative termination detection
//!
//! All workers pull directory tasks from one unbounded FIFO guarded by a
//! single mutex; idle workers sleep on one condition variable. The same lock
//! protects the count of running workers (workers not blocked waiting for
//! work). A second condition variable lets the coordinator wait for the end
//! of the search without stealing wakeups meant for workers.
//!
//! Termination: a worker that finds the queue empty decrements the running
//! count. If the count reaches zero, no worker is processing a task and no
//! task is pending, so no new task can ever appear. That worker marks the
//! queue finished and wakes everyone; every worker then leaves its loop.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A directory awaiting expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTask {
    /// Absolute path of the directory (or the seed path)
    pub path: PathBuf,

    /// Depth from the search root (0 = root)
    pub depth: u32,
}

impl ScanTask {
    /// Create a new scan task
    pub fn new(path: PathBuf, depth: u32) -> Self {
        Self { path, depth }
    }

    /// Create the seed task
    pub fn root(path: PathBuf) -> Self {
        Self { path, depth: 0 }
    }

    /// Task for a child directory of this one
    pub fn child(&self, path: PathBuf) -> Self {
        Self {
            path,
            depth: self.depth + 1,
        }
    }
}

/// Statistics for the task queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total tasks enqueued (seed included)
    pub enqueued: AtomicU64,

    /// Total tasks dequeued
    pub dequeued: AtomicU64,

    /// Number of times a worker went to sleep on an empty queue
    pub idle_waits: AtomicU64,
}

impl QueueStats {
    /// Get queue throughput (dequeued tasks)
    pub fn throughput(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    /// Get idle wait count
    pub fn idle_count(&self) -> u64 {
        self.idle_waits.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct QueueState {
    tasks: VecDeque<ScanTask>,
    members: usize,
    running: usize,
    finished: bool,
}

/// Unbounded FIFO of scan tasks shared by a fixed pool of workers
pub struct TaskQueue {
    state: Mutex<QueueState>,
    available: Condvar,
    done: Condvar,
    stats: QueueStats,
}

impl TaskQueue {
    /// Create an empty queue for `workers` pool members
    ///
    /// Every pool member is counted as running from the start, so the
    /// count must match the number of threads that will call
    /// [`TaskQueue::next_task`]. Threads that never start must be
    /// removed with [`TaskQueue::retire`].
    pub fn new(workers: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                members: workers,
                running: workers,
                finished: workers == 0,
            }),
            available: Condvar::new(),
            done: Condvar::new(),
            stats: QueueStats::default(),
        }
    }

    /// Seed the queue with the root task
    pub fn seed(&self, root: PathBuf) {
        self.push(ScanTask::root(root));
    }

    /// Push a task and wake one waiting worker
    pub fn push(&self, task: ScanTask) {
        let mut state = self.state.lock();
        state.tasks.push_back(task);
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        drop(state);

        self.available.notify_one();
    }

    /// Take the next task, blocking while other workers may still add work
    ///
    /// Returns `None` once the search is globally complete.
    pub fn next_task(&self) -> Option<ScanTask> {
        let mut state = self.state.lock();

        loop {
            if let Some(task) = state.tasks.pop_front() {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                return Some(task);
            }

            if state.finished {
                return None;
            }

            state.running -= 1;
            if state.running == 0 {
                state.finished = true;
                self.wake_all();
                return None;
            }

            self.stats.idle_waits.fetch_add(1, Ordering::Relaxed);
            self.available.wait(&mut state);
            state.running += 1;
        }
    }

    /// Remove a pool member that will never call `next_task` again
    ///
    /// Used for threads that failed to spawn or died mid-task. If the
    /// retired worker was the last running one, pending tasks are handed
    /// to a waiting worker; with no pool members left the search is
    /// declared complete and pending tasks are dropped.
    pub fn retire(&self) {
        let mut state = self.state.lock();
        if state.finished {
            return;
        }

        state.members -= 1;
        state.running -= 1;
        if state.running > 0 {
            return;
        }

        if state.tasks.is_empty() {
            state.finished = true;
            self.wake_all();
        } else if state.members > 0 {
            self.available.notify_one();
        } else {
            tracing::warn!(
                pending = state.tasks.len(),
                "No workers left; pending tasks dropped"
            );
            state.tasks.clear();
            state.finished = true;
            self.wake_all();
        }
    }

    fn wake_all(&self) {
        self.available.notify_all();
        self.done.notify_all();
    }

    /// Block until the search is complete or `timeout` elapses
    ///
    /// Returns true if the search is complete.
    pub fn wait_finished(&self, timeout: Duration) -> bool {
        let mut state = self.state.lock();
        if !state.finished {
            self.done.wait_for(&mut state, timeout);
        }
        state.finished
    }

    /// Check if the search is complete
    pub fn is_finished(&self) -> bool {
        self.state.lock().finished
    }

    /// Current number of pending tasks
    pub fn len(&self) -> usize {
        self.state.lock().tasks.len()
    }

    /// Check if no tasks are pending
    pub fn is_empty(&self) -> bool {
        self.state.lock().tasks.is_empty()
    }

    /// Current number of running (not waiting) workers
    pub fn running(&self) -> usize {
        self.state.lock().running
    }

    /// Get queue statistics
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }
}

/// Guard that retires a worker slot if the worker unwinds
///
/// A worker that panics mid-task would otherwise stay counted as running
/// and the remaining workers would wait forever.
pub struct WorkerSlot<'a> {
    queue: &'a TaskQueue,
}

impl<'a> WorkerSlot<'a> {
    /// Claim a slot for the current worker thread
    pub fn new(queue: &'a TaskQueue) -> Self {
        Self { queue }
    }
}

impl<'a> Drop for WorkerSlot<'a> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.queue.retire();
        }
    }
}
