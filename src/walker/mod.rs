//! Parallel symlink search engine
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │   SearchCoordinator     │
//!                     │  - root pre-flight      │
//!                     │  - seed + spawn + join  │
//!                     └───────────┬─────────────┘
//!                                 │ seed (root)
//!                                 ▼
//!                     ┌─────────────────────────┐
//!                     │       TaskQueue         │
//!                     │  FIFO + running count   │
//!                     └───────────┬─────────────┘
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 1 │             │  Worker 2 │             │  Worker N │
//! │  readdir  │             │  readdir  │             │  readdir  │
//! │  readlink │             │  readlink │             │  readlink │
//! └─────┬─────┘             └─────┬─────┘             └─────┬─────┘
//!       └──────────── subdirs back to the queue ────────────┘
//!                     matches → MatchSink
//! ```

pub mod coordinator;
pub mod queue;
pub mod worker;

pub use coordinator::{
    run_to_stdout, run_with_writer, search, SearchCoordinator, SearchProgress, SearchResult,
    EXIT_FAILURE, EXIT_SUCCESS,
};
pub use queue::{ScanTask, TaskQueue};
pub use worker::{SearchStats, StatsSnapshot};
