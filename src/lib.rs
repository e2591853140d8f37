//! symlink-walker - Parallel Symlink Reference Finder
//!
//! Searches a directory tree for every symbolic link whose target resolves
//! to a given path. Useful for auditing link farms, package installations
//! and build outputs before moving or deleting something that may still be
//! referenced.
//!
//! # Features
//!
//! - **Parallel Scanning**: A fixed pool of worker threads, one per CPU by
//!   default, shares a single queue of directories to list.
//!
//! - **No Coordinator Polling**: Workers detect the end of the search
//!   themselves: it is over when the queue is empty and no worker is
//!   running.
//!
//! - **Fault Isolated**: Unreadable directories, broken links and entries
//!   that vanish mid-scan are reported on stderr and skipped.
//!
//! - **Line Output**: Matches are written one per line on stdout by a single
//!   writer thread, ready for `xargs`, `grep` and friends.
//!
//! # Example
//!
//! ```bash
//! # Who links to this library?
//! symlink-walker /usr/lib/libfoo.so.1 /usr
//!
//! # Every match, not only the first per directory, with progress
//! symlink-walker /opt/app/releases/42 /srv --all -p
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod output;
pub mod progress;
pub mod walker;

pub use classify::{classify, EntryKind};
pub use config::{CliArgs, MatchPolicy, SearchConfig};
pub use error::{Result, SearchError};
pub use output::{MatchCollector, MatchSink, MatchWriter};
pub use walker::{search, SearchCoordinator, SearchResult};
