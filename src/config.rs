//! Configuration types for symlink-walker
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - Resolution of the TARGET and SEARCH_DIR arguments

use crate::classify::lexical_normalize;
use crate::error::ConfigError;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum reasonable worker count
pub const MAX_WORKERS: usize = 512;

/// Search symbolic links that point to the target
#[derive(Parser, Debug, Clone)]
#[command(
    name = "symlink-walker",
    version,
    about = "Search symbolic links that point to the target",
    long_about = "Walks SEARCH_DIR with a pool of worker threads and prints every symbolic link \
                  whose target resolves to TARGET, one path per line.\n\n\
                  By default only the first matching link of each directory is reported \
                  and the rest of that directory is skipped; use --all to report every match.",
    after_help = "EXAMPLES:\n    \
        symlink-walker /usr/lib/libfoo.so.1 /usr\n    \
        symlink-walker ./build/out /srv/www --all\n    \
        symlink-walker /opt/app/current / -w 32 -p"
)]
pub struct CliArgs {
    /// Target of links
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Directory to search
    #[arg(value_name = "SEARCH_DIR")]
    pub search_dir: PathBuf,

    /// Number of worker threads
    #[arg(
        short = 'w',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Maximum directory depth to list (unlimited if not set)
    #[arg(short = 'd', long, value_name = "NUM")]
    pub max_depth: Option<u32>,

    /// Report every matching link in a directory, not just the first
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Show a progress spinner and a summary on stderr
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Quiet mode - only log errors (denied or vanished entries are not reported)
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

fn default_workers() -> usize {
    num_cpus::get().clamp(1, MAX_WORKERS)
}

/// What a worker does after finding a match in a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Report the first match and skip the rest of the directory
    #[default]
    FirstPerDirectory,
    /// Report every match and keep listing
    All,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Canonical path links are compared against
    pub target: PathBuf,

    /// Absolute path of the tree to search
    pub root: PathBuf,

    /// Number of worker threads
    pub worker_count: usize,

    /// Deepest directory level to list (root = 0)
    pub max_depth: Option<u32>,

    /// First-match or report-all
    pub match_policy: MatchPolicy,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,

    /// Errors-only logging
    pub quiet: bool,
}

impl SearchConfig {
    /// Configuration for already-resolved paths with default settings
    pub fn new(target: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            root: root.into(),
            worker_count: default_workers(),
            max_depth: None,
            match_policy: MatchPolicy::default(),
            show_progress: false,
            verbose: false,
            quiet: false,
        }
    }

    /// Set the worker pool size
    pub fn with_workers(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Set the depth limit
    pub fn with_max_depth(mut self, depth: Option<u32>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the per-directory match policy
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let target = resolve_target(&args.target)?;
        let root = resolve_search_dir(&args.search_dir)?;

        let match_policy = if args.all {
            MatchPolicy::All
        } else {
            MatchPolicy::FirstPerDirectory
        };

        let config = Self {
            target,
            root,
            worker_count: args.workers,
            max_depth: args.max_depth,
            match_policy,
            show_progress: args.progress,
            verbose: args.verbose,
            quiet: args.quiet,
        };
        config.validate()?;

        Ok(config)
    }

    /// Check the settings that do not depend on the filesystem
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 || self.worker_count > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: self.worker_count,
                max: MAX_WORKERS,
            });
        }
        Ok(())
    }
}

/// Resolve TARGET to a canonical path
///
/// Every component, including a final symlink, is resolved, so links are
/// compared against the real location of the target.
pub fn resolve_target(path: &Path) -> Result<PathBuf, ConfigError> {
    fs::canonicalize(path).map_err(|source| ConfigError::TargetUnreachable {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve SEARCH_DIR to an absolute path with canonical ancestors
///
/// The path is made absolute and folded lexically, then its parent is
/// canonicalized so relative link values inside the tree resolve against
/// real locations. The last component is not followed: a SEARCH_DIR that is
/// itself a link is examined as a link. Existence is checked later by the
/// search, so a parent that cannot be resolved leaves the lexical path.
pub fn resolve_search_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let abs = std::path::absolute(path)
        .map(|abs| lexical_normalize(&abs))
        .map_err(|source| ConfigError::InvalidSearchDir {
            path: path.to_path_buf(),
            source,
        })?;

    match (abs.parent(), abs.file_name()) {
        (Some(parent), Some(name)) => match fs::canonicalize(parent) {
            Ok(real) => Ok(real.join(name)),
            Err(_) => Ok(abs),
        },
        _ => Ok(abs),
    }
}
