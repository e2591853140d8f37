//! Match output
//!
//! Workers hand every match to a [`MatchSink`]. The CLI uses a
//! [`MatchWriter`]: a dedicated thread that owns the output stream and
//! receives paths over a bounded channel, so lines from different workers
//! never interleave. Library callers and tests can use a
//! [`MatchCollector`] instead.

use crate::error::{Result, SearchError};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Destination for matching symlink paths
pub trait MatchSink: Send + Sync {
    /// Record one match
    fn emit(&self, path: &Path) -> Result<()>;
}

/// Statistics for the match writer
#[derive(Debug, Default)]
pub struct WriterStats {
    /// Lines written to the output stream
    pub lines_written: AtomicU64,
}

impl WriterStats {
    /// Get number of lines written
    pub fn lines_written(&self) -> u64 {
        self.lines_written.load(Ordering::Relaxed)
    }
}

/// Writes matches, one per line, from a dedicated thread
pub struct MatchWriter {
    /// Sender kept until `finish` so the writer stays alive
    sender: Option<Sender<PathBuf>>,

    /// Writer thread
    handle: Option<JoinHandle<io::Result<()>>>,

    /// Writer statistics
    stats: Arc<WriterStats>,
}

impl MatchWriter {
    /// Start a writer thread for `out`
    pub fn new<W>(out: W, channel_size: usize) -> Result<Self>
    where
        W: Write + Send + 'static,
    {
        let (sender, receiver) = bounded(channel_size);
        let stats = Arc::new(WriterStats::default());
        let stats_clone = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name("match-writer".into())
            .spawn(move || writer_loop(out, receiver, stats_clone))?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
            stats,
        })
    }

    /// Writer over the process's standard output
    pub fn stdout() -> Result<Self> {
        Self::new(io::stdout(), 1024)
    }

    /// Get a handle for workers to send matches through
    pub fn handle(&self) -> MatchHandle {
        MatchHandle {
            sender: self.sender.clone(),
        }
    }

    /// Get writer statistics
    pub fn stats(&self) -> Arc<WriterStats> {
        Arc::clone(&self.stats)
    }

    /// Close the channel, drain remaining matches and flush
    ///
    /// Every [`MatchHandle`] must be dropped first or this blocks.
    pub fn finish(mut self) -> Result<u64> {
        drop(self.sender.take());

        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| SearchError::OutputClosed)??;
        }

        Ok(self.stats.lines_written())
    }
}

fn writer_loop<W: Write>(
    out: W,
    receiver: Receiver<PathBuf>,
    stats: Arc<WriterStats>,
) -> io::Result<()> {
    let mut out = BufWriter::new(out);

    while let Ok(path) = receiver.recv() {
        write_line(&mut out, &path)?;
        stats.lines_written.fetch_add(1, Ordering::Relaxed);

        // Flush whenever the backlog is drained so line-oriented readers
        // see matches while the search is still running
        if receiver.is_empty() {
            out.flush()?;
        }
    }

    out.flush()?;
    debug!(lines = stats.lines_written(), "Match writer finished");
    Ok(())
}

#[cfg(unix)]
fn write_line<W: Write>(out: &mut W, path: &Path) -> io::Result<()> {
    use std::os::unix::ffi::OsStrExt;

    out.write_all(path.as_os_str().as_bytes())?;
    out.write_all(b"\n")
}

#[cfg(not(unix))]
fn write_line<W: Write>(out: &mut W, path: &Path) -> io::Result<()> {
    writeln!(out, "{}", path.display())
}

/// Cloneable handle feeding a [`MatchWriter`]
#[derive(Clone)]
pub struct MatchHandle {
    sender: Option<Sender<PathBuf>>,
}

impl MatchSink for MatchHandle {
    fn emit(&self, path: &Path) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(SearchError::OutputClosed)?;
        sender
            .send(path.to_path_buf())
            .map_err(|_| SearchError::OutputClosed)
    }
}

/// Collects matches in memory
#[derive(Debug, Default)]
pub struct MatchCollector {
    matches: Mutex<Vec<PathBuf>>,
}

impl MatchCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of matches collected so far
    pub fn len(&self) -> usize {
        self.matches.lock().len()
    }

    /// Check if nothing was collected
    pub fn is_empty(&self) -> bool {
        self.matches.lock().is_empty()
    }

    /// Matches in emission order
    pub fn matches(&self) -> Vec<PathBuf> {
        self.matches.lock().clone()
    }

    /// Matches sorted by path
    pub fn sorted(&self) -> Vec<PathBuf> {
        let mut matches = self.matches();
        matches.sort();
        matches
    }
}

impl MatchSink for MatchCollector {
    fn emit(&self, path: &Path) -> Result<()> {
        self.matches.lock().push(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Write target shared with the test after the writer thread exits
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_lines() {
        let buf = SharedBuf::default();
        let writer = MatchWriter::new(buf.clone(), 4).unwrap();

        let handle = writer.handle();
        handle.emit(Path::new("/root/a")).unwrap();
        handle.emit(Path::new("/root/sub/b")).unwrap();
        drop(handle);

        assert_eq!(writer.finish().unwrap(), 2);
        let text = String::from_utf8(buf.0.lock().clone()).unwrap();
        assert_eq!(text, "/root/a\n/root/sub/b\n");
    }

    #[test]
    fn test_writer_concurrent_handles() {
        let buf = SharedBuf::default();
        let writer = MatchWriter::new(buf.clone(), 2).unwrap();

        let threads: Vec<_> = (0..4)
            .map(|t| {
                let handle = writer.handle();
                thread::spawn(move || {
                    for i in 0..50 {
                        let path = PathBuf::from(format!("/t{}/link{}", t, i));
                        handle.emit(&path).unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(writer.finish().unwrap(), 200);
        let text = String::from_utf8(buf.0.lock().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 200);
        assert!(lines.iter().all(|l| l.starts_with("/t") && l.contains("/link")));
    }

    #[test]
    fn test_collector() {
        let collector = MatchCollector::new();
        assert!(collector.is_empty());

        collector.emit(Path::new("/z")).unwrap();
        collector.emit(Path::new("/a")).unwrap();

        assert_eq!(collector.len(), 2);
        assert_eq!(collector.matches(), vec![PathBuf::from("/z"), PathBuf::from("/a")]);
        assert_eq!(collector.sorted(), vec![PathBuf::from("/a"), PathBuf::from("/z")]);
    }
}
