//! Directory entry classification
//!
//! Decides whether an entry is a directory, a symlink or anything else, and
//! resolves symlinks to an absolute path that can be compared against the
//! (already canonical) search target.
//!
//! Classification never follows the entry itself, so a symlink to a
//! directory is reported as a [`EntryKind::Symlink`]. Link values are
//! resolved one hop only: relative values are joined to the directory that
//! contains the link and folded lexically.

use crate::error::{ScanError, ScanResult};
use std::ffi::OsStr;
use std::fs::{self, DirEntry, FileType};
use std::path::{Component, Path, PathBuf};

/// Kind of a filesystem entry as seen by the walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory (never a link to one)
    Directory,
    /// Symbolic link with its resolved absolute target
    Symlink(PathBuf),
    /// Regular file, device, fifo, socket...
    Other,
}

impl EntryKind {
    /// Resolved link target, if this is a symlink
    pub fn link_target(&self) -> Option<&Path> {
        match self {
            EntryKind::Symlink(target) => Some(target),
            _ => None,
        }
    }
}

/// Classify a path without following it
pub fn classify(path: &Path) -> ScanResult<EntryKind> {
    let meta = fs::symlink_metadata(path).map_err(|source| ScanError::Inspect {
        path: path.to_path_buf(),
        source,
    })?;

    from_file_type(path, meta.file_type())
}

/// Classify a directory listing entry
///
/// Uses the type reported by the listing itself, which saves an `lstat`
/// on filesystems that return it.
pub fn classify_entry(entry: &DirEntry) -> ScanResult<EntryKind> {
    let path = entry.path();
    let file_type = entry.file_type().map_err(|source| ScanError::Inspect {
        path: path.clone(),
        source,
    })?;

    from_file_type(&path, file_type)
}

fn from_file_type(path: &Path, file_type: FileType) -> ScanResult<EntryKind> {
    if file_type.is_symlink() {
        read_link_target(path).map(EntryKind::Symlink)
    } else if file_type.is_dir() {
        Ok(EntryKind::Directory)
    } else {
        Ok(EntryKind::Other)
    }
}

/// Read a symlink and resolve its value to an absolute path
pub fn read_link_target(link: &Path) -> ScanResult<PathBuf> {
    let raw = fs::read_link(link).map_err(|source| ScanError::ReadLink {
        path: link.to_path_buf(),
        source,
    })?;

    Ok(resolve_link(link, &raw))
}

/// Resolve a raw link value relative to the link's containing directory
pub fn resolve_link(link: &Path, raw: &Path) -> PathBuf {
    if raw.is_absolute() {
        return lexical_normalize(raw);
    }

    let base = link.parent().unwrap_or_else(|| Path::new("/"));
    lexical_normalize(&base.join(raw))
}

/// Lexical path normalization without filesystem access
///
/// Removes `.` components and folds `..` into the preceding component.
/// `..` directly below the root stays at the root.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                Some(Component::ParentDir) | None => components.push(component),
                Some(_) => {
                    components.pop();
                }
            },
            _ => components.push(component),
        }
    }

    if components.is_empty() {
        return PathBuf::from(".");
    }

    components.iter().collect()
}

/// Check for the `.` and `..` pseudo-entries
pub fn is_pseudo_entry(name: &OsStr) -> bool {
    name == OsStr::new(".") || name == OsStr::new("..")
}
