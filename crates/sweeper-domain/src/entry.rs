//! Filesystem entry module - what a delete policy looks at

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Whether an entry is a file or a folder
///
/// Symlinks are never followed, so a link to a directory is treated as a file
/// and removing it removes the link only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EntryKind {
    /// Regular file, symlink or any other non-directory entry
    File,

    /// Directory
    Folder,
}

impl EntryKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Folder => "folder",
        }
    }
}

/// Which recorded timestamp an age comparison reads
///
/// - Creation: a fixed retention floor that incidental touches do not move
/// - LastWrite: guarantees a full window after the most recent modification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimestampSource {
    /// Birth time of the entry
    Creation,

    /// Last modification time of the entry
    LastWrite,
}

impl TimestampSource {
    /// Get the source name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampSource::Creation => "creation",
            TimestampSource::LastWrite => "last_write",
        }
    }

    /// Parse a timestamp source from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "creation" | "created" => Some(TimestampSource::Creation),
            "last_write" | "modified" | "lastwrite" => Some(TimestampSource::LastWrite),
            _ => None,
        }
    }
}

impl std::str::FromStr for TimestampSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid timestamp source: {}", s))
    }
}

/// Snapshot of a file or folder taken when a policy evaluates it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemEntry {
    /// Full path of the entry
    pub path: PathBuf,

    /// File or folder
    pub kind: EntryKind,

    /// Creation time, `None` where the platform or filesystem does not record it
    pub created: Option<SystemTime>,

    /// Last modification time
    pub modified: Option<SystemTime>,

    /// For folders: whether any child entry (file or subfolder) exists
    pub has_children: bool,
}

impl FilesystemEntry {
    /// Read the entry at `path` without following symlinks
    pub fn probe(path: &Path) -> io::Result<Self> {
        let metadata = fs::symlink_metadata(path)?;
        let kind = if metadata.file_type().is_dir() {
            EntryKind::Folder
        } else {
            EntryKind::File
        };

        let has_children = match kind {
            EntryKind::Folder => fs::read_dir(path)?.next().is_some(),
            EntryKind::File => false,
        };

        Ok(Self {
            path: path.to_path_buf(),
            kind,
            created: metadata.created().ok(),
            modified: metadata.modified().ok(),
            has_children,
        })
    }

    /// The timestamp selected by `source`, if recorded
    pub fn timestamp(&self, source: TimestampSource) -> Option<SystemTime> {
        match source {
            TimestampSource::Creation => self.created,
            TimestampSource::LastWrite => self.modified,
        }
    }
}
