//! Archive entries and container writers.
//!
//! - `TreeEntry`: one regular file with the metadata written into archives
//! - `ExtraFile`: a synthetic marker file injected next to the tree
//! - `ArchiveFormat`: the supported containers
//! - `tarball` / `zipfile`: deterministic writers for each container

mod tarball;
mod zipfile;

pub use tarball::{scrub_gzip_timestamp, write_tar, TarCompression};
pub use zipfile::write_zip;

use crate::packager::{Error, Result};
use chrono::{DateTime, FixedOffset};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Mode used for synthetic marker files (regular file, rw-r--r--).
pub const MARKER_FILE_MODE: u32 = 0o100644;

/// One regular file as it existed at a specific commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Repository-relative path, `/` separated
    pub path: String,
    /// POSIX mode bits
    pub mode: u32,
    /// File content
    pub content: Vec<u8>,
    /// Modification time written into the archive
    pub time: DateTime<FixedOffset>,
}

/// When a synthetic file claims to have been modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTime {
    /// Explicit timestamp.
    At(DateTime<FixedOffset>),
    /// Newest time among the tree entries, or the commit time if the tree is empty.
    Latest,
}

/// A synthetic file added to an archive that is not part of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraFile {
    /// Path relative to the archive root
    pub path: String,
    /// POSIX mode bits
    pub mode: u32,
    /// File content
    pub content: Vec<u8>,
    /// Assigned modification time
    pub time: EntryTime,
}

impl ExtraFile {
    /// A text marker file with [`MARKER_FILE_MODE`].
    pub fn marker(path: impl Into<String>, content: impl Into<String>, time: EntryTime) -> Self {
        Self {
            path: path.into(),
            mode: MARKER_FILE_MODE,
            content: content.into().into_bytes(),
            time,
        }
    }

    /// Resolves the assigned time against `latest`.
    pub(crate) fn into_entry(self, latest: DateTime<FixedOffset>) -> TreeEntry {
        let time = match self.time {
            EntryTime::At(time) => time,
            EntryTime::Latest => latest,
        };
        TreeEntry {
            path: self.path,
            mode: self.mode,
            content: self.content,
            time,
        }
    }
}

/// Orders entries by modification time, oldest first.
///
/// The sort is stable: entries sharing a timestamp keep their relative input
/// order, so a fixed input order always yields the same archive layout.
pub fn sort_by_time(entries: &mut [TreeEntry]) {
    entries.sort_by_key(|entry| entry.time);
}

/// Supported archive containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArchiveFormat {
    /// Deflate-compressed zip
    Zip,
    /// Gzip-compressed tar
    TarGz,
    /// Xz-compressed tar
    TarXz,
}

impl ArchiveFormat {
    /// Every supported format, in the order they are written.
    pub const ALL: [ArchiveFormat; 3] = [ArchiveFormat::Zip, ArchiveFormat::TarGz, ArchiveFormat::TarXz];

    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::TarGz => ".tar.gz",
            Self::TarXz => ".tar.xz",
        }
    }

    /// Key under which the produced file is reported.
    pub fn artifact_key(self) -> &'static str {
        match self {
            Self::Zip => "src-zip",
            Self::TarGz => "src-tar-gz",
            Self::TarXz => "src-tar-xz",
        }
    }

    /// Output path for an archive named `archive_root` inside `dir`.
    pub fn output_path(self, dir: &Path, archive_root: &str) -> PathBuf {
        dir.join(format!("{archive_root}{}", self.extension()))
    }

    /// Writes `entries`, in order, below `archive_root` into `path`.
    pub fn write(self, path: &Path, archive_root: &str, entries: &[TreeEntry]) -> Result<()> {
        match self {
            Self::Zip => write_zip(path, archive_root, entries),
            Self::TarGz => {
                write_tar(path, archive_root, entries, TarCompression::Gzip)?;
                scrub_gzip_timestamp(path)
            }
            Self::TarXz => write_tar(path, archive_root, entries, TarCompression::Xz),
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Zip => "zip",
            Self::TarGz => "tar-gz",
            Self::TarXz => "tar-xz",
        })
    }
}

impl FromStr for ArchiveFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zip" => Ok(Self::Zip),
            "tar-gz" | "tar.gz" | "tgz" => Ok(Self::TarGz),
            "tar-xz" | "tar.xz" | "txz" => Ok(Self::TarXz),
            other => Err(Error::GenericError(format!(
                "unknown archive format '{other}' (expected zip, tar-gz or tar-xz)"
            ))),
        }
    }
}
