//! Tree snapshots read from `git archive`.

use super::Git;
use crate::packager::{Error, Result, exec::CommandExecutor};
use std::io::Read;

/// A regular file of a commit's tree, before a time is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    /// Repository-relative path
    pub path: String,
    /// POSIX mode bits as recorded by git
    pub mode: u32,
    /// File content
    pub content: Vec<u8>,
}

/// Every regular file of a commit, in `git archive` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    files: Vec<SnapshotFile>,
}

impl Snapshot {
    /// Files in archive order.
    pub fn files(&self) -> &[SnapshotFile] {
        &self.files
    }

    /// Consumes the snapshot.
    pub fn into_files(self) -> Vec<SnapshotFile> {
        self.files
    }

    /// Paths in archive order.
    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if the tree has no regular files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// True for version-control metadata that never ships in archives.
pub fn is_version_control_path(path: &str) -> bool {
    path.starts_with(".git")
}

/// Permission bits as git tracks them.
///
/// `git archive` applies `tar.umask` (default `002`) to the recorded modes,
/// while the object database only knows executable or not.
pub fn tracked_mode(archived: u32) -> u32 {
    if archived & 0o111 != 0 { 0o755 } else { 0o644 }
}

/// Extracts every regular file of `commit`.
///
/// Directories, symlinks and version-control metadata are left out.
pub async fn snapshot_commit<E: CommandExecutor>(git: &Git<E>, commit: &str) -> Result<Snapshot> {
    let stream = git.archive_tar(commit).await?;
    let snapshot = read_tar_snapshot(stream.as_slice())?;
    log::debug!("Snapshot of {} has {} file(s)", commit, snapshot.len());
    Ok(snapshot)
}

/// Reads a tar stream into a [`Snapshot`].
pub fn read_tar_snapshot(stream: impl Read) -> Result<Snapshot> {
    let mut archive = tar::Archive::new(stream);
    let mut files = Vec::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = {
            let raw = entry.path()?;
            raw.to_str()
                .ok_or_else(|| {
                    Error::GenericError(format!(
                        "non UTF-8 path in git archive: {}",
                        raw.display()
                    ))
                })?
                .to_string()
        };
        if is_version_control_path(&path) {
            log::debug!("Skipping version-control path {}", path);
            continue;
        }

        let mode = tracked_mode(entry.header().mode()?);
        let mut content = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut content)?;

        files.push(SnapshotFile {
            path,
            mode,
            content,
        });
    }

    Ok(Snapshot { files })
}
