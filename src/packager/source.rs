//! Reproducible source archives.
//!
//! [`SourceArchiver`] turns one commit into archives whose bytes depend only
//! on the repository content and history:
//!
//! 1. Snapshot the tree of the commit (`git archive`)
//! 2. Give every file the time of the last commit that touched it (`git log`)
//! 3. Append synthetic marker files
//! 4. Sort all entries by time, oldest first
//! 5. Write each requested container
//!
//! File-system iteration order and wall-clock time never reach the output.

use crate::packager::{
    Error, Result,
    archive::{ArchiveFormat, EntryTime, ExtraFile, TreeEntry, sort_by_time},
    error::Context,
    exec::CommandExecutor,
    git::{Git, resolve_file_times, snapshot_commit},
    utils::fs,
};
use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    path::{Path, PathBuf},
};

/// Builds deterministic source archives from git history.
#[derive(Debug)]
pub struct SourceArchiver<E> {
    git: Git<E>,
    output_dir: PathBuf,
    archive_root: String,
}

impl<E: CommandExecutor> SourceArchiver<E> {
    /// Creates an archiver writing `<archive_root>.<ext>` files into `output_dir`.
    ///
    /// # Arguments
    ///
    /// * `executor` - Runs git inside the repository
    /// * `output_dir` - Directory receiving the archives (created if missing)
    /// * `archive_root` - Folder every entry is placed under, e.g. `SDL2-2.30.8`
    pub fn new(executor: E, output_dir: impl Into<PathBuf>, archive_root: impl Into<String>) -> Self {
        Self {
            git: Git::new(executor),
            output_dir: output_dir.into(),
            archive_root: archive_root.into(),
        }
    }

    /// Directory receiving the archives.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Folder every entry is placed under.
    pub fn archive_root(&self) -> &str {
        &self.archive_root
    }

    /// Collects the time-ordered entries of `commit` plus `extra_files`.
    ///
    /// Entries with equal times keep their input order: tree files in
    /// `git archive` order, then extra files in the order given.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCommit`] before anything else if `commit` does not resolve
    /// - [`Error::IncompleteHistory`] if a tree file has no commit in the log
    /// - [`Error::DuplicateEntry`] if an extra file reuses a tree path or
    ///   another extra file's path
    pub async fn collect_entries(
        &self,
        commit: &str,
        extra_files: Vec<ExtraFile>,
    ) -> Result<Vec<TreeEntry>> {
        let commit = self.git.resolve_commit(commit).await?;

        let snapshot = snapshot_commit(&self.git, &commit).await?;
        let index = resolve_file_times(&self.git, &snapshot.paths(), &commit).await?;

        let mut entries = Vec::with_capacity(snapshot.len() + extra_files.len());
        for file in snapshot.into_files() {
            let time = index.get(&file.path).ok_or_else(|| Error::IncompleteHistory {
                commit: commit.clone(),
                missing: vec![file.path.clone()],
            })?;
            entries.push(TreeEntry {
                path: file.path,
                mode: file.mode,
                content: file.content,
                time,
            });
        }

        let mut paths: HashSet<String> = entries.iter().map(|e| e.path.clone()).collect();
        for extra in &extra_files {
            if !paths.insert(extra.path.clone()) {
                return Err(Error::DuplicateEntry {
                    path: extra.path.clone(),
                });
            }
        }

        let latest = index.latest().or(index.commit_time());
        for extra in extra_files {
            let reference = match extra.time {
                EntryTime::At(time) => time,
                EntryTime::Latest => latest.with_context(|| {
                    format!("no commit time available to date {}", extra.path)
                })?,
            };
            entries.push(extra.into_entry(reference));
        }

        sort_by_time(&mut entries);
        Ok(entries)
    }

    /// Builds one archive per requested format.
    ///
    /// Returns the path written for each format. Running twice against the
    /// same commit with the same extra files produces byte-identical files.
    ///
    /// # Errors
    ///
    /// Any git or I/O failure aborts the whole call; archives already written
    /// by this call are left as they are.
    pub async fn build_archive(
        &self,
        commit: &str,
        extra_files: Vec<ExtraFile>,
        output_formats: &[ArchiveFormat],
    ) -> Result<BTreeMap<ArchiveFormat, PathBuf>> {
        let formats: BTreeSet<ArchiveFormat> = output_formats.iter().copied().collect();
        if formats.is_empty() {
            crate::bail!("no archive formats requested");
        }

        let entries = self.collect_entries(commit, extra_files).await?;
        fs::create_dir_all(&self.output_dir).await?;

        let output_dir = self.output_dir.clone();
        let archive_root = self.archive_root.clone();

        // Compression and archive writing are blocking; keep them off the runtime.
        tokio::task::spawn_blocking(move || {
            let mut outputs = BTreeMap::new();
            for format in formats {
                let path = format.output_path(&output_dir, &archive_root);
                log::info!("Creating {} source archive ({})...", format, path.display());
                format.write(&path, &archive_root, &entries)?;
                outputs.insert(format, path);
            }
            Ok::<_, Error>(outputs)
        })
        .await?
    }
}
