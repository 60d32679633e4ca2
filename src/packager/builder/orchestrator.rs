//! Main release orchestration.

use super::{Artifact, checksum::calculate_sha256};
use crate::packager::{
    Error, Result,
    archive::{EntryTime, ExtraFile},
    exec::CommandExecutor,
    git::{GIT_HASH_FILENAME, Git},
    settings::Settings,
    source::SourceArchiver,
    utils::fs,
};
use std::path::PathBuf;

/// Name of the marker file holding the release version.
pub const VERSION_FILENAME: &str = "VERSION.txt";

/// Where the commit being packaged comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// A git work tree; the commit was resolved with `git rev-parse`.
    Repository {
        /// Full commit hash
        commit: String,
    },
    /// An extracted release archive; the commit was read from its marker.
    Archive {
        /// Commit recorded in the marker
        commit: String,
        /// The `.git-hash` file
        marker: PathBuf,
    },
}

impl Provenance {
    /// Commit being packaged.
    pub fn commit(&self) -> &str {
        match self {
            Self::Repository { commit } | Self::Archive { commit, .. } => commit,
        }
    }
}

/// Release orchestrator.
///
/// Creating one already validates the work tree, so every method can assume
/// a known commit.
#[derive(Debug)]
pub struct Releaser<E> {
    settings: Settings,
    executor: E,
    provenance: Provenance,
}

impl<E: CommandExecutor> Releaser<E> {
    /// Creates a releaser for `settings`, running commands through `executor`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCommit`] if the requested commit does not resolve
    /// - [`Error::DirtyTree`] if the work tree has changes and `force` is off
    pub async fn new(settings: Settings, executor: E) -> Result<Self> {
        let provenance = detect_provenance(&settings, &executor).await?;

        if let Provenance::Repository { .. } = provenance {
            let status = Git::new(&executor).porcelain_status().await?;
            if !status.is_empty() {
                log::warn!("The work tree is dirty:\n{}", status);
                if settings.force() {
                    log::info!("--force given, continuing with a dirty work tree");
                } else {
                    return Err(Error::DirtyTree);
                }
            }
        }

        log::debug!("Packaging commit {}", provenance.commit());
        Ok(Self {
            settings,
            executor,
            provenance,
        })
    }

    /// Returns the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns where the packaged commit comes from.
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Full hash of the packaged commit.
    pub fn commit(&self) -> &str {
        self.provenance.commit()
    }

    /// Marker files injected into every source archive.
    pub fn marker_files(&self) -> Vec<ExtraFile> {
        vec![
            ExtraFile::marker(
                VERSION_FILENAME,
                format!("{}\n", self.settings.version()),
                EntryTime::Latest,
            ),
            ExtraFile::marker(
                GIT_HASH_FILENAME,
                format!("{}\n", self.commit()),
                EntryTime::Latest,
            ),
        ]
    }

    /// Builds the source archives in every configured format.
    ///
    /// # Returns
    ///
    /// One [`Artifact`] per format, in format order.
    ///
    /// # Errors
    ///
    /// [`Error::SourceFromArchive`] if the root is an extracted release
    /// archive, otherwise any archive or checksum failure.
    pub async fn create_source_archives(&self) -> Result<Vec<Artifact>> {
        if let Provenance::Archive { marker, .. } = &self.provenance {
            return Err(Error::SourceFromArchive {
                marker: marker.clone(),
            });
        }

        fs::create_dir_all(self.settings.dist_path()).await?;

        let archiver = SourceArchiver::new(
            &self.executor,
            self.settings.dist_path(),
            self.settings.archive_root(),
        );
        let outputs = archiver
            .build_archive(self.commit(), self.marker_files(), self.settings.formats())
            .await?;

        let mut artifacts = Vec::with_capacity(outputs.len());
        for (format, path) in outputs {
            let size = fs::file_size(&path).await?;
            let checksum = calculate_sha256(&path).await?;
            log::info!("Created {} ({} bytes)", path.display(), size);
            artifacts.push(Artifact {
                key: format.artifact_key(),
                format,
                path,
                size,
                checksum,
            });
        }

        Ok(artifacts)
    }
}

/// Determines the commit, preferring a `.git-hash` marker in the root.
async fn detect_provenance<E: CommandExecutor>(
    settings: &Settings,
    executor: &E,
) -> Result<Provenance> {
    let marker = settings.root().join(GIT_HASH_FILENAME);
    if let Some(text) = fs::read_regular_file_text(&marker).await? {
        let commit = text.trim().to_string();
        if commit.is_empty() {
            crate::bail!("{} is empty", marker.display());
        }
        if commit != settings.commit() {
            log::warn!(
                "Commit argument is {}, but the archive commit is {}; using {}",
                settings.commit(),
                commit,
                commit
            );
        }
        return Ok(Provenance::Archive { commit, marker });
    }

    let commit = Git::new(executor).resolve_commit(settings.commit()).await?;
    Ok(Provenance::Repository { commit })
}
