//! Core Settings struct.

use crate::packager::archive::ArchiveFormat;
use std::path::{Path, PathBuf};

/// Settings for one packaging run, constructed via [`SettingsBuilder`].
///
/// # Examples
///
/// ```no_run
/// use release_packager::packager::SettingsBuilder;
///
/// # fn example() -> release_packager::packager::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project("SDL2")
///     .version("2.30.8")
///     .root("/src/SDL")
///     .dist_path("/src/SDL/dist")
///     .build()?;
/// assert_eq!(settings.archive_root(), "SDL2-2.30.8");
/// # Ok(())
/// # }
/// ```
///
/// [`SettingsBuilder`]: super::SettingsBuilder
#[derive(Clone, Debug)]
pub struct Settings {
    /// Project name, first half of the archive root.
    project: String,

    /// Release version, second half of the archive root.
    version: String,

    /// Requested commit, branch or tag.
    commit: String,

    /// Work tree of the repository.
    root: PathBuf,

    /// Directory receiving artifacts.
    dist_path: PathBuf,

    /// Archive formats to produce, never empty.
    formats: Vec<ArchiveFormat>,

    /// Build even if the work tree has uncommitted or ignored files.
    force: bool,
}

impl Settings {
    pub(super) fn new(
        project: String,
        version: String,
        commit: String,
        root: PathBuf,
        dist_path: PathBuf,
        formats: Vec<ArchiveFormat>,
        force: bool,
    ) -> Self {
        Self {
            project,
            version,
            commit,
            root,
            dist_path,
            formats,
            force,
        }
    }

    /// Returns the project name.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Returns the version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the requested commit.
    pub fn commit(&self) -> &str {
        &self.commit
    }

    /// Returns the repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the artifact directory.
    pub fn dist_path(&self) -> &Path {
        &self.dist_path
    }

    /// Returns the archive formats to produce.
    pub fn formats(&self) -> &[ArchiveFormat] {
        &self.formats
    }

    /// Whether a dirty work tree is tolerated.
    pub fn force(&self) -> bool {
        self.force
    }

    /// Folder every archive entry is placed under: `<project>-<version>`.
    pub fn archive_root(&self) -> String {
        format!("{}-{}", self.project, self.version)
    }
}
