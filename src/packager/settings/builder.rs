//! Builder for constructing Settings.

use super::Settings;
use crate::packager::archive::ArchiveFormat;
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// `project`, `version`, `root` and `dist_path` are required. The commit
/// defaults to `HEAD` and the formats to every [`ArchiveFormat`].
#[derive(Default)]
pub struct SettingsBuilder {
    project: Option<String>,
    version: Option<String>,
    commit: Option<String>,
    root: Option<PathBuf>,
    dist_path: Option<PathBuf>,
    formats: Vec<ArchiveFormat>,
    force: bool,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project name.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Sets the release version.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the commit, branch or tag to package.
    ///
    /// Default: `HEAD`
    pub fn commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    /// Sets the repository root.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the artifact directory.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn dist_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.dist_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the archive formats. Duplicates are dropped, order is kept.
    ///
    /// Default: [`ArchiveFormat::ALL`]
    pub fn formats(mut self, formats: impl IntoIterator<Item = ArchiveFormat>) -> Self {
        self.formats.clear();
        for format in formats {
            if !self.formats.contains(&format) {
                self.formats.push(format);
            }
        }
        self
    }

    /// Tolerates a dirty work tree.
    ///
    /// Default: `false`
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or empty.
    pub fn build(self) -> crate::packager::Result<Settings> {
        use crate::packager::error::Context;

        let project = self.project.context("project is required")?;
        let version = self.version.context("version is required")?;
        if project.trim().is_empty() {
            crate::bail!("project must not be empty");
        }
        if version.trim().is_empty() {
            crate::bail!("version must not be empty");
        }

        let formats = if self.formats.is_empty() {
            ArchiveFormat::ALL.to_vec()
        } else {
            self.formats
        };

        Ok(Settings::new(
            project,
            version,
            self.commit.unwrap_or_else(|| "HEAD".to_string()),
            self.root.context("root is required")?,
            self.dist_path.context("dist_path is required")?,
            formats,
            self.force,
        ))
    }
}
