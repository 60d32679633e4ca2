//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation
//! and conversion into packaging [`Settings`].

use crate::packager::{ArchiveFormat, Settings, SettingsBuilder};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Step output file used by `--github --dry-run` when none is configured.
pub const DRY_RUN_GITHUB_OUTPUT: &str = "/tmp/github_output.txt";

/// Work a run can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Reproducible source archives (zip, tar.gz, tar.xz)
    Source,
}

/// Reproducible release archives from git history
#[derive(Parser, Debug)]
#[command(
    name = "release-packager",
    version,
    disable_version_flag = true,
    about = "Reproducible release archives from git history",
    long_about = "Creates source archives whose bytes depend only on the repository history.

Every file gets the time of the last commit that touched it, entries are ordered by
that time and a VERSION.txt and .git-hash marker are added next to the tree.

Usage:
  release-packager --project SDL2 --create source
  release-packager --project SDL2 --create source --commit release-2.30.8 --format zip
  release-packager --project SDL2 --create source --dry-run

Exit code 0 = every requested archive was written."
)]
pub struct Args {
    /// Project root (a git work tree or an extracted source archive)
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Output directory for artifacts
    #[arg(short = 'o', long = "out", value_name = "DIR", default_value = "dist")]
    pub out: PathBuf,

    /// Commit, branch or tag to package
    #[arg(long, value_name = "REV", default_value = "HEAD")]
    pub commit: String,

    /// Project name, used as the archive root prefix (e.g. SDL2)
    #[arg(long, value_name = "NAME")]
    pub project: String,

    /// What to create (repeatable)
    #[arg(long = "create", value_enum, value_name = "ACTION", required = true)]
    pub actions: Vec<Action>,

    /// Archive format: zip, tar-gz or tar-xz (repeatable, default all)
    #[arg(long = "format", value_name = "FORMAT")]
    pub formats: Vec<ArchiveFormat>,

    /// Release version; read from the version header if omitted
    #[arg(long = "version", value_name = "VERSION")]
    pub release_version: Option<String>,

    /// Header defining the version macros, relative to the root
    #[arg(long, value_name = "PATH", default_value = "include/SDL_version.h")]
    pub version_header: PathBuf,

    /// Prefix of the version macros (<PREFIX>_MAJOR_VERSION, ...)
    #[arg(long, value_name = "PREFIX", default_value = "SDL")]
    pub version_prefix: String,

    /// Group output for GitHub Actions and write step outputs
    #[arg(long)]
    pub github: bool,

    /// File receiving GitHub step outputs (dry runs default to /tmp/github_output.txt)
    #[arg(long, value_name = "PATH", env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,

    /// Record commands instead of running them; archives go to <out>/dry
    #[arg(long)]
    pub dry_run: bool,

    /// Package even if the work tree has modified or untracked files
    #[arg(long)]
    pub force: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Parse command line arguments
    ///
    /// Usage errors are returned instead of exiting, so the caller decides
    /// the exit status.
    pub fn parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.project.trim().is_empty() {
            return Err("Project name cannot be empty".to_string());
        }
        if self.project.contains(['/', '\\']) {
            return Err(format!(
                "Project name must not contain path separators: {}",
                self.project
            ));
        }
        if self.commit.trim().is_empty() {
            return Err("Commit cannot be empty".to_string());
        }
        if self
            .release_version
            .as_deref()
            .is_some_and(|v| v.trim().is_empty())
        {
            return Err("Version cannot be empty".to_string());
        }
        if self.github && !self.dry_run && self.github_output.is_none() {
            return Err("--github requires --github-output or GITHUB_OUTPUT".to_string());
        }

        Ok(())
    }

    /// Directory artifacts are written to; dry runs use a `dry` subdirectory.
    pub fn dist_path(&self) -> PathBuf {
        if self.dry_run {
            self.out.join("dry")
        } else {
            self.out.clone()
        }
    }

    /// Step output file for `--github`, falling back to
    /// [`DRY_RUN_GITHUB_OUTPUT`] in dry runs.
    pub fn github_output(&self) -> Option<PathBuf> {
        self.github_output
            .clone()
            .or_else(|| self.dry_run.then(|| PathBuf::from(DRY_RUN_GITHUB_OUTPUT)))
    }

    /// Version header location inside the root.
    pub fn version_header_path(&self) -> PathBuf {
        self.root.join(&self.version_header)
    }

    /// Builds packaging settings for `version`.
    pub fn settings(&self, version: &str) -> crate::packager::Result<Settings> {
        SettingsBuilder::new()
            .project(self.project.as_str())
            .version(version)
            .commit(self.commit.as_str())
            .root(&self.root)
            .dist_path(self.dist_path())
            .formats(self.formats.iter().copied())
            .force(self.force)
            .build()
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
    github_output: Option<PathBuf>,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.github),
            github_output: args.github.then(|| args.github_output()).flatten(),
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// File receiving GitHub step outputs, if enabled
    pub fn github_output(&self) -> Option<&std::path::Path> {
        self.github_output.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("release-packager").chain(argv.iter().copied()))
    }

    #[test]
    fn defaults() {
        let args = parse(&["--project", "SDL2", "--create", "source"]).unwrap();
        assert_eq!(args.root, PathBuf::from("."));
        assert_eq!(args.out, PathBuf::from("dist"));
        assert_eq!(args.commit, "HEAD");
        assert_eq!(args.actions, [Action::Source]);
        assert!(args.formats.is_empty());
        assert_eq!(args.version_header, PathBuf::from("include/SDL_version.h"));
        assert_eq!(args.version_prefix, "SDL");
        assert!(args.validate().is_ok());
    }

    #[test]
    fn formats_and_version() {
        let args = parse(&[
            "--project", "SDL2", "--create", "source", "--format", "zip", "--format", "tar.xz",
            "--version", "2.30.8",
        ])
        .unwrap();
        assert_eq!(args.formats, [ArchiveFormat::Zip, ArchiveFormat::TarXz]);
        assert_eq!(args.release_version.as_deref(), Some("2.30.8"));

        let settings = args.settings("2.30.8").unwrap();
        assert_eq!(settings.archive_root(), "SDL2-2.30.8");
        assert_eq!(settings.formats(), [ArchiveFormat::Zip, ArchiveFormat::TarXz]);
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(parse(&["--project", "p", "--create", "installer"]).is_err());
        assert!(parse(&["--project", "p", "--create", "source", "--format", "rar"]).is_err());
        assert!(parse(&["--create", "source"]).is_err());
        assert!(parse(&["--project", "p"]).is_err());
    }

    #[test]
    fn dry_run_writes_below_out() {
        let args = parse(&["--project", "p", "--create", "source", "-o", "/tmp/o", "--dry-run"]).unwrap();
        assert_eq!(args.dist_path(), PathBuf::from("/tmp/o/dry"));
    }

    #[test]
    fn validation_rules() {
        let args = parse(&["--project", "a/b", "--create", "source"]).unwrap();
        assert!(args.validate().is_err());

        let mut args = parse(&["--project", "p", "--create", "source", "--github"]).unwrap();
        args.github_output = None;
        assert!(args.validate().unwrap_err().contains("GITHUB_OUTPUT"));

        args.github_output = Some(PathBuf::from("/tmp/gh"));
        assert!(args.validate().is_ok());
        assert_eq!(
            RuntimeConfig::from(&args).github_output(),
            Some(std::path::Path::new("/tmp/gh"))
        );
    }

    #[test]
    fn github_dry_run_falls_back_to_tmp_output() {
        let mut args =
            parse(&["--project", "p", "--create", "source", "--github", "--dry-run"]).unwrap();
        args.github_output = None;
        assert!(args.validate().is_ok());
        assert_eq!(
            RuntimeConfig::from(&args).github_output(),
            Some(std::path::Path::new(DRY_RUN_GITHUB_OUTPUT))
        );

        args.github_output = Some(PathBuf::from("/tmp/gh"));
        assert_eq!(
            RuntimeConfig::from(&args).github_output(),
            Some(std::path::Path::new("/tmp/gh"))
        );

        args.github = false;
        assert_eq!(RuntimeConfig::from(&args).github_output(), None);
    }
}
