//! Error types for packaging operations.
//!
//! Every failure aborts the whole packaging run; nothing here is recovered
//! locally. The helper traits attach file-system context to I/O errors the
//! way the rest of the crate expects.

use std::{fmt::Display, io, path::PathBuf};
use thiserror::Error;

/// Result type alias for packaging operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building release archives.
#[derive(Error, Debug)]
pub enum Error {
    /// A snapshot path has no commit in the history of the target commit.
    #[error(
        "incomplete git history for {commit}: no commit touches {} path(s): {}",
        missing.len(),
        missing.join(", ")
    )]
    IncompleteHistory {
        /// Commit the history was walked from
        commit: String,
        /// Unresolved paths, sorted
        missing: Vec<String>,
    },

    /// The commit reference does not resolve to a commit.
    #[error("invalid commit '{commit}': {reason}")]
    InvalidCommit {
        /// Reference as given by the caller
        commit: String,
        /// Backend diagnostic
        reason: String,
    },

    /// An external command exited unsuccessfully.
    #[error("command `{command}` failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        /// Rendered command line
        command: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// `git log` output did not follow the expected layout.
    #[error("malformed git log output at line {line_number}: {line:?}")]
    MalformedLog {
        /// One-based line number
        line_number: usize,
        /// Offending line
        line: String,
    },

    /// A commit timestamp could not be parsed.
    #[error("invalid commit timestamp {value:?}: {source}")]
    InvalidTimestamp {
        /// Raw timestamp text
        value: String,
        /// Parser error
        #[source]
        source: chrono::ParseError,
    },

    /// A timestamp cannot be represented in a zip entry.
    #[error("timestamp {0} is outside the range representable in a zip archive")]
    ZipTimeRange(String),

    /// A version macro is missing from the version header.
    #[error("version macro {macro_name} not found in {}", path.display())]
    VersionNotFound {
        /// Header that was searched
        path: PathBuf,
        /// Macro that is missing
        macro_name: String,
    },

    /// The work tree has uncommitted or untracked files.
    #[error("the git repo contains modified and/or non-committed files; run with --force to ignore")]
    DirtyTree,

    /// Source archives were requested from an already extracted archive.
    #[error("cannot build a source archive from an extracted source archive ({} present)", marker.display())]
    SourceFromArchive {
        /// The marker file that identified the archive
        marker: PathBuf,
    },

    /// Two archive entries would share one path.
    #[error("archive entry {path} is defined twice (a marker file collides with the tree or another marker)")]
    DuplicateEntry {
        /// Path relative to the archive root
        path: String,
    },

    /// I/O error with file-system context.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being done
        context: String,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        error: io::Error,
    },

    /// Plain I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Zip writer error.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Background task failure.
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

/// Adds file-system context to I/O results.
pub trait ErrorExt<T> {
    /// Maps an I/O error into [`Error::Fs`] naming the operation and path.
    fn fs_context(self, context: &str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context: context.to_string(),
            path: path.into(),
            error,
        })
    }
}

/// Attaches a message to an error or to a missing value.
pub trait Context<T> {
    /// Wraps the failure with a static message.
    fn context<C: Display + Send + Sync + 'static>(self, context: C) -> Result<T>;

    /// Wraps the failure with a lazily built message.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: Display> Context<T> for std::result::Result<T, E> {
    fn context<C: Display + Send + Sync + 'static>(self, context: C) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::GenericError(format!("{}: {e}", f())))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display + Send + Sync + 'static>(self, context: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::packager::Error::GenericError(format!($($arg)*)))
    };
}
