//! Reproducible release archives from git history.
//!
//! Builds source archives (zip, tar.gz, tar.xz) of a commit whose bytes
//! depend only on the repository content and history: every file carries the
//! time of the last commit that touched it and entries are ordered by time.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod packager;

// Re-export commonly used types
pub use error::{CliError, PackagerError, Result};
