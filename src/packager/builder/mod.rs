//! Release orchestration.
//!
//! [`Releaser`] ties the pieces together for one run:
//! 1. Works out which commit is being packaged ([`Provenance`])
//! 2. Refuses dirty work trees unless forced
//! 3. Builds the source archives with their marker files
//! 4. Reports each file as an [`Artifact`] with size and SHA-256
//!
//! # Example
//!
//! ```no_run
//! use release_packager::packager::{Releaser, SettingsBuilder, SystemExecutor};
//!
//! # async fn example() -> release_packager::packager::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .project("SDL2")
//!     .version("2.30.8")
//!     .root(".")
//!     .dist_path("dist")
//!     .build()?;
//!
//! let releaser = Releaser::new(settings.clone(), SystemExecutor::new(settings.root())).await?;
//! for artifact in releaser.create_source_archives().await? {
//!     println!("{} = {} ({})", artifact.key, artifact.path.display(), artifact.checksum);
//! }
//! # Ok(())
//! # }
//! ```

mod checksum;
mod orchestrator;

pub use checksum::calculate_sha256;
pub use orchestrator::{Provenance, Releaser};

use crate::packager::archive::ArchiveFormat;
use std::path::PathBuf;

/// A file produced by a packaging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Report key, e.g. `src-tar-gz`
    pub key: &'static str,
    /// Container format
    pub format: ArchiveFormat,
    /// Written file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Hex-encoded SHA-256 of the file
    pub checksum: String,
}
