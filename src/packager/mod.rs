//! Deterministic release packaging.
//!
//! # Module Organization
//!
//! - [`archive`] - archive entries and the zip / tar writers
//! - [`builder`] - [`Releaser`] orchestration and artifact checksums
//! - [`error`] - error type and context helpers
//! - [`exec`] - the [`CommandExecutor`] seam over external tools
//! - [`git`] - git queries: commit resolution, snapshots, history
//! - [`settings`] - [`Settings`] and [`SettingsBuilder`]
//! - [`source`] - [`SourceArchiver`], the reproducible archive pipeline
//! - [`version`] - version detection from a C header

pub mod archive;
pub mod builder;
pub mod error;
pub mod exec;
pub mod git;
pub mod settings;
pub mod source;
pub mod utils;
pub mod version;

pub use archive::{ArchiveFormat, EntryTime, ExtraFile, TreeEntry};
pub use builder::{Artifact, Provenance, Releaser};
pub use error::{Error, Result};
pub use exec::{CommandExecutor, CommandLine, CommandOutput, RecordingExecutor, SystemExecutor};
pub use settings::{Settings, SettingsBuilder};
pub use source::SourceArchiver;
