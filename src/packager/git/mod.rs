//! Version-control queries.
//!
//! [`Git`] renders the handful of git invocations packaging needs and runs
//! them through a [`CommandExecutor`]. Parsing of their output lives in the
//! submodules:
//!
//! - [`history`] - commit time resolution from `git log --name-status`
//! - [`snapshot`] - tree extraction from `git archive`

pub mod history;
pub mod snapshot;

pub use history::{CommitTimeIndex, resolve_file_times};
pub use snapshot::{Snapshot, SnapshotFile, snapshot_commit};

use crate::packager::{
    Error, Result,
    exec::{CommandExecutor, CommandLine},
};

/// Name of the marker file recording the commit an archive was built from.
pub const GIT_HASH_FILENAME: &str = ".git-hash";

/// Leading words of the `git log` invocation used for time resolution.
pub const LOG_COMMAND_PREFIX: [&str; 4] = ["git", "-c", "core.quotePath=false", "log"];

/// Git front-end over an injected executor.
#[derive(Debug)]
pub struct Git<E> {
    executor: E,
}

impl<E: CommandExecutor> Git<E> {
    /// Wraps `executor`; commands run in whatever directory it uses.
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Returns the executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Resolves `rev` (branch, tag, abbreviated hash) to a full commit hash.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCommit`] if git cannot resolve the reference.
    pub async fn resolve_commit(&self, rev: &str) -> Result<String> {
        let command = CommandLine::new("git")
            .args(["rev-parse", "--verify"])
            .arg(format!("{rev}^{{commit}}"));

        let output = self
            .executor
            .execute(&command)
            .await
            .map_err(|e| invalid_commit(rev, e))?;

        let hash = output.stdout_text().trim().to_string();
        if hash.is_empty() {
            return Err(Error::InvalidCommit {
                commit: rev.to_string(),
                reason: "git rev-parse printed no hash".to_string(),
            });
        }
        Ok(hash)
    }

    /// `git status --ignored --porcelain`, trimmed. Empty means clean.
    pub async fn porcelain_status(&self) -> Result<String> {
        let command = CommandLine::new("git").args(["status", "--ignored", "--porcelain"]);
        let output = self.executor.execute(&command).await?;
        Ok(output.stdout_text().trim().to_string())
    }

    /// Full change log of `commit` with committer times and per-file records.
    pub async fn name_status_log(&self, commit: &str) -> Result<String> {
        let command = CommandLine::new(LOG_COMMAND_PREFIX[0])
            .args(LOG_COMMAND_PREFIX[1..].iter().copied())
            .args(["--name-status", "--pretty=time=%cI"])
            .arg(commit)
            .arg("--");
        let output = self
            .executor
            .execute(&command)
            .await
            .map_err(|e| invalid_commit(commit, e))?;
        Ok(output.stdout_text())
    }

    /// Uncompressed tar stream of the tree at `commit`.
    pub async fn archive_tar(&self, commit: &str) -> Result<Vec<u8>> {
        let command = CommandLine::new("git")
            .args(["archive", "--format=tar"])
            .arg(commit);
        let output = self
            .executor
            .execute(&command)
            .await
            .map_err(|e| invalid_commit(commit, e))?;
        Ok(output.stdout)
    }
}

/// Failures of git itself on a commit argument mean the reference is bad.
fn invalid_commit(commit: &str, error: Error) -> Error {
    match error {
        Error::CommandFailed { stderr, code, .. } => Error::InvalidCommit {
            commit: commit.to_string(),
            reason: format!("git exited with {code:?}: {stderr}"),
        },
        other => other,
    }
}
