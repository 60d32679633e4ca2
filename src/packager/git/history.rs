//! Commit time resolution from git history.
//!
//! The log of the target commit is walked newest first. The first record
//! that mentions a path is the most recent change to it, and that commit's
//! committer time becomes the path's modification time in every archive.

use super::Git;
use crate::packager::{Error, Result, exec::CommandExecutor};
use chrono::{DateTime, FixedOffset};
use std::collections::{HashMap, HashSet};

const TIME_PREFIX: &str = "time=";

/// Path -> time of the most recent commit touching it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitTimeIndex {
    times: HashMap<String, DateTime<FixedOffset>>,
    commit_time: Option<DateTime<FixedOffset>>,
}

impl CommitTimeIndex {
    /// Resolved time of `path`.
    pub fn get(&self, path: &str) -> Option<DateTime<FixedOffset>> {
        self.times.get(path).copied()
    }

    /// Number of resolved paths.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True if no path was resolved.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Committer time of the commit the log started at.
    pub fn commit_time(&self) -> Option<DateTime<FixedOffset>> {
        self.commit_time
    }

    /// Newest resolved time.
    pub fn latest(&self) -> Option<DateTime<FixedOffset>> {
        self.times.values().max().copied()
    }
}

/// Resolves the last-modified commit time of every path in `candidate_paths`.
///
/// # Errors
///
/// - [`Error::IncompleteHistory`] if some candidate never appears in the log
/// - [`Error::InvalidCommit`] if git rejects `commit`
/// - [`Error::MalformedLog`] / [`Error::InvalidTimestamp`] on unexpected output
pub async fn resolve_file_times<E: CommandExecutor>(
    git: &Git<E>,
    candidate_paths: &[String],
    commit: &str,
) -> Result<CommitTimeIndex> {
    let log = git.name_status_log(commit).await?;
    let index = index_name_status_log(&log, candidate_paths, commit)?;
    log::debug!(
        "Resolved commit times for {} path(s) at {}",
        index.len(),
        commit
    );
    Ok(index)
}

/// Builds a [`CommitTimeIndex`] from `git log --name-status --pretty=time=%cI` output.
pub fn index_name_status_log(
    log: &str,
    candidate_paths: &[String],
    commit: &str,
) -> Result<CommitTimeIndex> {
    let candidates: HashSet<&str> = candidate_paths.iter().map(String::as_str).collect();
    let mut index = CommitTimeIndex::default();
    let mut current: Option<DateTime<FixedOffset>> = None;

    for (number, line) in log.lines().enumerate() {
        if index.commit_time.is_some() && index.times.len() == candidates.len() {
            break;
        }
        if line.is_empty() {
            continue;
        }

        if let Some(value) = line.strip_prefix(TIME_PREFIX) {
            let time = DateTime::parse_from_rfc3339(value.trim()).map_err(|source| {
                Error::InvalidTimestamp {
                    value: value.to_string(),
                    source,
                }
            })?;
            if index.commit_time.is_none() {
                index.commit_time = Some(time);
            }
            current = Some(time);
            continue;
        }

        let malformed = || Error::MalformedLog {
            line_number: number + 1,
            line: line.to_string(),
        };
        let time = current.ok_or_else(malformed)?;
        let (_change_type, paths) = line.split_once('\t').ok_or_else(malformed)?;

        for raw in paths.split('\t') {
            let path = unquote_path(raw);
            if candidates.contains(path.as_str()) && !index.times.contains_key(&path) {
                index.times.insert(path, time);
            }
        }
    }

    if index.times.len() != candidates.len() {
        let mut missing: Vec<String> = candidates
            .iter()
            .filter(|path| !index.times.contains_key(**path))
            .map(|path| path.to_string())
            .collect();
        missing.sort();
        return Err(Error::IncompleteHistory {
            commit: commit.to_string(),
            missing,
        });
    }

    Ok(index)
}

/// Decodes a path git printed in C-quoted form (`"a\tb"`, `"\303\251"`).
fn unquote_path(raw: &str) -> String {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let bytes = inner.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let escaped = bytes[i + 1];
        i += 2;
        match escaped {
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b't' => out.push(b'\t'),
            b'n' => out.push(b'\n'),
            b'v' => out.push(0x0b),
            b'f' => out.push(0x0c),
            b'r' => out.push(b'\r'),
            b'0'..=b'7' => {
                let mut value = u32::from(escaped - b'0');
                let mut digits = 1;
                while digits < 3 && i < bytes.len() && (b'0'..=b'7').contains(&bytes[i]) {
                    value = value * 8 + u32::from(bytes[i] - b'0');
                    i += 1;
                    digits += 1;
                }
                out.push(value as u8);
            }
            other => out.push(other),
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
