//! Throwaway git repositories for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// A git work tree in a temporary directory with fixed identity and dates.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Creates an empty repository, or `None` when git is not installed.
    pub fn new() -> Option<Self> {
        if which::which("git").is_err() {
            eprintln!("git not found in PATH, skipping");
            return None;
        }
        let repo = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        repo.git(&["init", "-q"], "2024-01-01T00:00:00+00:00");
        Some(repo)
    }

    /// Work tree root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a file, creating parent directories.
    pub fn write(&self, path: &str, content: &str) {
        let full = self.path().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }

    /// Sets the permission bits of a file.
    #[cfg(unix)]
    pub fn chmod(&self, path: &str, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        let full = self.path().join(path);
        std::fs::set_permissions(full, std::fs::Permissions::from_mode(mode)).unwrap();
    }

    /// Stages everything and commits with author and committer `date`.
    pub fn commit(&self, message: &str, date: &str) -> String {
        self.git(&["add", "-A"], date);
        self.git(&["commit", "-q", "-m", message], date);
        self.git(&["rev-parse", "HEAD"], date).trim().to_string()
    }

    /// Runs git in the work tree and returns its stdout.
    pub fn git(&self, args: &[&str], date: &str) -> String {
        let output = Command::new("git")
            .current_dir(self.path())
            .args([
                "-c",
                "user.name=Release Tester",
                "-c",
                "user.email=release@example.com",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "core.fileMode=true",
            ])
            .args(args)
            .env("GIT_AUTHOR_DATE", date)
            .env("GIT_COMMITTER_DATE", date)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("HOME", self.path())
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }
}
