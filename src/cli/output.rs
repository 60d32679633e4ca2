//! User-facing terminal output.
//!
//! Plain runs print `=== Title ===` headers. Under GitHub Actions, sections
//! become collapsible `::group::` blocks and results are appended to the
//! file named by `GITHUB_OUTPUT`.

use std::io::{self, Write};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Writes sections and status lines to stdout.
#[derive(Debug, Clone, Copy)]
pub struct OutputManager {
    github: bool,
}

impl OutputManager {
    /// Creates an output manager; `github` switches to workflow commands.
    pub fn new(github: bool) -> Self {
        Self { github }
    }

    /// Opens a section.
    pub fn section(&self, title: &str) -> io::Result<()> {
        self.line(&section_header(title, self.github))
    }

    /// Closes the current section.
    pub fn end_section(&self) -> io::Result<()> {
        match section_footer(self.github) {
            Some(footer) => self.line(footer),
            None => Ok(()),
        }
    }

    /// Prints an indented line inside a section.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        self.line(&format!("  {message}"))
    }

    /// Prints a success line.
    pub fn success(&self, message: &str) -> io::Result<()> {
        self.line(&format!("✓ {message}"))
    }

    /// Prints a warning, as an annotation under GitHub Actions.
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.github {
            self.line(&format!("::warning::{message}"))
        } else {
            self.line(&format!("warning: {message}"))
        }
    }

    fn line(&self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{text}")?;
        stdout.flush()
    }
}

fn section_header(title: &str, github: bool) -> String {
    if github {
        format!("::group::{title}")
    } else {
        format!("=== {title} ===")
    }
}

fn section_footer(github: bool) -> Option<&'static str> {
    github.then_some("::endgroup::")
}

/// Appends `key=value` lines to a GitHub Actions output file.
pub async fn append_github_outputs(path: &Path, outputs: &[(String, String)]) -> io::Result<()> {
    let mut text = String::new();
    for (key, value) in outputs {
        text.push_str(key);
        text.push('=');
        text.push_str(value);
        text.push('\n');
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(text.as_bytes()).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_github_sections() {
        assert_eq!(section_header("Summary", false), "=== Summary ===");
        assert_eq!(section_header("Summary", true), "::group::Summary");
        assert_eq!(section_footer(false), None);
        assert_eq!(section_footer(true), Some("::endgroup::"));
    }

    #[tokio::test]
    async fn github_outputs_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "existing=1\n").unwrap();

        append_github_outputs(
            &path,
            &[
                ("project".into(), "SDL2".into()),
                ("src-zip".into(), "SDL2-2.30.8.zip".into()),
            ],
        )
        .await
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "existing=1\nproject=SDL2\nsrc-zip=SDL2-2.30.8.zip\n"
        );
    }
}
