//! Version detection from a C header.
//!
//! Projects keep their version as three `#define`s:
//!
//! ```c
//! #define SDL_MAJOR_VERSION   2
//! #define SDL_MINOR_VERSION   30
//! #define SDL_PATCHLEVEL      8
//! ```

use crate::packager::{Error, Result, error::ErrorExt};
use regex::Regex;
use std::path::Path;

const COMPONENTS: [&str; 3] = ["MAJOR_VERSION", "MINOR_VERSION", "PATCHLEVEL"];

/// Extracts `major.minor.patch` from header text.
///
/// # Arguments
///
/// * `header` - Content of the version header
/// * `prefix` - Macro prefix, e.g. `SDL` for `SDL_MAJOR_VERSION`
///
/// # Errors
///
/// [`Error::VersionNotFound`] naming the first missing macro.
pub fn extract_version(header: &str, prefix: &str, path: &Path) -> Result<String> {
    let mut parts = Vec::with_capacity(COMPONENTS.len());
    for component in COMPONENTS {
        let macro_name = format!("{prefix}_{component}");
        let pattern = format!(r"(?m)^#define\s+{}\s+([0-9]+)\s*$", regex::escape(&macro_name));
        let re = Regex::new(&pattern)
            .map_err(|e| Error::GenericError(format!("invalid version pattern: {e}")))?;

        let value = re
            .captures(header)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| Error::VersionNotFound {
                path: path.to_path_buf(),
                macro_name: macro_name.clone(),
            })?;
        parts.push(value.as_str().to_string());
    }
    Ok(parts.join("."))
}

/// Reads `header_path` and extracts the version from it.
pub async fn read_version(header_path: &Path, prefix: &str) -> Result<String> {
    let header = tokio::fs::read_to_string(header_path)
        .await
        .fs_context("reading version header", header_path)?;
    let version = extract_version(&header, prefix, header_path)?;
    log::debug!("Detected version {} from {}", version, header_path.display());
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\
#ifndef SDL_version_h_
#define SDL_version_h_

/* Printable format: \"%d.%d.%d\", MAJOR, MINOR, PATCHLEVEL */
#define SDL_MAJOR_VERSION   2
#define SDL_MINOR_VERSION   30
#define SDL_PATCHLEVEL      8

#define SDL_VERSION(x) { (x)->major = SDL_MAJOR_VERSION; }
#endif
";

    #[test]
    fn reads_three_components() {
        let version = extract_version(HEADER, "SDL", Path::new("SDL_version.h")).unwrap();
        assert_eq!(version, "2.30.8");
    }

    #[test]
    fn prefix_selects_macros() {
        let header = "#define IMG_MAJOR_VERSION 1\n#define IMG_MINOR_VERSION 2\n#define IMG_PATCHLEVEL 3\n";
        assert_eq!(extract_version(header, "IMG", Path::new("h")).unwrap(), "1.2.3");
        assert!(extract_version(header, "SDL", Path::new("h")).is_err());
    }

    #[test]
    fn missing_macro_is_named() {
        let header = "#define SDL_MAJOR_VERSION 2\n#define SDL_PATCHLEVEL 8\n";
        match extract_version(header, "SDL", Path::new("v.h")).unwrap_err() {
            Error::VersionNotFound { path, macro_name } => {
                assert_eq!(path, Path::new("v.h"));
                assert_eq!(macro_name, "SDL_MINOR_VERSION");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn indented_or_commented_defines_do_not_count() {
        let header = "  #define SDL_MAJOR_VERSION 2\n// #define SDL_MINOR_VERSION 3\n";
        assert!(extract_version(header, "SDL", Path::new("h")).is_err());
    }

    #[tokio::test]
    async fn reads_header_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SDL_version.h");
        std::fs::write(&path, HEADER).unwrap();
        assert_eq!(read_version(&path, "SDL").await.unwrap(), "2.30.8");
    }

    #[tokio::test]
    async fn missing_header_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_version(&dir.path().join("nope.h"), "SDL").await.unwrap_err();
        assert!(matches!(err, Error::Fs { .. }));
    }
}
