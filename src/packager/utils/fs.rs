//! File system utilities for packaging.
//!
//! Idempotent directory handling with file-system context on every error.

use crate::packager::error::{ErrorExt, Result};
use std::{io, path::Path};
use tokio::fs;

/// Creates all of the directories of the specified path.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Reads a small text file, returning `None` unless `path` is a regular file.
pub async fn read_regular_file_text(path: &Path) -> Result<Option<String>> {
    match fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => return Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).fs_context("inspecting", path),
    }

    let text = fs::read_to_string(path)
        .await
        .fs_context("reading", path)?;
    Ok(Some(text))
}

/// Size of the file at `path` in bytes.
pub async fn file_size(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path)
        .await
        .fs_context("reading artifact metadata", path)?;
    Ok(metadata.len())
}
