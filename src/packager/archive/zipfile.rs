//! Deterministic zip writer.

use super::TreeEntry;
use crate::packager::{
    Result,
    error::{Error, ErrorExt},
};
use chrono::{Datelike, Timelike};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Writes `entries`, in the given order, into a deflate zip at `path`.
///
/// Entry times are stored as the committer's wall-clock time (zip has no
/// time zone field), permissions as unix mode bits.
pub fn write_zip(path: &Path, archive_root: &str, entries: &[TreeEntry]) -> Result<()> {
    let file = File::create(path).fs_context("creating zip archive", path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    for entry in entries {
        let name = format!("{archive_root}/{}", entry.path);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip_time(entry)?)
            .unix_permissions(entry.mode);

        log::debug!("Adding {}", name);
        zip.start_file(name, options)?;
        zip.write_all(&entry.content)
            .fs_context("writing zip entry", path)?;
    }

    let mut writer = zip.finish()?;
    writer.flush().fs_context("flushing zip archive", path)?;

    log::debug!("Wrote {} entries to {}", entries.len(), path.display());
    Ok(())
}

fn zip_time(entry: &TreeEntry) -> Result<zip::DateTime> {
    let local = entry.time.naive_local();
    let year = u16::try_from(local.year()).map_err(|_| Error::ZipTimeRange(entry.time.to_rfc3339()))?;

    zip::DateTime::from_date_and_time(
        year,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .map_err(|_| Error::ZipTimeRange(entry.time.to_rfc3339()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::archive::test_support::entry;
    use std::io::Read;

    #[test]
    fn zip_entries_keep_order_mode_and_local_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p-1.0.zip");
        let entries = vec![
            entry("a.txt", 0o644, "hi", "2024-03-14T15:40:24-07:00"),
            entry("b.txt", 0o755, "bye", "2024-03-15T09:00:00+02:00"),
        ];
        write_zip(&path, "p-1.0", &entries).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);

        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "p-1.0/a.txt");
        assert_eq!(first.compression(), CompressionMethod::Deflated);
        assert_eq!(first.unix_mode().unwrap() & 0o777, 0o644);
        let modified = first.last_modified().unwrap();
        assert_eq!(
            (modified.year(), modified.month(), modified.day()),
            (2024, 3, 14)
        );
        assert_eq!(
            (modified.hour(), modified.minute(), modified.second()),
            (15, 40, 24)
        );
        let mut content = String::new();
        first.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hi");
        drop(first);

        let second = archive.by_index(1).unwrap();
        assert_eq!(second.name(), "p-1.0/b.txt");
        assert_eq!(second.unix_mode().unwrap() & 0o777, 0o755);
        assert_eq!(second.last_modified().unwrap().hour(), 9);
    }

    #[test]
    fn dates_before_1980_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.zip");
        let entries = vec![entry("old.c", 0o644, "", "1970-01-01T00:00:00Z")];
        let err = write_zip(&path, "old", &entries).unwrap_err();
        assert!(matches!(err, Error::ZipTimeRange(_)));
    }
}
