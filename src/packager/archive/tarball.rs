//! Deterministic compressed tar writer.
//!
//! Entries get GNU headers carrying only the path, mode, size and mtime of
//! the [`TreeEntry`]; ownership is always root with empty user and group
//! names, so nothing about the build machine leaks into the archive.

use super::TreeEntry;
use crate::packager::{
    Result,
    error::{Error, ErrorExt},
};
use flate2::{Compression, write::GzEncoder};
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Read, Seek, SeekFrom, Write},
    path::Path,
};
use xz2::write::XzEncoder;

/// Offset of the 4-byte MTIME field in a gzip member header.
const GZIP_MTIME_OFFSET: u64 = 4;

/// Compression preset for xz output.
const XZ_PRESET: u32 = 6;

/// Compression applied to a tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TarCompression {
    /// gzip (deflate)
    Gzip,
    /// xz (LZMA2)
    Xz,
}

/// Writes `entries`, in the given order, into a compressed tar at `path`.
///
/// Every entry is stored as `<archive_root>/<entry path>`.
pub fn write_tar(
    path: &Path,
    archive_root: &str,
    entries: &[TreeEntry],
    compression: TarCompression,
) -> Result<()> {
    let file = File::create(path).fs_context("creating tar archive", path)?;
    let writer = BufWriter::new(file);

    let mut writer = match compression {
        TarCompression::Gzip => {
            let encoder = GzEncoder::new(writer, Compression::default());
            append_entries(encoder, archive_root, entries)?
                .finish()
                .fs_context("finishing gzip stream", path)?
        }
        TarCompression::Xz => {
            let encoder = XzEncoder::new(writer, XZ_PRESET);
            append_entries(encoder, archive_root, entries)?
                .finish()
                .fs_context("finishing xz stream", path)?
        }
    };
    writer.flush().fs_context("flushing tar archive", path)?;

    log::debug!("Wrote {} entries to {}", entries.len(), path.display());
    Ok(())
}

fn append_entries<W: Write>(writer: W, archive_root: &str, entries: &[TreeEntry]) -> Result<W> {
    let mut builder = tar::Builder::new(writer);

    for entry in entries {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_mode(entry.mode & 0o7777);
        header.set_size(entry.content.len() as u64);
        header.set_mtime(u64::try_from(entry.time.timestamp()).unwrap_or(0));
        header.set_uid(0);
        header.set_gid(0);

        let name = format!("{archive_root}/{}", entry.path);
        log::debug!("Adding {}", name);
        builder
            .append_data(&mut header, &name, entry.content.as_slice())
            .map_err(|e| Error::GenericError(format!("adding {name} to tar archive: {e}")))?;
    }

    builder
        .into_inner()
        .map_err(|e| Error::GenericError(format!("finishing tar stream: {e}")))
}

/// Zeroes the MTIME field of the gzip header at the start of `path`.
///
/// The gzip header carries its own timestamp independent of the tar entry
/// times; clearing it makes the file depend on the entries alone.
pub fn scrub_gzip_timestamp(path: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .fs_context("opening gzip archive", path)?;

    let mut magic = [0u8; 2];
    file.read_exact(&mut magic)
        .fs_context("reading gzip header", path)?;
    if magic != [0x1f, 0x8b] {
        return Err(Error::GenericError(format!(
            "{} is not a gzip file",
            path.display()
        )));
    }

    file.seek(SeekFrom::Start(GZIP_MTIME_OFFSET))
        .fs_context("seeking gzip header", path)?;
    file.write_all(&[0u8; 4])
        .fs_context("clearing gzip timestamp", path)?;
    file.flush().fs_context("flushing gzip archive", path)?;
    Ok(())
}
