// ABOUTME: Zip codec for template bundles
// ABOUTME: Writes deterministic archives and reads them back as (path, bytes) entries

use std::io::{Cursor, Read, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use super::error::BundleError;

/// Largest uncompressed entry accepted on import (8 MiB)
pub const MAX_ENTRY_BYTES: u64 = 8 * 1024 * 1024;

/// A file read out of a bundle. Directory entries are never produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    pub path: String,
    pub data: EntryData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryData {
    Complete(Vec<u8>),
    /// Inflates past the limit; nothing beyond the limit was decompressed.
    Oversized,
}

/// Write `(path, content)` pairs into an in-memory zip archive.
///
/// Timestamps and permissions are fixed so identical input yields
/// byte-identical archives.
pub fn write_bundle<'a, I>(files: I) -> Result<Vec<u8>, BundleError>
where
    I: IntoIterator<Item = (String, &'a str)>,
{
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    for (path, content) in files {
        writer.start_file(path, options)?;
        writer.write_all(content.as_bytes())?;
    }

    Ok(writer.finish()?.into_inner())
}

/// Read every file entry of a zip archive.
///
/// The archive is fully consumed before returning; any container-level
/// failure aborts the whole read. An entry whose declared or actual
/// uncompressed size exceeds `max_entry_bytes` comes back as
/// [`EntryData::Oversized`] and the rest are still read.
pub fn read_bundle(bytes: &[u8], max_entry_bytes: u64) -> Result<Vec<BundleEntry>, BundleError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }

        let path = file.name().to_string();
        if file.size() > max_entry_bytes {
            debug!("Bundle entry '{}' declares {} bytes", path, file.size());
            entries.push(BundleEntry {
                path,
                data: EntryData::Oversized,
            });
            continue;
        }

        // The declared size can lie; never inflate more than one byte past the limit.
        let mut data = Vec::new();
        (&mut file)
            .take(max_entry_bytes.saturating_add(1))
            .read_to_end(&mut data)?;

        let data = if data.len() as u64 > max_entry_bytes {
            EntryData::Oversized
        } else {
            EntryData::Complete(data)
        };
        entries.push(BundleEntry { path, data });
    }

    Ok(entries)
}
