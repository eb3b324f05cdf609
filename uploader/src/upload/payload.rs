//! Expansion of an upload into the byte streams that get classified and encoded.
//!
//! An upload is either one file, or a ZIP archive whose file entries are emitted in central
//! directory order. Entries are decompressed one at a time into their own buffer and the
//! archive handle for an entry is released before the next one is opened.

use bytes::Bytes;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

use crate::config::ArchiveLimitsConfig;
use crate::errors::{Result, UploadError};

use super::intake::UploadedFile;

/// Whether `filename` selects the archive path: the last four bytes equal `.zip`, ignoring ASCII
/// case. Names shorter than the extension never match.
pub fn is_zip_filename(filename: &str) -> bool {
    const EXTENSION: &[u8] = b".zip";

    let name = filename.as_bytes();
    name.len() >= EXTENSION.len() && name[name.len() - EXTENSION.len()..].eq_ignore_ascii_case(EXTENSION)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Single,
    Container,
}

impl PayloadKind {
    pub fn for_filename(filename: &str) -> Self {
        if is_zip_filename(filename) {
            PayloadKind::Container
        } else {
            PayloadKind::Single
        }
    }
}

/// One named byte stream to classify and encode.
#[derive(Debug)]
pub struct PayloadItem {
    pub name: String,
    /// Size announced by the source: the upload length, or the entry size from the ZIP index
    pub declared_size: u64,
    pub data: Bytes,
}

/// Iterator over the items of an upload. Stops after the first error.
pub enum Payload {
    Single(Option<PayloadItem>),
    Container(ArchiveEntries),
}

impl Payload {
    pub fn expand(file: UploadedFile, limits: &ArchiveLimitsConfig) -> Result<Self> {
        match PayloadKind::for_filename(&file.filename) {
            PayloadKind::Single => Ok(Payload::Single(Some(PayloadItem {
                name: file.filename,
                declared_size: file.data.len() as u64,
                data: file.data,
            }))),
            PayloadKind::Container => ArchiveEntries::open(file.data, limits).map(Payload::Container),
        }
    }
}

impl Iterator for Payload {
    type Item = Result<PayloadItem>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Payload::Single(item) => item.take().map(Ok),
            Payload::Container(entries) => entries.next(),
        }
    }
}

/// File entries of a ZIP archive held in memory.
pub struct ArchiveEntries {
    archive: ZipArchive<Cursor<Bytes>>,
    next_index: usize,
    max_uncompressed_size: u64,
    remaining: u64,
}

impl ArchiveEntries {
    pub fn open(data: Bytes, limits: &ArchiveLimitsConfig) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))?;

        if archive.len() > limits.max_entries {
            return Err(UploadError::ContainerLimit(format!(
                "archive has too many entries ({} > {})",
                archive.len(),
                limits.max_entries
            )));
        }

        debug!(entries = archive.len(), "Opened ZIP archive");

        Ok(Self {
            archive,
            next_index: 0,
            max_uncompressed_size: limits.max_uncompressed_size,
            remaining: limits.max_uncompressed_size,
        })
    }

    /// Decompress entry `index`. Directory entries yield `None`.
    fn read_entry(&mut self, index: usize) -> Result<Option<PayloadItem>> {
        let name = self.archive.name_for_index(index).unwrap_or_default().to_string();

        let mut entry = self.archive.by_index(index).map_err(|e| UploadError::entry(&name, e))?;
        if entry.is_dir() {
            debug!(entry = %name, "Skipping directory entry");
            return Ok(None);
        }

        let declared_size = entry.size();
        let mut data = Vec::with_capacity(declared_size.min(self.remaining) as usize);
        let read = entry
            .by_ref()
            .take(self.remaining.saturating_add(1))
            .read_to_end(&mut data)
            .map_err(|e| UploadError::entry(&name, e))? as u64;

        if read > self.remaining {
            return Err(UploadError::ContainerLimit(format!(
                "archive expands beyond {} bytes",
                self.max_uncompressed_size
            )));
        }
        self.remaining -= read;

        debug!(entry = %name, declared_size, read, "Read ZIP entry");

        Ok(Some(PayloadItem {
            name,
            declared_size,
            data: Bytes::from(data),
        }))
    }
}

impl Iterator for ArchiveEntries {
    type Item = Result<PayloadItem>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_index < self.archive.len() {
            let index = self.next_index;
            self.next_index += 1;

            match self.read_entry(index) {
                Ok(Some(item)) => return Some(Ok(item)),
                Ok(None) => continue,
                Err(e) => {
                    self.next_index = self.archive.len();
                    return Some(Err(e));
                }
            }
        }
        None
    }
}
