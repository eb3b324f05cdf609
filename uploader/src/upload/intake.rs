//! Extraction of the uploaded file from a multipart body.

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use bytes::Bytes;
use tracing::debug;

use crate::errors::{Result, UploadError};

/// Name of the multipart field carrying the upload
pub const FILE_FIELD: &str = "file";

/// The `file` part of an upload request, fully buffered.
#[derive(Debug)]
pub struct UploadedFile {
    /// Filename as sent by the client, unmodified
    pub filename: String,
    pub data: Bytes,
}

/// Find the first `file` part that carries a filename and read it into memory.
///
/// Parts with other names, and a `file` part without a filename (a plain form value), are skipped.
/// A body that cannot be parsed as multipart counts as having no file, except when it was cut off
/// by the request size limit, which is reported as a read error.
pub async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile> {
    while let Some(field) = multipart.next_field().await.map_err(missing_or_read_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let Some(filename) = field.file_name().map(str::to_string) else {
            debug!("Ignoring file field without a filename");
            continue;
        };

        let data = field.bytes().await.map_err(read_error)?;

        debug!(filename = %filename, bytes = data.len(), "Read upload from multipart body");

        return Ok(UploadedFile { filename, data });
    }

    Err(UploadError::MissingFile)
}

fn read_error(e: MultipartError) -> UploadError {
    UploadError::StreamRead(std::io::Error::other(e.body_text()))
}

fn missing_or_read_error(e: MultipartError) -> UploadError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        read_error(e)
    } else {
        debug!(error = %e, "Could not parse multipart body");
        UploadError::MissingFile
    }
}
