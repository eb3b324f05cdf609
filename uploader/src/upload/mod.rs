//! The upload-and-decode pipeline.
//!
//! An upload flows through four stages:
//!
//! 1. [`intake`] pulls the `file` part out of the multipart body.
//! 2. [`payload`] decides between a single file and a ZIP archive and yields one byte stream per
//!    file (the upload itself, or each archive entry in archive order).
//! 3. [`classify`] reads just enough of each stream to report dimensions and MIME type.
//! 4. [`process_upload`] base64-encodes each stream into a fresh buffer and builds the
//!    [`UploadItem`]s, which [`render`] then serializes in the requested [`ResponseFormat`].
//!
//! The result is all-or-nothing: the first failing item aborts the upload and no items are
//! returned.

pub mod classify;
pub mod intake;
pub mod payload;
pub mod render;

use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderStringWriter;
use std::io::{BufRead, Cursor, Seek};
use tracing::debug;

use crate::api::models::upload::UploadItem;
use crate::config::ArchiveLimitsConfig;
use crate::errors::Result;

pub use intake::UploadedFile;
pub use payload::{Payload, PayloadItem};
pub use render::ResponseFormat;

/// Run the synchronous part of the pipeline over a buffered upload.
pub fn process_upload(file: UploadedFile, limits: &ArchiveLimitsConfig) -> Result<Vec<UploadItem>> {
    Payload::expand(file, limits)?
        .map(|item| item.and_then(assemble_item))
        .collect()
}

fn assemble_item(item: PayloadItem) -> Result<UploadItem> {
    let PayloadItem {
        name,
        declared_size,
        data,
    } = item;

    let (info, byte_size, content) = describe(Cursor::new(data))?;

    debug!(
        name = %name,
        declared_size,
        byte_size,
        width = info.width,
        height = info.height,
        mime = info.mime_type,
        "Assembled upload item"
    );

    Ok(UploadItem {
        name,
        content,
        byte_size,
        width: info.width,
        height: info.height,
        mime_type: info.mime_type.to_string(),
    })
}

/// Classify `source`, rewind it, then copy all of it through a base64 encoder.
///
/// Returns the image info, the raw byte count copied, and the encoded text.
fn describe<R: BufRead + Seek>(mut source: R) -> Result<(classify::ImageInfo, u64, String)> {
    let info = classify::classify(&mut source);
    source.rewind()?;

    let mut encoder = EncoderStringWriter::new(&STANDARD);
    let byte_size = std::io::copy(&mut source, &mut encoder)?;

    Ok((info, byte_size, encoder.into_inner()))
}
