//! Header-only image classification.

use image::{ImageFormat, ImageReader};
use std::io::{BufRead, Seek};
use tracing::trace;

/// MIME type reported for anything that is not a recognized image header
pub const UNKNOWN_MIME: &str = "application/unknown";

/// Formats whose headers are read for dimensions.
const SUPPORTED_FORMATS: [ImageFormat; 3] = [ImageFormat::Gif, ImageFormat::Jpeg, ImageFormat::Png];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub mime_type: &'static str,
}

impl ImageInfo {
    pub const UNKNOWN: ImageInfo = ImageInfo {
        width: 0,
        height: 0,
        mime_type: UNKNOWN_MIME,
    };
}

/// Read width, height and MIME type from the start of `reader` without decoding pixels.
///
/// Never fails: unreadable or unrecognized input is [`ImageInfo::UNKNOWN`]. The reader is left at
/// an unspecified position, callers rewind before reusing it.
pub fn classify<R: BufRead + Seek>(reader: R) -> ImageInfo {
    read_header(reader).unwrap_or_else(|| {
        trace!("Content is not a recognized image");
        ImageInfo::UNKNOWN
    })
}

fn read_header<R: BufRead + Seek>(reader: R) -> Option<ImageInfo> {
    let reader = ImageReader::new(reader).with_guessed_format().ok()?;
    let format = reader.format().filter(|format| SUPPORTED_FORMATS.contains(format))?;
    let (width, height) = reader.into_dimensions().ok()?;

    Some(ImageInfo {
        width,
        height,
        mime_type: format.to_mime_type(),
    })
}
