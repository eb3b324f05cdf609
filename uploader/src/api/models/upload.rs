use serde::{Deserialize, Serialize};

use crate::errors::UploadError;

/// One processed file: the upload itself, or one entry of an uploaded archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadItem {
    pub name: String,
    /// Standard base64 of the raw bytes
    pub content: String,
    /// Raw byte count before encoding
    #[serde(rename = "filesize")]
    pub byte_size: u64,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "mime")]
    pub mime_type: String,
}

/// Body of every `/upload` response.
///
/// Exactly one of the two is meaningful: `files` is `null` when `error` is present.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    pub files: Option<Vec<UploadItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<Vec<UploadItem>, UploadError>> for UploadResponse {
    fn from(result: Result<Vec<UploadItem>, UploadError>) -> Self {
        match result {
            Ok(files) => Self {
                files: Some(files),
                error: None,
            },
            Err(e) => Self {
                files: None,
                error: Some(e.to_string()),
            },
        }
    }
}
