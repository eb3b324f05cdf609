use thiserror::Error as ThisError;

/// Failures of the upload pipeline.
///
/// None of these become an HTTP error status. The `Display` output is what the
/// client reads back from the `error` field of the response body, so the
/// messages are part of the wire contract.
#[derive(ThisError, Debug)]
pub enum UploadError {
    /// No usable `file` part in the multipart body (absent, or the body is not multipart at all)
    #[error("No file parameter in POST request")]
    MissingFile,

    /// I/O failure while reading or encoding bytes
    #[error("Error reading file: {0}")]
    StreamRead(#[from] std::io::Error),

    /// The upload was named like a ZIP archive but its index could not be parsed
    #[error("Could not read ZIP file: {0}")]
    InvalidContainer(#[from] zip::result::ZipError),

    /// The archive parsed but exceeds the configured entry count or decompressed size
    #[error("Could not read ZIP file: {0}")]
    ContainerLimit(String),

    /// A single entry inside an otherwise valid archive could not be opened or read
    #[error("Could not open file in ZIP: {name}: {source}")]
    ContainerEntry {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The blocking worker running the pipeline panicked or was cancelled
    #[error("Error processing upload: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl UploadError {
    pub(crate) fn entry(name: impl Into<String>, source: impl Into<std::io::Error>) -> Self {
        Self::ContainerEntry {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Configuration rejected at startup.
#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("Config validation: {0}")]
    Invalid(String),
}

pub type Result<T, E = UploadError> = std::result::Result<T, E>;
