//! HTTP handlers for image uploads.

use axum::{
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::{Method, Uri},
    response::Response,
};
use tracing::{debug, info, instrument, warn};

use crate::AppState;
use crate::api::models::upload::{UploadItem, UploadResponse};
use crate::errors::{Result, UploadError};
use crate::upload::{self, ResponseFormat, intake};

/// Upload a single image or a ZIP of images, answering with JSON.
#[instrument(skip_all)]
pub async fn upload_json(State(state): State<AppState>, multipart: Result<Multipart, MultipartRejection>) -> Response {
    handle_upload(&state, multipart, ResponseFormat::Json).await
}

/// Upload a single image or a ZIP of images, answering with an HTML page for iframe posts.
///
/// The path segment only selects the format, its value is not used.
#[instrument(skip_all)]
pub async fn upload_iframe(
    State(state): State<AppState>,
    Path(_iframe): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    handle_upload(&state, multipart, ResponseFormat::Iframe).await
}

/// Catch-all for unmatched paths and unsupported methods.
#[instrument(skip_all)]
pub async fn not_a_valid_request(method: Method, uri: Uri) -> String {
    debug!(%method, path = uri.path(), "Unmatched request");
    format!("Not a valid request: {} {}", method, uri.path())
}

async fn handle_upload(state: &AppState, multipart: Result<Multipart, MultipartRejection>, format: ResponseFormat) -> Response {
    let result = match multipart {
        Ok(multipart) => run_pipeline(state, multipart).await,
        Err(rejection) => {
            debug!(%rejection, "Request body is not multipart");
            Err(UploadError::MissingFile)
        }
    };

    match &result {
        Ok(files) => info!(items = files.len(), ?format, "Upload processed"),
        Err(e) => warn!(error = %e, ?format, "Upload failed"),
    }

    format.render(&UploadResponse::from(result))
}

async fn run_pipeline(state: &AppState, multipart: Multipart) -> Result<Vec<UploadItem>> {
    let file = intake::read_file_field(multipart).await?;
    info!(filename = %file.filename, bytes = file.data.len(), "Received upload");

    // Decompression, header parsing and encoding are CPU bound
    let limits = state.config.archive;
    tokio::task::spawn_blocking(move || upload::process_upload(file, &limits)).await?
}
