//! # creative-uploader: image upload decoding service
//!
//! `creative-uploader` is a small HTTP service for ad-creative upload forms. A client posts a
//! single image, or a ZIP archive of images, as the `file` field of a multipart form. The service
//! reads each image's header to find its pixel dimensions and format, base64-encodes the raw
//! bytes, and answers with a JSON description of every file. Nothing is stored.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum). The work happens in the
//! [`upload`] pipeline: the multipart body is buffered (bounded by `max_upload_size`), expanded
//! into one byte stream per file, and each stream is classified and encoded on tokio's blocking
//! pool. Requests share no mutable state.
//!
//! Every response is `200 OK` with `Access-Control-Allow-Origin: *`. Failures are reported in
//! the `error` field of the body, see [`errors::UploadError`] for the messages.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use creative_uploader::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = creative_uploader::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     creative_uploader::telemetry::init_telemetry()?;
//!
//!     Application::new(config)
//!         .serve(async {
//!             tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!         })
//!         .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod config;
pub mod errors;
pub mod telemetry;
pub mod upload;

#[cfg(test)]
mod test_utils;

use api::handlers::upload::{not_a_valid_request, upload_iframe, upload_json};
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, header};
use axum::{Router, routing::post};
pub use config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

/// Build the application router with all endpoints and middleware.
///
/// - `POST /upload` and `POST /upload/{iframe}`
/// - a catch-all answering `Not a valid request: <METHOD> <PATH>`, also used for wrong methods
///   on the upload paths
/// - request body limit and request timeout from configuration
/// - `Access-Control-Allow-Origin: *` on every response
/// - tracing middleware
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        .route("/upload", post(upload_json).fallback(not_a_valid_request))
        .route("/upload/{iframe}", post(upload_iframe).fallback(not_a_valid_request))
        .fallback(not_a_valid_request)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_size))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ));

    // Add tracing layer
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// Main application struct that owns the router and configuration.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] builds the router from configuration
/// 2. **Serve**: [`Application::serve`] binds to the configured address and starts handling requests
/// 3. **Shutdown**: When the shutdown future resolves, in-flight requests finish and the server stops
pub struct Application {
    router: Router,
    config: Arc<Config>,
}

impl Application {
    pub fn new(config: Config) -> Self {
        debug!("Starting uploader with configuration: {:#?}", config);

        let config = Arc::new(config);
        let router = build_router(AppState { config: config.clone() });

        Self { router, config }
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&self.config.bind).await?;
        info!("Uploader listening on http://{}", listener.local_addr()?);

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Uploader stopped");
        Ok(())
    }
}
