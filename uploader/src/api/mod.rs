//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Response data structures
//!
//! # API Structure
//!
//! - `POST /upload`: multipart upload, JSON response
//! - `POST /upload/{iframe}`: same upload, response wrapped in an HTML page for iframe-based forms
//! - anything else: a plain-text `Not a valid request` line
//!
//! Every response is `200 OK`. Upload failures are reported in the body's `error` field.

pub mod handlers;
pub mod models;
