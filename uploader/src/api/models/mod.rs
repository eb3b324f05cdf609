//! Request and response data structures for the HTTP API.
//!
//! - [`upload`]: the per-file items and the envelope returned by `/upload`

pub mod upload;
