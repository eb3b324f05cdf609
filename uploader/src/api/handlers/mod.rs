//! HTTP request handlers.
//!
//! - [`upload`]: the upload endpoint in both response formats, and the catch-all for unmatched requests

pub mod upload;
