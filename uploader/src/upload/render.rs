//! Serialization of an [`UploadResponse`] into the HTTP body.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::models::upload::UploadResponse;

/// Body sent when the response itself cannot be serialized
pub const ENCODING_FALLBACK: &str = r#"{"error":"could not encode json"}"#;

/// How the upload result is delivered to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Plain `application/json`
    Json,
    /// An HTML page assigning the JSON text to `window.response`, for uploads posted through a
    /// hidden iframe where the page cannot read a JSON response directly
    Iframe,
}

impl ResponseFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ResponseFormat::Json => "application/json",
            ResponseFormat::Iframe => "text/html; charset=utf-8",
        }
    }

    /// Serialize `response` into the body for this format. Always succeeds, falling back to
    /// [`ENCODING_FALLBACK`] if serialization fails.
    pub fn body(self, response: &UploadResponse) -> String {
        serde_json::to_string(response)
            .and_then(|json| match self {
                ResponseFormat::Json => Ok(json),
                ResponseFormat::Iframe => iframe_document(&json),
            })
            .unwrap_or_else(|e| {
                error!(error = %e, "Could not encode upload response");
                ENCODING_FALLBACK.to_string()
            })
    }

    pub fn render(self, response: &UploadResponse) -> Response {
        ([(header::CONTENT_TYPE, self.content_type())], self.body(response)).into_response()
    }
}

fn iframe_document(json: &str) -> serde_json::Result<String> {
    let literal = script_safe(&serde_json::to_string(json)?);

    Ok(format!(
        "<!DOCTYPE html><html lang=en><head><meta charset=utf-8>\
         <script type=\"text/javascript\">window.response = {literal};</script>\
         </head><body></body></html>"
    ))
}

/// Escape a JSON string literal so it can sit inside a `<script>` element. The escapes are valid
/// in both JSON and JavaScript, so the literal still evaluates to the same string.
fn script_safe(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

/// Pull the string assigned to `window.response` back out of an iframe document.
#[cfg(test)]
pub(crate) fn iframe_payload(document: &str) -> String {
    let start = document.find("window.response = ").expect("assignment present") + "window.response = ".len();
    let end = document[start..].find(";</script>").expect("script terminated") + start;
    serde_json::from_str(&document[start..end]).expect("assigned value is a string literal")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::upload::UploadItem;

    fn sample_response(name: &str) -> UploadResponse {
        UploadResponse {
            files: Some(vec![UploadItem {
                name: name.to_string(),
                content: "R0lGODlh".to_string(),
                byte_size: 6,
                width: 1,
                height: 1,
                mime_type: "image/gif".to_string(),
            }]),
            error: None,
        }
    }

    #[test]
    fn test_json_body_shape() {
        let body = ResponseFormat::Json.body(&sample_response("pixel.gif"));
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "files": [{
                    "name": "pixel.gif",
                    "content": "R0lGODlh",
                    "filesize": 6,
                    "width": 1,
                    "height": 1,
                    "mime": "image/gif"
                }]
            })
        );
    }

    #[test]
    fn test_error_body_shape() {
        let response = UploadResponse {
            files: None,
            error: Some("No file parameter in POST request".to_string()),
        };

        assert_eq!(
            ResponseFormat::Json.body(&response),
            r#"{"files":null,"error":"No file parameter in POST request"}"#
        );
    }

    #[test]
    fn test_iframe_wraps_json_text() {
        let response = sample_response("pixel.gif");
        let document = ResponseFormat::Iframe.body(&response);

        assert!(document.starts_with("<!DOCTYPE html>"));
        assert_eq!(iframe_payload(&document), ResponseFormat::Json.body(&response));
    }

    #[test]
    fn test_iframe_cannot_close_script_early() {
        let response = sample_response("</script><script>alert(1)</script>\u{2028}&.gif");
        let document = ResponseFormat::Iframe.body(&response);

        assert_eq!(document.matches("</script>").count(), 1);
        assert!(!document.contains('\u{2028}'));
        assert_eq!(iframe_payload(&document), ResponseFormat::Json.body(&response));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(ResponseFormat::Json.content_type(), "application/json");
        assert_eq!(ResponseFormat::Iframe.content_type(), "text/html; charset=utf-8");
    }
}
