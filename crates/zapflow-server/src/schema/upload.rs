//! Media upload payloads.

use serde::Serialize;

/// An uploaded file returned inline. The base64 payload is embedded by the
/// editor into a media node's `mediaUrl` as a data URI.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub base64: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub size: usize,
}
