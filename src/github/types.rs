//! Wire types for the GitHub contents API, plus the base64 transport codec.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// One entry from a directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    pub name: String,
    pub path: String,
    /// Blob sha — the opaque concurrency token for this file's content.
    pub sha: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub download_url: Option<String>,
}

impl RemoteFile {
    /// True for regular Markdown files (directories and symlinks are
    /// skipped by the bulk refresh).
    pub fn is_markdown(&self) -> bool {
        self.kind == "file" && self.name.ends_with(".md")
    }
}

/// Single-file read response (JSON `Accept` variant).
#[derive(Debug, Deserialize)]
pub struct ContentFile {
    pub name: String,
    pub path: String,
    pub sha: String,
    /// Base64 with embedded newlines every 60 characters, per the API.
    pub content: String,
    pub encoding: String,
}

/// PUT body for create-or-update.
#[derive(Debug, Serialize)]
pub struct PutContentRequest {
    pub message: String,
    /// Base64-encoded file bytes.
    pub content: String,
    pub branch: String,
    /// Current blob sha. Omit to create; include to update — a mismatch
    /// makes the API reject the write with a conflict status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// PUT response envelope.
#[derive(Debug, Deserialize)]
pub struct PutContentResponse {
    pub content: PutContentInfo,
}

#[derive(Debug, Deserialize)]
pub struct PutContentInfo {
    pub name: String,
    pub path: String,
    /// The new blob sha after the write.
    pub sha: String,
    pub html_url: Option<String>,
}

/// Opaque concurrency token: the remote blob sha for a file's content.
///
/// Kept as a dedicated type so a stale token can never be confused with a
/// path or any other string on its way back into a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSha(String);

impl FileSha {
    pub fn new(sha: impl Into<String>) -> Self {
        FileSha(sha.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of a successful write, surfaced to the document layer.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub sha: FileSha,
    pub canonical_url: Option<String>,
}

/// Encode raw bytes for transport in a PUT body.
pub fn encode_content(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode a base64 content field into UTF-8 text.
///
/// The API wraps base64 at 60 columns, so embedded newlines (and any other
/// ASCII whitespace) are stripped before decoding.
pub fn decode_content(content: &str) -> Result<String, StoreError> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| StoreError::InvalidContent(format!("base64 decode failed: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| StoreError::InvalidContent(format!("content is not UTF-8: {}", e)))
}
