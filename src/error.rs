use std::fmt;

/// Error taxonomy for the content store.
///
/// Every variant is terminal for its single attempt — nothing in this crate
/// retries. Read paths may degrade to cached data on `Transport`/`Api`
/// failures; write paths always surface the error.
#[derive(Debug)]
pub enum StoreError {
    /// No credential or repository target is set. Never retried; the user
    /// must fix configuration.
    NotConfigured,
    /// A request URL could not be composed from the configured target.
    InvalidUrl(String),
    /// DNS/timeout/connection failure before an HTTP status was obtained.
    Transport(reqwest::Error),
    /// Non-2xx response from the remote, other than the special-cased
    /// 404 (absent, read layer) and 409 (conflict, write layer).
    Api { status: u16, message: String },
    /// The response body did not match the expected listing/metadata schema.
    InvalidResponse(String),
    /// The transport encoding (base64 / UTF-8) of file content was malformed.
    InvalidContent(String),
    /// The write's concurrency token no longer matches the remote blob.
    /// The caller must reload the document before retrying.
    Conflict { path: String },
}

impl StoreError {
    /// Check if this is an API error with the given status code.
    pub fn is_status(&self, code: u16) -> bool {
        matches!(self, StoreError::Api { status, .. } if *status == code)
    }

    pub fn is_not_found(&self) -> bool {
        self.is_status(404)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. }) || self.is_status(409)
    }

    /// True for failures where falling back to cached data is safe.
    pub fn is_degradable(&self) -> bool {
        matches!(self, StoreError::Transport(_) | StoreError::Api { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotConfigured => {
                write!(f, "GitHub token or repository target is not configured")
            }
            StoreError::InvalidUrl(url) => write!(f, "Invalid request URL: {}", url),
            StoreError::Transport(e) => write!(f, "Transport error: {}", e),
            StoreError::Api { status, message } => write!(f, "[HTTP {}] {}", status, message),
            StoreError::InvalidResponse(msg) => write!(f, "Unexpected response shape: {}", msg),
            StoreError::InvalidContent(msg) => write!(f, "Malformed file content: {}", msg),
            StoreError::Conflict { path } => {
                write!(f, "Write conflict on {}: remote content has changed", path)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Transport(e)
    }
}
