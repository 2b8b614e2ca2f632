//! Error taxonomy for dialog operations.

use thiserror::Error;

/// Everything that can go wrong between the catalog, the session and the
/// host window.
#[derive(Debug, Error)]
pub enum DialogError {
    /// The catalog answered with a status other than the one the operation
    /// expects (200 for search, 201 for create).
    #[error("remote request failed with status {status}")]
    RemoteRequestFailed { status: u16 },

    /// The HTTP exchange itself failed (connection refused, timeout, ...).
    #[error("request failed: {0}")]
    Transfer(String),

    /// The body was not JSON, or not the JSON shape we expected.
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// No transport matched the fragment.  Only raised in strict mode;
    /// otherwise the response is silently dropped.
    #[error("no response transport for fragment {fragment:?}")]
    UnknownTransport { fragment: Option<String> },

    #[error("dialog session has already responded")]
    AlreadyResponded,

    /// A row index past the end of the results list.
    #[error("no result row {row} ({len} results)")]
    NoSuchRow { row: usize, len: usize },

    /// The host window refused a navigation or message post.
    #[error("host window: {0}")]
    Host(String),
}

impl From<reqwest::Error> for DialogError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transfer(err.to_string())
    }
}
