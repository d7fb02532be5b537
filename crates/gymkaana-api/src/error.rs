use thiserror::Error;

/// Top-level error type for the `gymkaana-api` crate.
///
/// Covers every failure mode of the check-in endpoints: authorization,
/// transport, HTTP status errors, and malformed payloads.
/// `gymkaana-core` maps these into the check-in failure taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authorization ───────────────────────────────────────────────
    /// The backend refused the owner's token (HTTP 401/403).
    #[error("Unauthorized (HTTP {status}): {}", .message.as_deref().unwrap_or("access denied"))]
    Unauthorized {
        status: u16,
        message: Option<String>,
    },

    /// Token could not be encoded as a header value.
    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// The identifier did not resolve to a booking (HTTP 404).
    #[error("Not found: {}", .message.as_deref().unwrap_or("no booking for this identifier"))]
    NotFound { message: Option<String> },

    /// The backend answered 2xx but declined the check-in.
    #[error("Check-in declined: {}", .message.as_deref().unwrap_or("no reason given"))]
    Declined { message: Option<String> },

    /// Any other non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the owner's credentials were rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::NotFound { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the request never got an answer in time.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// The message the server attached to the failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message, .. }
            | Self::NotFound { message }
            | Self::Declined { message } => message.as_deref(),
            Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}
