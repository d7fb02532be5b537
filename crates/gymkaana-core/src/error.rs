// ── Core error types ──
//
// User-facing errors from gymkaana-core. Consumers never see HTTP status
// codes or JSON parse failures directly. The `From<gymkaana_api::Error>`
// impl folds transport-layer errors into the check-in failure taxonomy.

use thiserror::Error;

/// Shown when a lookup fails without a usable server message.
pub const INVALID_BOOKING_MESSAGE: &str = "Invalid or Expired Booking ID";

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup / authorization ───────────────────────────────────────
    #[error("{}", .message.as_deref().unwrap_or(INVALID_BOOKING_MESSAGE))]
    NotFound { message: Option<String> },

    #[error("{}", .message.as_deref().unwrap_or("You are not allowed to check in this booking"))]
    Unauthorized { message: Option<String> },

    // ── Device ───────────────────────────────────────────────────────
    #[error("Camera error: {0}")]
    Device(#[from] crate::camera::DeviceError),

    // ── Transport ────────────────────────────────────────────────────
    #[error("{message}")]
    Transport { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("{}", .message.as_deref().unwrap_or("The check-in was declined"))]
    Rejected { message: Option<String> },

    #[error("{message}")]
    Validation { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<gymkaana_api::Error> for CoreError {
    fn from(err: gymkaana_api::Error) -> Self {
        use gymkaana_api::Error as Api;

        match err {
            Api::Unauthorized { message, .. } => CoreError::Unauthorized { message },
            Api::InvalidToken(reason) => CoreError::Config {
                message: format!("invalid API token: {reason}"),
            },
            Api::NotFound { message } => CoreError::NotFound { message },
            Api::Declined { message } => CoreError::Rejected { message },
            Api::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            Api::Transport(ref e) if e.is_timeout() => CoreError::Timeout { timeout_secs: 0 },
            Api::Transport(e) => CoreError::Transport {
                message: e.to_string(),
            },
            Api::Tls(msg) => CoreError::Transport {
                message: format!("TLS error: {msg}"),
            },
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Api { status, message } => CoreError::Transport {
                message: if message.is_empty() {
                    format!("HTTP {status}")
                } else {
                    message
                },
            },
            Api::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_falls_back_to_generic_message() {
        let err = CoreError::from(gymkaana_api::Error::NotFound { message: None });
        assert_eq!(err.to_string(), INVALID_BOOKING_MESSAGE);
    }

    #[test]
    fn server_message_is_kept_verbatim() {
        let err = CoreError::from(gymkaana_api::Error::NotFound {
            message: Some("Booking was cancelled".into()),
        });
        assert_eq!(err.to_string(), "Booking was cancelled");

        let err = CoreError::from(gymkaana_api::Error::Api {
            status: 500,
            message: "database offline".into(),
        });
        assert_eq!(err.to_string(), "database offline");
    }

    #[test]
    fn declined_becomes_rejected() {
        let err = CoreError::from(gymkaana_api::Error::Declined {
            message: Some("Already checked in".into()),
        });
        assert!(matches!(err, CoreError::Rejected { .. }));
        assert_eq!(err.to_string(), "Already checked in");
    }
}
