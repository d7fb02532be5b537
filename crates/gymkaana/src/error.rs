//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors, and failed check-in sessions, into
//! user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use gymkaana_config::ConfigError;
use gymkaana_core::{CoreError, Failure, FailureKind};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const DEVICE: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Lookup ───────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(gymkaana::not_found),
        help("Check the code with the member, or ask them to reopen the booking QR in the app.")
    )]
    BookingNotFound { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(gymkaana::auth_failed),
        help(
            "The backend refused the owner token.\n\
             Run: {set_token}"
        )
    )]
    AuthFailed { message: String, set_token: String },

    #[error("No token configured for profile '{profile}'")]
    #[diagnostic(
        code(gymkaana::no_credentials),
        help(
            "Configure a token with: gymkaana config init\n\
             Or set the GYMKAANA_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Transport ────────────────────────────────────────────────────
    #[error("Could not reach the check-in backend: {message}")]
    #[diagnostic(
        code(gymkaana::connection_failed),
        help(
            "Check your network connection and the profile's api_url.\n\
             Try: gymkaana config show"
        )
    )]
    ConnectionFailed { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(gymkaana::timeout),
        help("Increase the timeout with --timeout or check the backend's responsiveness.")
    )]
    Timeout { message: String },

    // ── Check-in ─────────────────────────────────────────────────────
    #[error("Check-in was not recorded: {message}")]
    #[diagnostic(code(gymkaana::declined))]
    Declined { message: String },

    // ── Camera ───────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(gymkaana::camera),
        help(
            "Install zbar (zbarcam) or set scanner_command in your profile.\n\
             Without a camera, run `gymkaana scan` and type codes by hand."
        )
    )]
    Camera { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(gymkaana::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(gymkaana::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: gymkaana config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(gymkaana::no_config),
        help(
            "Create one with: gymkaana config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(gymkaana::config))]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(gymkaana::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("'{command}' needs an interactive terminal")]
    #[diagnostic(
        code(gymkaana::not_interactive),
        help("Use `gymkaana lookup`, `accept` and `reject` from scripts.")
    )]
    NotInteractive { command: String },

    // ── Internal / IO ────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(gymkaana::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::BookingNotFound { .. } => exit_code::NOT_FOUND,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Camera { .. } => exit_code::DEVICE,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::NotInteractive { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Map a failed session to an error, naming `profile` in auth help
    /// when it is known.
    pub fn from_failure(failure: &Failure, profile: Option<&str>) -> Self {
        let message = failure.message.clone();
        match failure.kind {
            FailureKind::NotFound => Self::BookingNotFound { message },
            FailureKind::Unauthorized => Self::AuthFailed {
                message,
                set_token: match profile {
                    Some(name) => format!("gymkaana config set-token --profile {name}"),
                    None => "gymkaana config set-token".into(),
                },
            },
            FailureKind::Device => Self::Camera { message },
            FailureKind::Transport => Self::ConnectionFailed { message },
            FailureKind::Timeout => Self::Timeout { message },
            FailureKind::Rejected => Self::Declined { message },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
            other => CliError::from_failure(&Failure::from(&other), None),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Keyring(e) => CliError::Validation {
                field: "keyring".into(),
                reason: e.to_string(),
            },
            ConfigError::Serialization(e) => CliError::Internal(e.to_string()),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
