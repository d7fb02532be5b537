// ── Runtime check-in configuration ──
//
// Describes how to reach the backend and how to drive the scanner. Never
// touches disk: the CLI resolves profiles and hands a `CheckinConfig` in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::camera::{DeviceError, ProcessCamera};
use crate::scan_code::ScanPrefix;

/// Default request timeout for lookup and confirm calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default decoder command for live scans.
pub const DEFAULT_SCANNER_COMMAND: &[&str] = &["zbarcam", "--raw", "--nodisplay"];

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Only for local test backends.
    DangerAcceptInvalid,
}

/// Everything needed to run check-ins against one backend.
#[derive(Debug, Clone)]
pub struct CheckinConfig {
    /// Backend base URL (e.g. `https://api.gymkaana.com`).
    pub api_url: Url,
    /// Owner bearer token.
    pub token: SecretString,
    pub tls: TlsVerification,
    /// Upper bound for each backend call.
    pub timeout: Duration,
    /// Marker stripped from scanned payloads.
    pub scan_prefix: String,
    /// `[program, args..]` of the decoder used for live scans.
    pub scanner_command: Vec<String>,
}

impl CheckinConfig {
    /// Config with default timeout, prefix and scanner.
    pub fn new(api_url: Url, token: SecretString) -> Self {
        Self {
            api_url,
            token,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            scan_prefix: crate::scan_code::DEFAULT_MARKER.to_owned(),
            scanner_command: DEFAULT_SCANNER_COMMAND
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        }
    }

    pub fn prefix(&self) -> ScanPrefix {
        ScanPrefix::new(self.scan_prefix.clone())
    }

    /// The decoder camera described by `scanner_command`.
    pub fn camera(&self) -> Result<ProcessCamera, DeviceError> {
        ProcessCamera::from_command_line(&self.scanner_command)
    }
}
