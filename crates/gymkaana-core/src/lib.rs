//! Check-in workflow between `gymkaana-api` and owner-facing front ends.
//!
//! - **[`machine`]**: pure state machine for one scan session. Every
//!   owner action, camera decode and backend result is an [`Event`];
//!   [`transition`] answers with the next [`ScanState`] and the
//!   [`Effect`]s to run. Events that do not fit the current state are
//!   ignored.
//!
//! - **[`CheckinController`]**: runs the machine against a
//!   [`CheckinBackend`], bounds each call by the request timeout, and owns
//!   the live camera. Phase changes are published on a `watch` channel,
//!   owner notices on a `broadcast` channel.
//!
//! - **[`camera`]**: scoped camera access. A [`LiveFeed`] releases the
//!   device when stopped or dropped. [`ProcessCamera`] reads payloads from
//!   an external decoder such as `zbarcam`.
//!
//! - **[`scan_code`]**: turns scanned and typed input into lookup keys.

pub mod backend;
pub mod camera;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod machine;
pub mod model;
pub mod scan_code;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::CheckinBackend;
pub use camera::{Camera, CameraHandle, DeviceError, LiveFeed, ProcessCamera};
pub use config::{CheckinConfig, TlsVerification};
pub use controller::{CheckinController, SessionSettings};
pub use error::{CoreError, INVALID_BOOKING_MESSAGE};
pub use machine::{
    Effect, Event, Failure, FailureKind, LiveScanId, Pending, Phase, ScanState, Transition,
    transition,
};
pub use model::{BookingRecord, ConfirmRequest, Decision, RejectionDraft, RejectionReason};
pub use scan_code::{ScanPrefix, normalize_manual, normalize_scan};
