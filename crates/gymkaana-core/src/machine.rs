// ── Check-in state machine ──
//
// Pure transition function for the scanner workflow. No I/O happens here:
// every side effect is returned as an `Effect` for the controller to run,
// and every result comes back in as an `Event`. Any (state, event) pair
// not listed below is ignored, which is what keeps late camera decodes and
// double submissions from doing anything.

use std::fmt;

use strum::{Display, IntoStaticStr};
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::{BookingRecord, ConfirmRequest, RejectionDraft, RejectionReason};
use crate::scan_code::{ScanPrefix, normalize_manual, normalize_scan};

// ── LiveScanId ───────────────────────────────────────────────────────

/// Identifies one live camera session. Decodes carry the id of the session
/// that produced them so stale ones can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LiveScanId(Uuid);

impl LiveScanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LiveScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LiveScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Phase ────────────────────────────────────────────────────────────

/// Data-free view of [`ScanState`], for observers and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Scanning,
    Processing,
    Reviewing,
    Rejecting,
    Success,
    Error,
}

// ── Failure ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FailureKind {
    NotFound,
    Unauthorized,
    Device,
    Transport,
    Timeout,
    Rejected,
}

/// What went wrong, as shown to the owner in the `error` state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&CoreError> for Failure {
    fn from(err: &CoreError) -> Self {
        let kind = match err {
            CoreError::NotFound { .. } => FailureKind::NotFound,
            CoreError::Unauthorized { .. } => FailureKind::Unauthorized,
            CoreError::Device(_) => FailureKind::Device,
            CoreError::Timeout { .. } => FailureKind::Timeout,
            CoreError::Rejected { .. } | CoreError::Validation { .. } => FailureKind::Rejected,
            CoreError::Transport { .. } | CoreError::Config { .. } | CoreError::Internal(_) => {
                FailureKind::Transport
            }
        };
        Self::new(kind, err.to_string())
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// ── ScanState ────────────────────────────────────────────────────────

/// What a `processing` state is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Lookup { code: String },
    Accept { record: BookingRecord },
    Reject { record: BookingRecord, reason: String },
}

/// The scan session. Booking data only exists in the variants that may
/// show it, so it cannot be read while scanning or looking up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// Waiting for input. `live` is set while a camera is armed.
    Scanning { live: Option<LiveScanId> },
    Processing(Pending),
    Reviewing { record: BookingRecord },
    Rejecting {
        record: BookingRecord,
        draft: RejectionDraft,
    },
    Success { record: BookingRecord },
    Error { failure: Failure },
}

impl Default for ScanState {
    fn default() -> Self {
        Self::Scanning { live: None }
    }
}

impl ScanState {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Scanning { .. } => Phase::Scanning,
            Self::Processing(_) => Phase::Processing,
            Self::Reviewing { .. } => Phase::Reviewing,
            Self::Rejecting { .. } => Phase::Rejecting,
            Self::Success { .. } => Phase::Success,
            Self::Error { .. } => Phase::Error,
        }
    }

    /// The booking under review, if this state holds one.
    pub fn record(&self) -> Option<&BookingRecord> {
        match self {
            Self::Reviewing { record }
            | Self::Rejecting { record, .. }
            | Self::Success { record }
            | Self::Processing(Pending::Accept { record } | Pending::Reject { record, .. }) => {
                Some(record)
            }
            Self::Scanning { .. } | Self::Processing(Pending::Lookup { .. }) | Self::Error { .. } => {
                None
            }
        }
    }

    pub fn draft(&self) -> Option<&RejectionDraft> {
        match self {
            Self::Rejecting { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Error { failure } => Some(failure),
            _ => None,
        }
    }

    pub fn live_scan(&self) -> Option<LiveScanId> {
        match self {
            Self::Scanning { live } => *live,
            _ => None,
        }
    }
}

// ── Events & effects ─────────────────────────────────────────────────

/// Inputs to the machine: owner actions, device callbacks, and the
/// results of effects.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Event {
    LiveScanStarted(LiveScanId),
    LiveScanStopped,
    CodeDecoded { scan: LiveScanId, payload: String },
    ManualEntry(String),
    CameraFailed(String),
    LookupSucceeded(BookingRecord),
    LookupFailed(Failure),
    Accept,
    Reject,
    SelectReason(RejectionReason),
    EditNote(String),
    ConfirmReject,
    CancelReject,
    ConfirmSucceeded,
    ConfirmFailed(Failure),
    Dismiss,
    Retry,
    Reset,
}

impl Event {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Work the controller must perform after a transition, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StopCamera,
    Lookup { code: String },
    Confirm(ConfirmRequest),
    /// Transient message for the owner.
    Notify(String),
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Transition {
    pub state: ScanState,
    pub effects: Vec<Effect>,
    /// The event was not valid in the previous state; `state` is unchanged.
    pub ignored: bool,
}

impl Transition {
    fn to(state: ScanState) -> Self {
        Self::with(state, Vec::new())
    }

    fn with(state: ScanState, effects: Vec<Effect>) -> Self {
        Self {
            state,
            effects,
            ignored: false,
        }
    }

    fn ignored(state: ScanState) -> Self {
        Self {
            state,
            effects: Vec::new(),
            ignored: true,
        }
    }
}

// ── Transition function ──────────────────────────────────────────────

/// Apply `event` to `state`.
pub fn transition(state: ScanState, event: Event, prefix: &ScanPrefix) -> Transition {
    use ScanState::{Error, Processing, Rejecting, Reviewing, Scanning, Success};

    match (state, event) {
        // ── Scanning ────────────────────────────────────────────────
        (Scanning { live: None }, Event::LiveScanStarted(scan)) => {
            Transition::to(Scanning { live: Some(scan) })
        }
        (Scanning { live: Some(_) }, Event::LiveScanStopped) => {
            Transition::with(Scanning { live: None }, vec![Effect::StopCamera])
        }
        (Scanning { live: Some(active) }, Event::CodeDecoded { scan, payload })
            if active == scan =>
        {
            match normalize_scan(&payload, prefix) {
                Some(code) => Transition::with(
                    Processing(Pending::Lookup { code: code.clone() }),
                    vec![Effect::StopCamera, Effect::Lookup { code }],
                ),
                None => Transition::ignored(Scanning { live: Some(active) }),
            }
        }
        (Scanning { live }, Event::ManualEntry(input)) => match normalize_manual(&input) {
            Some(code) => {
                let mut effects = Vec::with_capacity(2);
                if live.is_some() {
                    effects.push(Effect::StopCamera);
                }
                effects.push(Effect::Lookup { code: code.clone() });
                Transition::with(Processing(Pending::Lookup { code }), effects)
            }
            None => Transition::ignored(Scanning { live }),
        },
        (Scanning { .. }, Event::CameraFailed(message)) => Transition::with(
            Error {
                failure: Failure::new(FailureKind::Device, message),
            },
            vec![Effect::StopCamera],
        ),

        // ── Lookup results ──────────────────────────────────────────
        (Processing(Pending::Lookup { .. }), Event::LookupSucceeded(record)) => {
            Transition::to(Reviewing { record })
        }
        (Processing(Pending::Lookup { .. }), Event::LookupFailed(failure)) => {
            Transition::to(Error { failure })
        }

        // ── Review ──────────────────────────────────────────────────
        (Reviewing { record }, Event::Accept) => {
            let request = ConfirmRequest::accept(record.id.clone());
            Transition::with(
                Processing(Pending::Accept { record }),
                vec![Effect::Confirm(request)],
            )
        }
        (Reviewing { record }, Event::Reject) => Transition::to(Rejecting {
            record,
            draft: RejectionDraft::default(),
        }),

        // ── Rejecting ───────────────────────────────────────────────
        (Rejecting { record, mut draft }, Event::SelectReason(reason)) => {
            draft.select(reason);
            Transition::to(Rejecting { record, draft })
        }
        (Rejecting { record, mut draft }, Event::EditNote(note)) => {
            draft.set_note(note);
            Transition::to(Rejecting { record, draft })
        }
        (Rejecting { record, draft }, Event::ConfirmReject) => match draft.resolve() {
            Ok(reason) => {
                let request = ConfirmRequest::reject(record.id.clone(), reason.clone());
                Transition::with(
                    Processing(Pending::Reject { record, reason }),
                    vec![Effect::Confirm(request)],
                )
            }
            Err(_) => Transition::ignored(Rejecting { record, draft }),
        },
        (Rejecting { record, .. }, Event::CancelReject) => Transition::to(Reviewing { record }),

        // ── Confirm results ─────────────────────────────────────────
        (Processing(Pending::Accept { record }), Event::ConfirmSucceeded) => {
            Transition::to(Success { record })
        }
        (Processing(Pending::Reject { record, reason }), Event::ConfirmSucceeded) => {
            Transition::with(
                Scanning { live: None },
                vec![Effect::Notify(format!(
                    "Check-in rejected for {}: {reason}",
                    record.member_name
                ))],
            )
        }
        (
            Processing(Pending::Accept { .. } | Pending::Reject { .. }),
            Event::ConfirmFailed(failure),
        ) => Transition::to(Error { failure }),

        // ── Terminal states ─────────────────────────────────────────
        (Success { .. }, Event::Dismiss) | (Error { .. }, Event::Retry) => {
            Transition::to(Scanning { live: None })
        }

        (_, Event::Reset) => Transition::with(Scanning { live: None }, vec![Effect::StopCamera]),

        (state, _) => Transition::ignored(state),
    }
}
