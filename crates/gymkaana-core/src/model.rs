// ── Check-in domain types ──
//
// What the owner sees and decides on. Booking data arrives from the API
// layer via `convert`; decisions leave through `ConfirmRequest`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::CoreError;

pub use gymkaana_api::Decision;

// ── BookingRecord ───────────────────────────────────────────────────

/// Snapshot of a member's booking, as shown to the owner for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: String,
    pub member_name: String,
    pub plan_name: String,
    pub status: String,
    pub photo_url: Option<String>,
    pub gym_name: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
}

// ── Rejection reasons ───────────────────────────────────────────────

/// Fixed set of reasons an owner can give when turning a member away.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum RejectionReason {
    BookingExpired,
    WrongGym,
    IdentityMismatch,
    PlanNotValid,
    /// Needs a free-text note.
    Other,
}

impl RejectionReason {
    /// Human-readable label, also sent to the backend as the reason text.
    pub fn label(self) -> &'static str {
        match self {
            Self::BookingExpired => "Booking expired",
            Self::WrongGym => "Booking is for a different gym",
            Self::IdentityMismatch => "Member identity does not match",
            Self::PlanNotValid => "Plan does not cover this visit",
            Self::Other => "Other",
        }
    }

    pub fn requires_note(self) -> bool {
        matches!(self, Self::Other)
    }

    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

// ── RejectionDraft ──────────────────────────────────────────────────

/// The reason being composed while in the `rejecting` state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectionDraft {
    reason: Option<RejectionReason>,
    note: String,
}

impl RejectionDraft {
    pub fn reason(&self) -> Option<RejectionReason> {
        self.reason
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn select(&mut self, reason: RejectionReason) {
        self.reason = Some(reason);
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    /// Whether the reject-confirm action may be invoked.
    pub fn can_confirm(&self) -> bool {
        self.resolve().is_ok()
    }

    /// The reason text to send, or why the draft is not complete yet.
    pub fn resolve(&self) -> Result<String, CoreError> {
        match self.reason {
            None => Err(CoreError::Validation {
                message: "select a rejection reason".into(),
            }),
            Some(reason) if reason.requires_note() => {
                let note = self.note.trim();
                if note.is_empty() {
                    Err(CoreError::Validation {
                        message: "describe the reason when choosing 'Other'".into(),
                    })
                } else {
                    Ok(note.to_owned())
                }
            }
            Some(reason) => Ok(reason.label().to_owned()),
        }
    }
}

// ── ConfirmRequest ──────────────────────────────────────────────────

/// A finalized owner decision, ready to send.
///
/// Built only through [`accept`](Self::accept) and [`reject`](Self::reject),
/// so a rejection always carries a reason and an acceptance never does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    booking_id: String,
    decision: Decision,
    reason: Option<String>,
}

impl ConfirmRequest {
    pub fn accept(booking_id: impl Into<String>) -> Self {
        Self {
            booking_id: booking_id.into(),
            decision: Decision::Accept,
            reason: None,
        }
    }

    pub fn reject(booking_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            booking_id: booking_id.into(),
            decision: Decision::Reject,
            reason: Some(reason.into()),
        }
    }

    pub fn booking_id(&self) -> &str {
        &self.booking_id
    }

    pub fn decision(&self) -> Decision {
        self.decision
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}
