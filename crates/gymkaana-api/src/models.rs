// Wire types for the owner check-in endpoints.
//
// The backend is a JavaScript service, so field names are camelCase on the
// wire. Optional fields default to `None` when the backend omits them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booking/member snapshot returned by the lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingProjection {
    /// Internal booking id, used as the confirm key.
    #[serde(alias = "_id")]
    pub id: String,
    pub member_name: String,
    pub plan_name: String,
    /// Human status label, e.g. "Active" or "Expired".
    pub status: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub gym_name: Option<String>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
}

/// Owner's verdict on a check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

/// Body of `POST /api/owner/checkins/{id}/confirm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmCheckInRequest {
    pub decision: Decision,
    /// Always serialized so the backend sees an explicit `null` on accept.
    pub reason: Option<String>,
}

/// Acknowledgement from the confirm endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckinAck {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}
