// ── API-to-domain conversions ──
//
// Bridges wire types from `gymkaana-api` into the domain model and back.
// Keeps the machine and controller free of serde field names.

use gymkaana_api::{BookingProjection, ConfirmCheckInRequest};

use crate::model::{BookingRecord, ConfirmRequest};

impl From<BookingProjection> for BookingRecord {
    fn from(p: BookingProjection) -> Self {
        Self {
            id: p.id,
            member_name: p.member_name,
            plan_name: p.plan_name,
            status: p.status,
            photo_url: p.photo_url.filter(|url| !url.trim().is_empty()),
            gym_name: p.gym_name,
            valid_until: p.valid_until,
        }
    }
}

impl From<&ConfirmRequest> for ConfirmCheckInRequest {
    fn from(request: &ConfirmRequest) -> Self {
        Self {
            decision: request.decision(),
            reason: request.reason().map(str::to_owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use gymkaana_api::Decision;

    use super::*;

    #[test]
    fn blank_photo_url_is_dropped() {
        let record = BookingRecord::from(BookingProjection {
            id: "bk_1".into(),
            member_name: "Asha Verma".into(),
            plan_name: "Monthly".into(),
            status: "Active".into(),
            photo_url: Some(" ".into()),
            gym_name: Some("Iron Temple".into()),
            valid_until: None,
        });
        assert_eq!(record.photo_url, None);
        assert_eq!(record.gym_name.as_deref(), Some("Iron Temple"));
    }

    #[test]
    fn confirm_request_maps_to_wire_body() {
        let body = ConfirmCheckInRequest::from(&ConfirmRequest::accept("bk_1"));
        assert_eq!(body.decision, Decision::Accept);
        assert_eq!(body.reason, None);

        let body = ConfirmCheckInRequest::from(&ConfirmRequest::reject("bk_1", "Wrong gym"));
        assert_eq!(body.decision, Decision::Reject);
        assert_eq!(body.reason.as_deref(), Some("Wrong gym"));
    }
}
