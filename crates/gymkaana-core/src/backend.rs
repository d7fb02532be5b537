// ── Check-in backend seam ──
//
// The controller talks to the backend through this trait so the workflow
// can run against the HTTP client or an in-memory fake.

use std::future::Future;

use gymkaana_api::{CheckinClient, ConfirmCheckInRequest};
use tracing::debug;

use crate::error::CoreError;
use crate::model::{BookingRecord, ConfirmRequest};

/// The two calls the check-in workflow needs.
pub trait CheckinBackend: Send + Sync {
    /// Resolve a normalized booking code.
    fn lookup(&self, code: &str) -> impl Future<Output = Result<BookingRecord, CoreError>> + Send;

    /// Send the owner's decision.
    fn confirm(&self, request: &ConfirmRequest)
    -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl CheckinBackend for CheckinClient {
    async fn lookup(&self, code: &str) -> Result<BookingRecord, CoreError> {
        let projection = self.lookup_booking(code).await?;
        Ok(BookingRecord::from(projection))
    }

    async fn confirm(&self, request: &ConfirmRequest) -> Result<(), CoreError> {
        let body = ConfirmCheckInRequest::from(request);
        let ack = self.confirm_check_in(request.booking_id(), &body).await?;
        if let Some(message) = ack.message {
            debug!(booking = request.booking_id(), %message, "confirm acknowledged");
        }
        Ok(())
    }
}
