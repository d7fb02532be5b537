// Async HTTP client for the owner check-in endpoints.
//
// Base path: {base}/api/owner/checkins/
// Auth: `Authorization: Bearer <token>` header

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{BookingProjection, CheckinAck, ConfirmCheckInRequest};
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

/// The backend reports failures as `{"message": "..."}` on most routes and
/// `{"error": "..."}` on a few older ones.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the owner check-in API.
///
/// Two calls: [`lookup_booking`](Self::lookup_booking) resolves a scanned
/// or typed identifier, [`confirm_check_in`](Self::confirm_check_in)
/// finalizes the owner's decision.
pub struct CheckinClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl CheckinClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an owner token and transport config.
    ///
    /// Injects `Authorization: Bearer <token>` as a default header.
    pub fn new(
        base_url: Url,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::InvalidToken(format!("invalid header value: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        let http = transport.build_client_with_headers(headers)?;
        Self::checked(http, base_url, transport.timeout_secs())
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Result<Self, Error> {
        Self::checked(http, base_url, 0)
    }

    fn checked(http: reqwest::Client, base_url: Url, timeout_secs: u64) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        Ok(Self {
            http,
            base_url,
            timeout_secs,
        })
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Resolve a booking identifier to the booking/member snapshot.
    ///
    /// `GET /api/owner/checkins/{code}`
    pub async fn lookup_booking(&self, code: &str) -> Result<BookingProjection, Error> {
        let url = self.endpoint(&["api", "owner", "checkins", code]);
        self.get(url).await
    }

    /// Send the owner's accept/reject decision for a looked-up booking.
    ///
    /// `POST /api/owner/checkins/{booking_id}/confirm`. A 2xx answer with
    /// `success: false` is reported as [`Error::Declined`].
    pub async fn confirm_check_in(
        &self,
        booking_id: &str,
        request: &ConfirmCheckInRequest,
    ) -> Result<CheckinAck, Error> {
        let url = self.endpoint(&["api", "owner", "checkins", booking_id, "confirm"]);
        let ack: CheckinAck = self.post(url, request).await?;
        if ack.success {
            Ok(ack)
        } else {
            Err(Error::Declined {
                message: ack.message,
            })
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Base was checked in the constructor, so segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        self.handle_response(resp).await
    }

    fn send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await.map_err(|e| self.send_error(e))?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|err| {
                [err.message, err.error]
                    .into_iter()
                    .flatten()
                    .map(|m| m.trim().to_owned())
                    .find(|m| !m.is_empty())
            })
            .or_else(|| {
                // Plain-text bodies only, never JSON or HTML pages.
                let trimmed = raw.trim();
                (!trimmed.is_empty() && !trimmed.starts_with(['{', '<']))
                    .then(|| trimmed.to_owned())
            });

        debug!(status = status.as_u16(), ?message, "check-in API error");

        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Error::Unauthorized {
                    status: status.as_u16(),
                    message,
                }
            }
            reqwest::StatusCode::NOT_FOUND => Error::NotFound { message },
            _ => Error::Api {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| status.to_string()),
            },
        }
    }
}
