// gymkaana-api: Async Rust client for the Gymkaana owner check-in API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::CheckinClient;
pub use error::Error;
pub use models::{BookingProjection, CheckinAck, ConfirmCheckInRequest, Decision};
pub use transport::{TlsMode, TransportConfig};
