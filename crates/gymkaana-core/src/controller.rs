// ── Check-in controller ──
//
// Drives one scan session: feeds events through the state machine, runs
// the effects it asks for, and owns the live camera. Methods take
// `&mut self`, so at most one backend call is in flight per session.

use std::collections::VecDeque;
use std::time::Duration;

use gymkaana_api::{CheckinClient, TlsMode, TransportConfig};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::backend::CheckinBackend;
use crate::camera::{Camera, LiveFeed};
use crate::config::{CheckinConfig, DEFAULT_TIMEOUT, TlsVerification};
use crate::error::CoreError;
use crate::machine::{
    Effect, Event, Failure, LiveScanId, Phase, ScanState, Transition, transition,
};
use crate::model::RejectionReason;
use crate::scan_code::ScanPrefix;

const NOTICE_CHANNEL_SIZE: usize = 16;

/// Per-session tuning.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Upper bound for each lookup or confirm call.
    pub request_timeout: Duration,
    pub prefix: ScanPrefix,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_TIMEOUT,
            prefix: ScanPrefix::default(),
        }
    }
}

/// Owner-facing check-in session.
///
/// Observers can follow the phase through [`subscribe`](Self::subscribe)
/// and transient messages through [`notices`](Self::notices).
pub struct CheckinController<B> {
    backend: B,
    settings: SessionSettings,
    state: ScanState,
    live: Option<LiveFeed>,
    phase_tx: watch::Sender<Phase>,
    notice_tx: broadcast::Sender<String>,
}

impl CheckinController<CheckinClient> {
    /// Build an HTTP-backed session from runtime config.
    pub fn connect(config: &CheckinConfig) -> Result<Self, CoreError> {
        let transport = build_transport(config);
        let client = CheckinClient::new(config.api_url.clone(), &config.token, &transport)?;
        debug!(api_url = %config.api_url, "check-in client ready");

        Ok(Self::new(
            client,
            SessionSettings {
                request_timeout: config.timeout,
                prefix: config.prefix(),
            },
        ))
    }
}

impl<B: CheckinBackend> CheckinController<B> {
    pub fn new(backend: B, settings: SessionSettings) -> Self {
        let state = ScanState::default();
        let (phase_tx, _) = watch::channel(state.phase());
        let (notice_tx, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);
        Self {
            backend,
            settings,
            state,
            live: None,
            phase_tx,
            notice_tx,
        }
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase_tx.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<String> {
        self.notice_tx.subscribe()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Whether a camera is currently held open.
    pub fn camera_active(&self) -> bool {
        self.live.is_some()
    }

    // ── Event dispatch ───────────────────────────────────────────────

    /// Apply one event and run every effect it leads to.
    ///
    /// Returns once the session is waiting on the owner again. Not
    /// cancel-safe while a backend call is running.
    pub async fn dispatch(&mut self, event: Event) -> &ScanState {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let from = self.state.phase();
            let name = event.name();
            let current = std::mem::take(&mut self.state);
            let Transition {
                state,
                effects,
                ignored,
            } = transition(current, event, &self.settings.prefix);

            if ignored {
                debug!(%from, event = name, "event ignored");
            } else if state.phase() != from {
                info!(%from, to = %state.phase(), event = name, "check-in state changed");
            }
            self.set_state(state);

            for effect in effects {
                if let Some(next) = self.run(effect).await {
                    queue.push_back(next);
                }
            }
        }

        &self.state
    }

    pub async fn submit_manual(&mut self, input: &str) -> &ScanState {
        self.dispatch(Event::ManualEntry(input.to_owned())).await
    }

    pub async fn accept(&mut self) -> &ScanState {
        self.dispatch(Event::Accept).await
    }

    pub async fn begin_reject(&mut self) -> &ScanState {
        self.dispatch(Event::Reject).await
    }

    pub async fn select_reason(&mut self, reason: RejectionReason) -> &ScanState {
        self.dispatch(Event::SelectReason(reason)).await
    }

    pub async fn edit_note(&mut self, note: &str) -> &ScanState {
        self.dispatch(Event::EditNote(note.to_owned())).await
    }

    /// Send the rejection being drafted.
    ///
    /// Fails with [`CoreError::Validation`] when the draft is incomplete,
    /// without touching the session.
    pub async fn confirm_reject(&mut self) -> Result<&ScanState, CoreError> {
        if let Some(draft) = self.state.draft() {
            draft.resolve()?;
        }
        Ok(self.dispatch(Event::ConfirmReject).await)
    }

    pub async fn cancel_reject(&mut self) -> &ScanState {
        self.dispatch(Event::CancelReject).await
    }

    pub async fn dismiss(&mut self) -> &ScanState {
        self.dispatch(Event::Dismiss).await
    }

    pub async fn retry(&mut self) -> &ScanState {
        self.dispatch(Event::Retry).await
    }

    pub async fn reset(&mut self) -> &ScanState {
        self.dispatch(Event::Reset).await
    }

    // ── Live scanning ────────────────────────────────────────────────

    /// Open `camera` and arm the scanner.
    ///
    /// Only valid while scanning with no camera open. A device failure
    /// moves the session to `error`.
    pub async fn start_live_scan<C: Camera>(&mut self, camera: &C) -> &ScanState {
        if !matches!(self.state, ScanState::Scanning { live: None }) {
            debug!(phase = %self.state.phase(), "live scan not available");
            return &self.state;
        }

        match camera.open().await {
            Ok(feed) => {
                let scan = LiveScanId::new();
                self.live = Some(feed);
                info!(%scan, "live scan started");
                self.dispatch(Event::LiveScanStarted(scan)).await
            }
            Err(e) => {
                warn!(error = %e, "camera unavailable");
                self.dispatch(Event::CameraFailed(e.to_string())).await
            }
        }
    }

    /// Wait for the camera's next decode.
    ///
    /// Cancel-safe. Returns `None` when no live scan is armed; pass the
    /// event to [`dispatch`](Self::dispatch).
    pub async fn next_decode(&mut self) -> Option<Event> {
        let scan = self.state.live_scan()?;
        let feed = self.live.as_mut()?;
        Some(match feed.next_payload().await {
            Some(payload) => Event::CodeDecoded { scan, payload },
            None => Event::CameraFailed(
                feed.exit_reason()
                    .await
                    .unwrap_or_else(|| "camera stopped delivering frames".into()),
            ),
        })
    }

    pub async fn stop_live_scan(&mut self) -> &ScanState {
        self.dispatch(Event::LiveScanStopped).await
    }

    // ── Internals ────────────────────────────────────────────────────

    fn set_state(&mut self, state: ScanState) {
        let phase = state.phase();
        self.state = state;
        self.phase_tx.send_if_modified(|current| {
            let changed = *current != phase;
            *current = phase;
            changed
        });
    }

    async fn run(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::StopCamera => {
                self.release_camera();
                None
            }
            Effect::Lookup { code } => {
                debug!(%code, "looking up booking");
                let result =
                    tokio::time::timeout(self.settings.request_timeout, self.backend.lookup(&code))
                        .await;
                Some(match result {
                    Ok(Ok(record)) => Event::LookupSucceeded(record),
                    Ok(Err(e)) => {
                        warn!(%code, error = %e, "lookup failed");
                        Event::LookupFailed(Failure::from(&e))
                    }
                    Err(_) => {
                        warn!(%code, "lookup timed out");
                        Event::LookupFailed(self.timeout_failure())
                    }
                })
            }
            Effect::Confirm(request) => {
                debug!(
                    booking = request.booking_id(),
                    decision = ?request.decision(),
                    "confirming check-in"
                );
                let result = tokio::time::timeout(
                    self.settings.request_timeout,
                    self.backend.confirm(&request),
                )
                .await;
                Some(match result {
                    Ok(Ok(())) => Event::ConfirmSucceeded,
                    Ok(Err(e)) => {
                        warn!(booking = request.booking_id(), error = %e, "confirm failed");
                        Event::ConfirmFailed(Failure::from(&e))
                    }
                    Err(_) => {
                        warn!(booking = request.booking_id(), "confirm timed out");
                        Event::ConfirmFailed(self.timeout_failure())
                    }
                })
            }
            Effect::Notify(message) => {
                info!(%message, "check-in notice");
                // No subscribers is fine.
                let _ = self.notice_tx.send(message);
                None
            }
        }
    }

    fn release_camera(&mut self) {
        if let Some(mut feed) = self.live.take() {
            feed.stop();
            debug!("camera released");
        }
    }

    fn timeout_failure(&self) -> Failure {
        Failure::from(&CoreError::Timeout {
            timeout_secs: self.settings.request_timeout.as_secs(),
        })
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn build_transport(config: &CheckinConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
