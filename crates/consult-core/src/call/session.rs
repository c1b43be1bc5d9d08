//! Call session lifecycle
//!
//! [`CallSession`] holds at most one simulated call. Starting a call spawns
//! three background operations, all owned by that call:
//!
//! - a repeating tick that advances the duration counter,
//! - a one-shot connect timer that moves the call from Connecting to Active,
//! - the local capture request.
//!
//! They share one `CancellationToken` and are aborted together when the call
//! ends or the session is dropped. Each task also carries its call id and
//! discards its effect if that call is no longer the current one, so a capture
//! that completes after hang-up has its stream stopped on the spot.
//!
//! State sits behind a synchronous mutex that is never held across an
//! `.await`, which keeps `end()` and the toggles synchronous. Events are sent
//! while the lock is held so subscribers see them in state order.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use super::types::{
    format_elapsed, CallId, CallPhase, CallSnapshot, CallSummary, LocalPreview, RemoteView,
};
use crate::config::{ConsultConfig, TrackControlMode};
use crate::error::{ConsultError, ConsultResult, TargetRejection};
use crate::events::CallEvent;
use crate::media::{CaptureConstraints, CaptureError, LocalStream, MediaDevice, TrackKind};
use crate::provider::ProviderId;

/// Outcome of the capture request for the current call
#[derive(Debug)]
enum CaptureStatus {
    Pending,
    Attached(LocalStream),
    Failed(CaptureError),
}

/// The one call in progress and everything it owns
#[derive(Debug)]
struct ActiveCall {
    call_id: CallId,
    provider_id: ProviderId,
    phase: CallPhase,
    elapsed_seconds: u64,
    microphone_enabled: bool,
    camera_enabled: bool,
    capture: CaptureStatus,
    started_at: DateTime<Utc>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl ActiveCall {
    /// Cancel the timers and capture, stop every track. Safe to repeat.
    fn release(&mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        if let CaptureStatus::Attached(stream) = &self.capture {
            stream.stop();
        }
    }

    fn local_preview(&self) -> LocalPreview {
        if !self.camera_enabled {
            return LocalPreview::CameraOff;
        }
        match &self.capture {
            CaptureStatus::Pending => LocalPreview::Pending,
            CaptureStatus::Attached(stream) if stream.has_kind(TrackKind::Video) => {
                LocalPreview::Live
            }
            CaptureStatus::Attached(_) | CaptureStatus::Failed(_) => LocalPreview::Unavailable,
        }
    }

    fn stream(&self) -> Option<&LocalStream> {
        match &self.capture {
            CaptureStatus::Attached(stream) => Some(stream),
            _ => None,
        }
    }
}

impl Drop for ActiveCall {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Debug, Default)]
struct SessionState {
    active: Option<ActiveCall>,
}

impl SessionState {
    /// The active call, only if it is the one identified by `call_id`
    fn current(&mut self, call_id: CallId) -> Option<&mut ActiveCall> {
        self.active.as_mut().filter(|call| call.call_id == call_id)
    }
}

/// Timings and capture settings copied out of [`ConsultConfig`]
#[derive(Debug, Clone, Copy)]
struct SessionSettings {
    connect_delay: Duration,
    tick_interval: Duration,
    track_control: TrackControlMode,
    capture: CaptureConstraints,
}

/// Single-call session controller
///
/// The provider id handed to [`CallSession::start`] is opaque here; callers
/// are expected to have checked the provider is online (see
/// [`ConsultManager`](crate::ConsultManager)).
#[derive(Debug)]
pub struct CallSession {
    state: Arc<Mutex<SessionState>>,
    device: Arc<dyn MediaDevice>,
    settings: SessionSettings,
    events: broadcast::Sender<CallEvent>,
}

impl CallSession {
    /// Create an idle session using `device` for local capture
    pub fn new(config: &ConsultConfig, device: Arc<dyn MediaDevice>) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            device,
            settings: SessionSettings {
                connect_delay: config.connect_delay(),
                tick_interval: config.tick_interval(),
                track_control: config.track_control,
                capture: config.capture,
            },
            events,
        }
    }

    /// Subscribe to call events
    pub fn subscribe(&self) -> broadcast::Receiver<CallEvent> {
        self.events.subscribe()
    }

    /// Start a call with `provider_id`.
    ///
    /// Must be called from within a tokio runtime. Fails with
    /// `InvalidTarget(CallInProgress)` if a call already exists, before any
    /// resource is requested.
    pub fn start(&self, provider_id: ProviderId) -> ConsultResult<CallId> {
        let mut state = self.state.lock();
        if state.active.is_some() {
            debug!("Rejecting call to provider {}: call in progress", provider_id);
            return Err(ConsultError::invalid_target(
                provider_id,
                TargetRejection::CallInProgress,
            ));
        }

        let call_id = Uuid::new_v4();
        let started = Instant::now();
        let cancel = CancellationToken::new();
        let span = tracing::info_span!("call", %call_id, provider = %provider_id);

        let tasks = vec![
            tokio::spawn(
                self.run_ticker(call_id, started, cancel.clone())
                    .instrument(span.clone()),
            ),
            tokio::spawn(
                self.run_connect_timer(call_id, started, cancel.clone())
                    .instrument(span.clone()),
            ),
            tokio::spawn(self.run_capture(call_id, cancel.clone()).instrument(span)),
        ];

        state.active = Some(ActiveCall {
            call_id,
            provider_id,
            phase: CallPhase::Connecting,
            elapsed_seconds: 0,
            microphone_enabled: true,
            camera_enabled: true,
            capture: CaptureStatus::Pending,
            started_at: Utc::now(),
            cancel,
            tasks,
        });

        info!("Started call {} with provider {}", call_id, provider_id);
        self.emit(CallEvent::Started {
            call_id,
            provider_id,
        });
        Ok(call_id)
    }

    /// End the current call, releasing its timers and local stream.
    ///
    /// Returns `None` when no call was in progress.
    pub fn end(&self) -> Option<CallSummary> {
        let mut state = self.state.lock();
        let mut call = state.active.take()?;
        call.release();

        let summary = CallSummary {
            call_id: call.call_id,
            provider_id: call.provider_id,
            elapsed_seconds: call.elapsed_seconds,
            reached_active: call.phase == CallPhase::Active,
        };
        info!(
            "Ended call {} with provider {} after {}",
            summary.call_id,
            summary.provider_id,
            format_elapsed(summary.elapsed_seconds)
        );
        self.emit(CallEvent::Ended {
            call_id: summary.call_id,
            provider_id: summary.provider_id,
            elapsed_seconds: summary.elapsed_seconds,
        });
        Some(summary)
    }

    /// Flip the microphone flag; returns the new value
    pub fn toggle_microphone(&self) -> ConsultResult<bool> {
        self.toggle(TrackKind::Audio)
    }

    /// Flip the camera flag; returns the new value
    pub fn toggle_camera(&self) -> ConsultResult<bool> {
        self.toggle(TrackKind::Video)
    }

    fn toggle(&self, kind: TrackKind) -> ConsultResult<bool> {
        let mut state = self.state.lock();
        let call = state.active.as_mut().ok_or(ConsultError::NoActiveCall)?;

        let enabled = match kind {
            TrackKind::Audio => {
                call.microphone_enabled = !call.microphone_enabled;
                call.microphone_enabled
            }
            TrackKind::Video => {
                call.camera_enabled = !call.camera_enabled;
                call.camera_enabled
            }
        };

        if self.settings.track_control == TrackControlMode::Hardware {
            if let Some(stream) = call.stream() {
                stream.set_kind_enabled(kind, enabled);
            }
        }

        let call_id = call.call_id;
        debug!("Call {} {} toggled to {}", call_id, kind, enabled);
        self.emit(match kind {
            TrackKind::Audio => CallEvent::MicrophoneToggled { call_id, enabled },
            TrackKind::Video => CallEvent::CameraToggled { call_id, enabled },
        });
        Ok(enabled)
    }

    /// Point-in-time copy of the session
    pub fn snapshot(&self) -> CallSnapshot {
        let state = self.state.lock();
        match &state.active {
            None => CallSnapshot::idle(),
            Some(call) => CallSnapshot {
                call_id: Some(call.call_id),
                target_provider_id: Some(call.provider_id),
                phase: Some(call.phase),
                elapsed_seconds: call.elapsed_seconds,
                elapsed_display: format_elapsed(call.elapsed_seconds),
                microphone_enabled: call.microphone_enabled,
                camera_enabled: call.camera_enabled,
                local_preview: Some(call.local_preview()),
                remote_view: Some(RemoteView::from(call.phase)),
                started_at: Some(call.started_at),
            },
        }
    }

    pub fn is_in_call(&self) -> bool {
        self.state.lock().active.is_some()
    }

    pub fn target_provider_id(&self) -> Option<ProviderId> {
        self.state.lock().active.as_ref().map(|c| c.provider_id)
    }

    pub fn phase(&self) -> Option<CallPhase> {
        self.state.lock().active.as_ref().map(|c| c.phase)
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.state
            .lock()
            .active
            .as_ref()
            .map_or(0, |c| c.elapsed_seconds)
    }

    /// Whether the current call holds a local stream
    pub fn has_local_stream(&self) -> bool {
        self.state
            .lock()
            .active
            .as_ref()
            .map_or(false, |c| c.stream().is_some())
    }

    fn emit(&self, event: CallEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Counts ticks from `started`, the instant the call was created
    fn run_ticker(
        &self,
        call_id: CallId,
        started: Instant,
        cancel: CancellationToken,
    ) -> impl std::future::Future<Output = ()> + Send + 'static {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let period = self.settings.tick_interval;

        async move {
            let mut interval = tokio::time::interval_at(started + period, period);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        let mut state = state.lock();
                        let Some(call) = state.current(call_id) else { break };
                        call.elapsed_seconds += 1;
                        let _ = events.send(CallEvent::Tick {
                            call_id,
                            elapsed_seconds: call.elapsed_seconds,
                        });
                    }
                }
            }
        }
    }

    fn run_connect_timer(
        &self,
        call_id: CallId,
        started: Instant,
        cancel: CancellationToken,
    ) -> impl std::future::Future<Output = ()> + Send + 'static {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let deadline = started + self.settings.connect_delay;

        async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {
                    let mut state = state.lock();
                    if let Some(call) = state.current(call_id) {
                        if call.phase == CallPhase::Connecting {
                            call.phase = CallPhase::Active;
                            debug!("Call {} is now active", call_id);
                            let _ = events.send(CallEvent::PhaseChanged {
                                call_id,
                                phase: CallPhase::Active,
                            });
                        }
                    }
                }
            }
        }
    }

    fn run_capture(
        &self,
        call_id: CallId,
        cancel: CancellationToken,
    ) -> impl std::future::Future<Output = ()> + Send + 'static {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let device = Arc::clone(&self.device);
        let settings = self.settings;

        async move {
            let result = tokio::select! {
                _ = cancel.cancelled() => return,
                result = device.acquire(settings.capture) => result,
            };

            let mut state = state.lock();
            let Some(call) = state.current(call_id) else {
                if let Ok(stream) = result {
                    debug!(
                        "Call {} ended before capture completed; releasing stream",
                        call_id
                    );
                    stream.stop();
                }
                return;
            };

            match result {
                Ok(stream) => {
                    if settings.track_control == TrackControlMode::Hardware {
                        stream.set_kind_enabled(TrackKind::Audio, call.microphone_enabled);
                        stream.set_kind_enabled(TrackKind::Video, call.camera_enabled);
                    }
                    debug!("Local stream {} attached to call {}", stream.id(), call_id);
                    call.capture = CaptureStatus::Attached(stream);
                    let _ = events.send(CallEvent::LocalStreamReady { call_id });
                }
                Err(error) => {
                    warn!("Local capture failed for call {}: {}", call_id, error);
                    call.capture = CaptureStatus::Failed(error.clone());
                    let _ = events.send(CallEvent::CaptureUnavailable { call_id, error });
                }
            }
        }
    }
}

impl Drop for CallSession {
    fn drop(&mut self) {
        if let Some(call) = self.state.lock().active.take() {
            debug!("Call session dropped during call {}", call.call_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use crate::media::{MediaTrack, MockMediaDevice, TrackProbe};
    use tracing_test::traced_test;

    fn session_with(device: Arc<MockMediaDevice>) -> CallSession {
        CallSession::new(&ConsultConfig::default(), device)
    }

    /// Blocks inside `acquire` until released, so the stream can be made to
    /// arrive after the call has already ended
    #[derive(Debug)]
    struct GatedDevice {
        entered: Mutex<mpsc::SyncSender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
        issued: Mutex<Vec<TrackProbe>>,
    }

    #[async_trait::async_trait]
    impl MediaDevice for GatedDevice {
        async fn acquire(
            &self,
            _constraints: CaptureConstraints,
        ) -> Result<LocalStream, CaptureError> {
            let _ = self.entered.lock().send(());
            let _ = self.release.lock().recv();
            let track = MediaTrack::new(TrackKind::Video, "Gated Camera");
            self.issued.lock().push(track.probe());
            Ok(LocalStream::new(vec![track]))
        }
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn capture_failure_is_logged_and_call_continues() {
        let device = Arc::new(MockMediaDevice::failing(CaptureError::PermissionDenied));
        let session = session_with(device);

        session.start(ProviderId(1)).unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(logs_contain("Local capture failed"));
        assert_eq!(session.phase(), Some(CallPhase::Active));
        assert!(!session.has_local_stream());
        assert_eq!(
            session.snapshot().local_preview,
            Some(LocalPreview::Unavailable)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_session_releases_stream() {
        let device = Arc::new(MockMediaDevice::new());
        let session = session_with(device.clone());

        session.start(ProviderId(2)).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(device.live_track_count(), 2);

        drop(session);
        assert_eq!(device.live_track_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_capture_is_dropped_on_end() {
        let device = Arc::new(MockMediaDevice::new().with_latency(Duration::from_secs(5)));
        let session = session_with(device.clone());

        session.start(ProviderId(4)).unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        session.end();

        tokio::time::sleep(Duration::from_secs(10)).await;
        // The pending request is dropped with the call, before it completes
        assert_eq!(device.live_track_count(), 0);
        assert!(!session.is_in_call());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    #[traced_test]
    async fn stream_arriving_after_end_is_stopped() {
        let (entered_tx, entered_rx) = mpsc::sync_channel(1);
        let (release_tx, release_rx) = mpsc::sync_channel(1);
        let device = Arc::new(GatedDevice {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
            issued: Mutex::new(Vec::new()),
        });
        let session = CallSession::new(&ConsultConfig::default(), device.clone());

        session.start(ProviderId(1)).unwrap();
        // Capture is now parked inside acquire on a worker thread
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(session.end().is_some());
        release_tx.send(()).unwrap();

        for _ in 0..500 {
            if device.issued.lock().iter().any(|t| !t.is_live()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let issued = device.issued.lock().clone();
        assert_eq!(issued.len(), 1);
        assert!(!issued[0].is_live());
        assert!(!session.is_in_call());
        assert!(logs_contain("ended before capture completed"));
    }

    #[tokio::test(start_paused = true)]
    async fn camera_off_overrides_preview() {
        let device = Arc::new(MockMediaDevice::new());
        let session = session_with(device);

        session.start(ProviderId(1)).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(session.snapshot().local_preview, Some(LocalPreview::Live));

        session.toggle_camera().unwrap();
        assert_eq!(
            session.snapshot().local_preview,
            Some(LocalPreview::CameraOff)
        );
    }
}
