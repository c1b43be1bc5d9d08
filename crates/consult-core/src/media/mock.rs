//! Scripted capture device for tests and the terminal demo

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::device::{
    CaptureConstraints, CaptureError, LocalStream, MediaDevice, MediaTrack, TrackKind, TrackProbe,
};

/// Mock capture device.
///
/// Grants or refuses capture according to a configured outcome, optionally
/// after a simulated permission-prompt latency, and keeps a probe on every
/// track it hands out.
#[derive(Debug)]
pub struct MockMediaDevice {
    outcome: Mutex<Option<CaptureError>>,
    latency: Duration,
    requests: AtomicUsize,
    issued: Mutex<Vec<TrackProbe>>,
}

impl MockMediaDevice {
    /// A device that grants every request immediately
    pub fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            latency: Duration::ZERO,
            requests: AtomicUsize::new(0),
            issued: Mutex::new(Vec::new()),
        }
    }

    /// A device that refuses every request with `error`
    pub fn failing(error: CaptureError) -> Self {
        let device = Self::new();
        *device.outcome.lock() = Some(error);
        device
    }

    /// Delay each request by `latency` before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Switch between granting (`None`) and refusing future requests
    pub fn set_failure(&self, error: Option<CaptureError>) {
        *self.outcome.lock() = error;
    }

    /// Number of capture requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Probes for every track this device has handed out
    pub fn issued_tracks(&self) -> Vec<TrackProbe> {
        self.issued.lock().clone()
    }

    /// Tracks handed out that still hold the (simulated) hardware
    pub fn live_track_count(&self) -> usize {
        self.issued.lock().iter().filter(|p| p.is_live()).count()
    }
}

impl Default for MockMediaDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MediaDevice for MockMediaDevice {
    async fn acquire(&self, constraints: CaptureConstraints) -> Result<LocalStream, CaptureError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(error) = self.outcome.lock().clone() {
            return Err(error);
        }

        let mut tracks = Vec::with_capacity(2);
        if constraints.audio {
            tracks.push(MediaTrack::new(TrackKind::Audio, "Mock Microphone"));
        }
        if constraints.video {
            tracks.push(MediaTrack::new(TrackKind::Video, "Mock Camera"));
        }

        self.issued
            .lock()
            .extend(tracks.iter().map(MediaTrack::probe));

        Ok(LocalStream::new(tracks))
    }
}
