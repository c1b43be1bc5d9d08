//! Local media capture abstraction
//!
//! This module defines the capture device trait and the stream handle it
//! yields. A [`LocalStream`] is the exclusive owner of the tracks it holds:
//! stopping it (explicitly or by dropping it) stops every track, which is
//! what releases the camera and microphone.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Kind of a captured track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Microphone audio
    Audio,
    /// Camera video
    Video,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Audio => write!(f, "audio"),
            TrackKind::Video => write!(f, "video"),
        }
    }
}

/// What to ask the capture device for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConstraints {
    pub audio: bool,
    pub video: bool,
}

impl CaptureConstraints {
    /// Request microphone and camera together
    pub fn audio_video() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }

    /// True when nothing would be captured
    pub fn is_empty(&self) -> bool {
        !self.audio && !self.video
    }
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self::audio_video()
    }
}

/// Reasons a capture request can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The user or platform refused access
    #[error("permission to capture was denied")]
    PermissionDenied,
    /// No capture device of the requested kind exists
    #[error("no {kind} capture device found")]
    NoDevice { kind: TrackKind },
    /// The device exists but another consumer holds it
    #[error("capture device is busy")]
    DeviceBusy,
    /// Anything else the platform reported
    #[error("platform capture error: {message}")]
    Platform { message: String },
}

#[derive(Debug)]
struct TrackState {
    enabled: AtomicBool,
    live: AtomicBool,
}

/// A single captured track, owned by exactly one [`LocalStream`]
#[derive(Debug)]
pub struct MediaTrack {
    kind: TrackKind,
    label: String,
    state: Arc<TrackState>,
}

impl MediaTrack {
    /// Create a live, enabled track
    pub fn new(kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            state: Arc::new(TrackState {
                enabled: AtomicBool::new(true),
                live: AtomicBool::new(true),
            }),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled.load(Ordering::SeqCst)
    }

    /// Mute or unmute the track without releasing it
    pub fn set_enabled(&self, enabled: bool) {
        self.state.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.state.live.load(Ordering::SeqCst)
    }

    /// Stop the track. Stopping twice is harmless.
    pub fn stop(&self) {
        if self.state.live.swap(false, Ordering::SeqCst) {
            tracing::trace!("Stopped {} track '{}'", self.kind, self.label);
        }
    }

    /// Read-only observer of this track's state
    pub fn probe(&self) -> TrackProbe {
        TrackProbe {
            kind: self.kind,
            state: Arc::clone(&self.state),
        }
    }
}

/// Observer over a track's state that does not own the track.
///
/// Capture backends keep these to report which tracks are still holding
/// hardware.
#[derive(Debug, Clone)]
pub struct TrackProbe {
    kind: TrackKind,
    state: Arc<TrackState>,
}

impl TrackProbe {
    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn is_live(&self) -> bool {
        self.state.live.load(Ordering::SeqCst)
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled.load(Ordering::SeqCst)
    }
}

/// Exclusive handle over acquired local capture.
///
/// Dropping the handle stops every track it holds.
#[derive(Debug)]
pub struct LocalStream {
    id: Uuid,
    tracks: Vec<MediaTrack>,
}

impl LocalStream {
    pub fn new(tracks: Vec<MediaTrack>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tracks,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    /// Whether the stream carries a track of this kind
    pub fn has_kind(&self, kind: TrackKind) -> bool {
        self.tracks.iter().any(|t| t.kind == kind)
    }

    /// Enable or disable every track of the given kind
    pub fn set_kind_enabled(&self, kind: TrackKind, enabled: bool) {
        for track in self.tracks.iter().filter(|t| t.kind == kind) {
            track.set_enabled(enabled);
        }
    }

    /// True while any track still holds its device
    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(MediaTrack::is_live)
    }

    /// Stop every track
    pub fn stop(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

impl Drop for LocalStream {
    fn drop(&mut self) {
        if self.is_live() {
            tracing::debug!("Releasing local stream {}", self.id);
        }
        self.stop();
    }
}

/// Capture device trait
///
/// Implementations request local audio/video capture from the platform and
/// hand back an owned [`LocalStream`]. Releasing the hardware is the stream's
/// job, so the device has no stop method.
#[async_trait::async_trait]
pub trait MediaDevice: Send + Sync + fmt::Debug {
    /// Request capture for the given constraints
    async fn acquire(&self, constraints: CaptureConstraints) -> Result<LocalStream, CaptureError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_a_stream_stops_its_tracks() {
        let stream = LocalStream::new(vec![
            MediaTrack::new(TrackKind::Audio, "mic"),
            MediaTrack::new(TrackKind::Video, "cam"),
        ]);
        let probes: Vec<TrackProbe> = stream.tracks().iter().map(MediaTrack::probe).collect();
        assert!(probes.iter().all(TrackProbe::is_live));

        drop(stream);
        assert!(probes.iter().all(|p| !p.is_live()));
    }

    #[test]
    fn set_kind_enabled_only_touches_that_kind() {
        let stream = LocalStream::new(vec![
            MediaTrack::new(TrackKind::Audio, "mic"),
            MediaTrack::new(TrackKind::Video, "cam"),
        ]);
        stream.set_kind_enabled(TrackKind::Audio, false);
        assert!(!stream.tracks()[0].is_enabled());
        assert!(stream.tracks()[1].is_enabled());
        assert!(stream.is_live());
    }

    #[test]
    fn stop_is_repeatable() {
        let track = MediaTrack::new(TrackKind::Video, "cam");
        track.stop();
        track.stop();
        assert!(!track.is_live());
    }
}
