//! Type definitions for the call session
//!
//! These are the read-side types the presentation layer renders from: the
//! session phase, the derived state of the local preview and remote area, and
//! [`CallSnapshot`], a point-in-time copy of the whole session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::provider::ProviderId;

/// Unique identifier of one call session
pub type CallId = Uuid;

/// Phase of an in-progress call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallPhase {
    /// Simulated handshake in progress
    Connecting,
    /// Call shown as connected
    Active,
}

/// What the local picture-in-picture area should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalPreview {
    /// Capture requested, no answer yet
    Pending,
    /// Stream attached and camera on
    Live,
    /// Stream attached but the camera toggle is off
    CameraOff,
    /// Capture failed; the preview stays as a placeholder
    Unavailable,
}

/// What the main (remote) area should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteView {
    Connecting,
    Placeholder,
}

impl RemoteView {
    /// Caption rendered in the remote area
    pub fn caption(&self) -> &'static str {
        match self {
            RemoteView::Connecting => "Connecting to your doctor...",
            RemoteView::Placeholder => "Doctor's video will appear here",
        }
    }
}

impl From<CallPhase> for RemoteView {
    fn from(phase: CallPhase) -> Self {
        match phase {
            CallPhase::Connecting => RemoteView::Connecting,
            CallPhase::Active => RemoteView::Placeholder,
        }
    }
}

/// Point-in-time view of the call session.
///
/// `target_provider_id` is `None` when no call is in progress, in which case
/// every other call field is at its initial value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallSnapshot {
    pub call_id: Option<CallId>,
    pub target_provider_id: Option<ProviderId>,
    pub phase: Option<CallPhase>,
    pub elapsed_seconds: u64,
    pub elapsed_display: String,
    pub microphone_enabled: bool,
    pub camera_enabled: bool,
    pub local_preview: Option<LocalPreview>,
    pub remote_view: Option<RemoteView>,
    pub started_at: Option<DateTime<Utc>>,
}

impl CallSnapshot {
    /// Snapshot of an idle session
    pub fn idle() -> Self {
        Self {
            call_id: None,
            target_provider_id: None,
            phase: None,
            elapsed_seconds: 0,
            elapsed_display: format_elapsed(0),
            microphone_enabled: true,
            camera_enabled: true,
            local_preview: None,
            remote_view: None,
            started_at: None,
        }
    }

    pub fn is_in_call(&self) -> bool {
        self.target_provider_id.is_some()
    }
}

/// What `end()` reports about the call it tore down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CallSummary {
    pub call_id: CallId,
    pub provider_id: ProviderId,
    pub elapsed_seconds: u64,
    /// Whether the call got past Connecting
    pub reached_active: bool,
}

/// Render elapsed seconds as `mm:ss`.
///
/// Both fields are zero-padded to two digits. Minutes are not wrapped into
/// hours, so a call past 99:59 shows `100:00`.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(9), "00:09");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(3599), "59:59");
    }

    #[test]
    fn minutes_keep_growing_past_two_digits() {
        assert_eq!(format_elapsed(5999), "99:59");
        assert_eq!(format_elapsed(6000), "100:00");
        assert_eq!(format_elapsed(6065), "101:05");
    }

    #[test]
    fn remote_view_follows_phase() {
        assert_eq!(
            RemoteView::from(CallPhase::Connecting).caption(),
            "Connecting to your doctor..."
        );
        assert_eq!(
            RemoteView::from(CallPhase::Active).caption(),
            "Doctor's video will appear here"
        );
    }

    #[test]
    fn idle_snapshot_is_not_in_call() {
        let snapshot = CallSnapshot::idle();
        assert!(!snapshot.is_in_call());
        assert_eq!(snapshot.elapsed_display, "00:00");
    }
}
