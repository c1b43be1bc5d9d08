//! Call events
//!
//! The call session publishes every state change on a tokio `broadcast`
//! channel. The presentation layer subscribes to re-render; the directory side
//! treats [`CallEvent::Ended`] as its "call finished" notification.
//!
//! ```rust,no_run
//! use docbot_consult_core::events::CallEvent;
//! use docbot_consult_core::ConsultManager;
//!
//! # async fn example(manager: ConsultManager) {
//! let mut events = manager.subscribe();
//! while let Ok(event) = events.recv().await {
//!     if let CallEvent::Ended { elapsed_seconds, .. } = event {
//!         println!("call lasted {}s", elapsed_seconds);
//!         break;
//!     }
//! }
//! # }
//! ```

use serde::Serialize;

use crate::call::{CallId, CallPhase};
use crate::media::CaptureError;
use crate::provider::ProviderId;

/// Something that happened to the call session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallEvent {
    /// A session was created in the Connecting phase
    Started {
        call_id: CallId,
        provider_id: ProviderId,
    },
    /// The session moved to a new phase
    PhaseChanged { call_id: CallId, phase: CallPhase },
    /// The duration counter advanced
    Tick { call_id: CallId, elapsed_seconds: u64 },
    /// Local capture succeeded and the stream is attached
    LocalStreamReady { call_id: CallId },
    /// Local capture failed; the call continues without a preview
    CaptureUnavailable {
        call_id: CallId,
        #[serde(serialize_with = "serialize_display")]
        error: CaptureError,
    },
    MicrophoneToggled { call_id: CallId, enabled: bool },
    CameraToggled { call_id: CallId, enabled: bool },
    /// The session was torn down and all its resources released
    Ended {
        call_id: CallId,
        provider_id: ProviderId,
        elapsed_seconds: u64,
    },
}

impl CallEvent {
    /// The session this event belongs to
    pub fn call_id(&self) -> CallId {
        match self {
            CallEvent::Started { call_id, .. }
            | CallEvent::PhaseChanged { call_id, .. }
            | CallEvent::Tick { call_id, .. }
            | CallEvent::LocalStreamReady { call_id }
            | CallEvent::CaptureUnavailable { call_id, .. }
            | CallEvent::MicrophoneToggled { call_id, .. }
            | CallEvent::CameraToggled { call_id, .. }
            | CallEvent::Ended { call_id, .. } => *call_id,
        }
    }

    /// Whether this is the frequent timer event
    pub fn is_tick(&self) -> bool {
        matches!(self, CallEvent::Tick { .. })
    }
}

fn serialize_display<S: serde::Serializer>(
    value: &CaptureError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
