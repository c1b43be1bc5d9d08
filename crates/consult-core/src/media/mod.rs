//! Local Media Capture
//!
//! Camera and microphone access for the consultation UI. The call session
//! asks a [`MediaDevice`] for an audio+video [`LocalStream`] and holds that
//! stream for exactly as long as the session lives.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐    ┌─────────────────────┐    ┌─────────────────────┐
//! │    CallSession      │    │  MediaDevice trait  │    │  Capture backend    │
//! │                     │    │                     │    │                     │
//! │ start() ─ acquire() │───▶│ acquire(constraints)│───▶│ mock / platform     │
//! │ end()   ─ drop      │    │  -> LocalStream     │    │                     │
//! └─────────────────────┘    └─────────────────────┘    └─────────────────────┘
//!           │
//!           ▼
//! ┌─────────────────────┐
//! │    LocalStream      │  owns MediaTrack(s); stop()/Drop stops them all
//! └─────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use docbot_consult_core::media::{CaptureConstraints, MediaDevice, MockMediaDevice};
//!
//! # tokio_test::block_on(async {
//! let device = MockMediaDevice::new();
//! let stream = device.acquire(CaptureConstraints::audio_video()).await?;
//! assert_eq!(stream.tracks().len(), 2);
//!
//! // Releasing the handle releases the hardware
//! drop(stream);
//! assert_eq!(device.live_track_count(), 0);
//! # Ok::<(), docbot_consult_core::CaptureError>(())
//! # }).unwrap();
//! ```

pub mod device;
pub mod mock;

// Re-exports for convenience
pub use device::{
    CaptureConstraints, CaptureError, LocalStream, MediaDevice, MediaTrack, TrackKind, TrackProbe,
};
pub use mock::MockMediaDevice;
