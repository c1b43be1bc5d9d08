//! # Docbot Consult Core
//!
//! State containers behind the Docbot provider directory and its simulated
//! video consultation:
//!
//! - **[`DirectoryFilter`]** - search query over a fixed, ordered provider
//!   catalog; yields the visible providers on every read
//! - **[`CallSession`]** - one call at a time: Connecting → Active after a
//!   fixed delay, a one-second duration counter, local camera/microphone
//!   capture, mute/camera toggles, and teardown of all of it on hang-up
//! - **[`ConsultManager`]** - composes the two and gates calls on provider
//!   availability
//!
//! There is no signaling and no remote media. "Connecting" is a timer and the
//! remote participant is a placeholder.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docbot_consult_core::{ConsultManager, ProviderId, events::CallEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = ConsultManager::builder().build()?;
//!     let mut events = manager.subscribe();
//!
//!     manager.start_call(ProviderId(1))?;
//!     while let Ok(event) = events.recv().await {
//!         if let CallEvent::Tick { elapsed_seconds: 10, .. } = event {
//!             break;
//!         }
//!     }
//!     manager.end_call();
//!     Ok(())
//! }
//! ```

pub mod call;
pub mod config;
pub mod directory;
pub mod error;
pub mod events;
pub mod logging;
pub mod manager;
pub mod media;
pub mod provider;

// Re-export main types
pub use call::{format_elapsed, CallId, CallPhase, CallSession, CallSnapshot, CallSummary};
pub use config::{ConsultConfig, TrackControlMode};
pub use directory::DirectoryFilter;
pub use error::{ConsultError, ConsultResult, TargetRejection};
pub use events::CallEvent;
pub use manager::{ConsultManager, ConsultManagerBuilder};
pub use media::{CaptureError, MediaDevice, MockMediaDevice};
pub use provider::{Provider, ProviderCard, ProviderCatalog, ProviderId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
