//! Simulated video call
//!
//! A call moves through a fixed lifecycle:
//!
//! ```text
//!            start(id)              connect delay
//!   idle ───────────────▶ Connecting ─────────────▶ Active
//!    ▲                        │                       │
//!    └──────── end() ─────────┴───────────────────────┘
//! ```
//!
//! The duration counter ticks from the moment of `start`, regardless of
//! phase, and the local capture request runs alongside. A failed capture
//! does not change the lifecycle; the call simply has no local preview.

pub mod session;
pub mod types;

pub use session::CallSession;
pub use types::{
    format_elapsed, CallId, CallPhase, CallSnapshot, CallSummary, LocalPreview, RemoteView,
};
