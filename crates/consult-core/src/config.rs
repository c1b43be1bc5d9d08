//! Consultation configuration
//!
//! [`ConsultConfig`] carries the timings of the simulated call, the capture
//! request, how the mute/camera toggles behave, and where provider data comes
//! from. It can be built in code with the `with_*` methods or loaded from an
//! optional TOML file layered under `DOCBOT_*` environment variables.
//!
//! # Usage Examples
//!
//! ```rust
//! use docbot_consult_core::config::{ConsultConfig, TrackControlMode};
//! use std::time::Duration;
//!
//! let config = ConsultConfig::new()
//!     .with_connect_delay(Duration::from_millis(500))
//!     .with_track_control(TrackControlMode::Cosmetic);
//!
//! assert_eq!(config.connect_delay(), Duration::from_millis(500));
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Loading from TOML
//!
//! ```rust
//! use docbot_consult_core::config::ConsultConfig;
//!
//! let config = ConsultConfig::from_toml_str(r#"
//!     connect_delay_ms = 1500
//!     track_control = "cosmetic"
//!
//!     [capture]
//!     audio = true
//!     video = false
//! "#).unwrap();
//!
//! assert_eq!(config.connect_delay_ms, 1500);
//! assert!(!config.capture.video);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConsultError, ConsultResult};
use crate::media::CaptureConstraints;

/// Prefix of environment variables that override file settings
pub const ENV_PREFIX: &str = "DOCBOT";

/// Delay between starting a call and showing it as connected
pub const DEFAULT_CONNECT_DELAY_MS: u64 = 2000;
/// Resolution of the call-duration counter
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
/// Buffered call events per subscriber
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// How the microphone and camera toggles act on the local stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackControlMode {
    /// Toggles also enable/disable the matching tracks on the stream
    #[default]
    Hardware,
    /// Toggles only change the session flags; tracks keep flowing
    Cosmetic,
}

/// Configuration for the consultation core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsultConfig {
    /// Simulated handshake time from start to Active, in milliseconds
    pub connect_delay_ms: u64,
    /// Call timer resolution, in milliseconds
    pub tick_interval_ms: u64,
    /// Toggle semantics
    pub track_control: TrackControlMode,
    /// What to request from the capture device
    pub capture: CaptureConstraints,
    /// Capacity of the call event broadcast channel
    pub event_capacity: usize,
    /// JSON provider list; the built-in seed is used when unset
    pub providers_path: Option<PathBuf>,
}

impl Default for ConsultConfig {
    fn default() -> Self {
        Self {
            connect_delay_ms: DEFAULT_CONNECT_DELAY_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            track_control: TrackControlMode::default(),
            capture: CaptureConstraints::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            providers_path: None,
        }
    }
}

impl ConsultConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_track_control(mut self, mode: TrackControlMode) -> Self {
        self.track_control = mode;
        self
    }

    pub fn with_capture(mut self, capture: CaptureConstraints) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn with_providers_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.providers_path = Some(path.into());
        self
    }

    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check the settings are usable
    pub fn validate(&self) -> ConsultResult<()> {
        if self.connect_delay_ms == 0 {
            return Err(ConsultError::config("connect_delay_ms must be greater than zero"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConsultError::config("tick_interval_ms must be greater than zero"));
        }
        if self.capture.is_empty() {
            return Err(ConsultError::config(
                "capture must request at least one of audio or video",
            ));
        }
        if self.event_capacity == 0 {
            return Err(ConsultError::config("event_capacity must be greater than zero"));
        }
        Ok(())
    }

    /// Load from an optional TOML file, then `DOCBOT_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `DOCBOT_CAPTURE__VIDEO=false`.
    pub fn load(path: Option<&Path>) -> ConsultResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config: Self = builder
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        config.validate()?;
        tracing::debug!("Loaded consult configuration: {:?}", config);
        Ok(config)
    }

    /// Parse TOML text (no environment overlay)
    pub fn from_toml_str(toml: &str) -> ConsultResult<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
