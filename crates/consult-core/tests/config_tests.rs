//! Configuration loading: TOML file layered under DOCBOT_* variables

use std::io::Write;
use std::time::Duration;

use docbot_consult_core::config::{ConsultConfig, TrackControlMode};
use docbot_consult_core::ConsultError;
use serial_test::serial;

const ENV_KEYS: &[&str] = &[
    "DOCBOT_CONNECT_DELAY_MS",
    "DOCBOT_TRACK_CONTROL",
    "DOCBOT_CAPTURE__VIDEO",
    "DOCBOT_TICK_INTERVAL_MS",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

fn toml_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_load_without_file_uses_defaults() {
    clear_env();
    let config = ConsultConfig::load(None).unwrap();
    assert_eq!(config, ConsultConfig::default());
}

#[test]
#[serial]
fn test_load_reads_file() {
    clear_env();
    let file = toml_file(
        r#"
        connect_delay_ms = 3000
        track_control = "cosmetic"
        event_capacity = 16
        "#,
    );

    let config = ConsultConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.connect_delay(), Duration::from_secs(3));
    assert_eq!(config.track_control, TrackControlMode::Cosmetic);
    assert_eq!(config.event_capacity, 16);
    assert!(config.capture.video);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let file = toml_file("connect_delay_ms = 3000\n");

    std::env::set_var("DOCBOT_CONNECT_DELAY_MS", "750");
    std::env::set_var("DOCBOT_CAPTURE__VIDEO", "false");
    let result = ConsultConfig::load(Some(file.path()));
    clear_env();

    let config = result.unwrap();
    assert_eq!(config.connect_delay_ms, 750);
    assert!(!config.capture.video);
    assert!(config.capture.audio);
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    clear_env();
    let file = toml_file("tick_interval_ms = 0\n");
    let err = ConsultConfig::load(Some(file.path())).unwrap_err();
    assert!(matches!(err, ConsultError::Configuration { .. }));
}

#[test]
#[serial]
fn test_missing_file_is_an_error() {
    clear_env();
    let err = ConsultConfig::load(Some(std::path::Path::new("/nonexistent/docbot.toml")))
        .unwrap_err();
    assert!(matches!(err, ConsultError::Configuration { .. }));
}
