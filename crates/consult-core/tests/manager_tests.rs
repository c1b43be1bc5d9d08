//! End-to-end flows through the consult manager

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use docbot_consult_core::media::{CaptureError, MockMediaDevice};
use docbot_consult_core::{
    CallPhase, ConsultConfig, ConsultError, ConsultManager, Provider, ProviderId,
    TargetRejection,
};
use tokio::time::sleep;

fn manager_with(device: &Arc<MockMediaDevice>) -> ConsultManager {
    ConsultManager::builder()
        .media_device(device.clone())
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_offline_then_online_scenario() {
    let device = Arc::new(MockMediaDevice::new());
    let manager = manager_with(&device);

    let err = manager.start_call(ProviderId(3)).unwrap_err();
    assert_eq!(err.rejection(), Some(TargetRejection::ProviderOffline));
    assert_eq!(manager.snapshot().target_provider_id, None);
    assert_eq!(device.request_count(), 0);

    manager.start_call(ProviderId(1)).unwrap();
    assert_eq!(manager.snapshot().phase, Some(CallPhase::Connecting));

    sleep(Duration::from_millis(2500)).await;
    let snapshot = manager.snapshot();
    assert_eq!(snapshot.phase, Some(CallPhase::Active));
    assert_eq!(snapshot.elapsed_seconds, 2);

    sleep(Duration::from_secs(3)).await;
    assert_eq!(manager.snapshot().elapsed_seconds, 5);

    manager.end_call();
    assert!(!manager.snapshot().is_in_call());
    assert_eq!(device.live_track_count(), 0);
}

#[tokio::test]
async fn test_unknown_provider_is_rejected() {
    let manager = ConsultManager::builder().build().unwrap();

    let err = manager.start_call(ProviderId(99)).unwrap_err();
    assert!(matches!(
        err,
        ConsultError::InvalidTarget {
            provider_id: ProviderId(99),
            reason: TargetRejection::UnknownProvider,
        }
    ));
    assert!(!manager.session().is_in_call());
}

#[tokio::test]
async fn test_offline_rejection_leaves_running_call_alone() {
    let manager = ConsultManager::builder().build().unwrap();

    manager.start_call(ProviderId(2)).unwrap();
    let err = manager.start_call(ProviderId(5)).unwrap_err();
    assert_eq!(err.rejection(), Some(TargetRejection::ProviderOffline));

    let err = manager.start_call(ProviderId(4)).unwrap_err();
    assert_eq!(err.rejection(), Some(TargetRejection::CallInProgress));

    assert_eq!(manager.active_provider().unwrap().name, "Dr. Michael Patel");
    manager.end_call();
    assert!(manager.active_provider().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_directory_is_independent_of_call() {
    let device = Arc::new(MockMediaDevice::failing(CaptureError::DeviceBusy));
    let manager = manager_with(&device);

    manager.set_query("psych");
    manager.start_call(ProviderId(1)).unwrap();
    assert_eq!(manager.query(), "psych");
    assert_eq!(
        manager
            .visible_providers()
            .iter()
            .map(|p| p.id)
            .collect::<Vec<_>>(),
        vec![ProviderId(5)]
    );

    sleep(Duration::from_millis(2500)).await;
    assert_eq!(manager.snapshot().phase, Some(CallPhase::Active));

    manager.end_call();
    manager.clear_query();
    assert_eq!(manager.visible_cards().len(), 5);
}

#[tokio::test]
async fn test_toggles_without_call_report_no_active_call() {
    let manager = ConsultManager::builder().build().unwrap();
    assert!(matches!(
        manager.toggle_microphone(),
        Err(ConsultError::NoActiveCall)
    ));
    assert!(manager.end_call().is_none());
}

#[test]
fn test_builder_loads_provider_file_from_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"id": 1, "name": "Dr. Nia Obi", "specialty": "Allergist", "imageRef": "nia.png", "isOnline": true}},
            {{"id": 2, "name": "Dr. Tom Berg", "specialty": "Dermatologist", "imageRef": "tom.png", "isOnline": true}}
        ]"#
    )
    .unwrap();

    let config = ConsultConfig::default().with_providers_path(file.path());
    let manager = ConsultManager::builder().config(config).build().unwrap();

    manager.set_query("derm");
    let visible = manager.visible_providers();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name, "Dr. Tom Berg");
}

#[tokio::test]
async fn test_builder_with_explicit_providers() {
    let manager = ConsultManager::builder()
        .config(ConsultConfig::default().with_providers_path("/ignored/when/explicit.json"))
        .providers(vec![
            Provider::new(7, "Dr. Ada Quinn", "Cardiologist", "ada.png", true),
            Provider::new(8, "Dr. Ben Ross", "Cardiologist", "ben.png", false),
        ])
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(manager.provider_count(), 2);
    assert_eq!(manager.config().connect_delay_ms, 2000);

    let err = manager.start_call(ProviderId(8)).unwrap_err();
    assert_eq!(err.rejection(), Some(TargetRejection::ProviderOffline));
    manager.start_call(ProviderId(7)).unwrap();
    assert_eq!(manager.active_provider().unwrap().name, "Dr. Ada Quinn");
    manager.end_call();
}

#[test]
fn test_builder_rejects_duplicate_providers() {
    let err = ConsultManager::builder()
        .providers(vec![
            Provider::new(1, "Dr. One", "Allergist", "1.png", true),
            Provider::new(1, "Dr. Also One", "Allergist", "2.png", true),
        ])
        .unwrap_err();
    assert!(matches!(
        err,
        ConsultError::DuplicateProvider {
            provider_id: ProviderId(1)
        }
    ));
}

#[test]
fn test_builder_rejects_missing_provider_file() {
    let config = ConsultConfig::default().with_providers_path("/nonexistent/providers.json");
    let err = ConsultManager::builder().config(config).build().unwrap_err();
    assert!(matches!(err, ConsultError::ProviderSource { .. }));
}

#[test]
fn test_builder_rejects_invalid_config() {
    let config = ConsultConfig::default().with_event_capacity(0);
    let err = ConsultManager::builder().config(config).build().unwrap_err();
    assert!(matches!(err, ConsultError::Configuration { .. }));
}
