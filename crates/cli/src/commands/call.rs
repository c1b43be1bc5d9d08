//! Call command - run a simulated consultation

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use docbot_consult_core::call::RemoteView;
use docbot_consult_core::config::TrackControlMode;
use docbot_consult_core::media::{CaptureError, MockMediaDevice};
use docbot_consult_core::{
    format_elapsed, CallEvent, CallPhase, ConsultConfig, ConsultManager, ProviderId,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// Options for a single consultation
#[derive(Debug, Clone)]
pub struct CallOptions {
    pub provider_id: ProviderId,
    /// `None` waits for Ctrl+C
    pub hold: Option<Duration>,
    pub deny_camera: bool,
    pub cosmetic_toggles: bool,
    pub mute_at: Option<u64>,
}

/// Execute call command
pub async fn execute(mut config: ConsultConfig, options: CallOptions, json: bool) -> Result<()> {
    if options.cosmetic_toggles {
        config = config.with_track_control(TrackControlMode::Cosmetic);
    }
    let device = if options.deny_camera {
        MockMediaDevice::failing(CaptureError::PermissionDenied)
    } else {
        MockMediaDevice::new()
    };

    let manager = ConsultManager::builder()
        .config(config)
        .media_device(Arc::new(device))
        .build()?;

    let mut events = manager.subscribe();
    manager.start_call(options.provider_id)?;

    if let Some(provider) = manager.active_provider() {
        info!(
            "Calling {} ({}), connecting in {} ms",
            provider.name,
            provider.specialty,
            manager.config().connect_delay_ms
        );
        if !json {
            println!(
                "{} {} - {}",
                "Calling".bold(),
                provider.name,
                provider.specialty.dimmed()
            );
        }
    }

    let hold = async move {
        match options.hold {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(hold);

    loop {
        tokio::select! {
            _ = &mut hold => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, hanging up");
                break;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let CallEvent::Tick { elapsed_seconds, .. } = &event {
                        if options.mute_at == Some(*elapsed_seconds) {
                            manager.toggle_microphone()?;
                        }
                    }
                    print_event(&event, json)?;
                }
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {} call events", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    }

    manager.end_call();
    while let Ok(event) = events.try_recv() {
        print_event(&event, json)?;
    }
    Ok(())
}

fn print_event(event: &CallEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    match event {
        CallEvent::Started { .. } => println!("{}", RemoteView::Connecting.caption().yellow()),
        CallEvent::PhaseChanged { phase, .. } => {
            if *phase == CallPhase::Active {
                println!(
                    "{} {}",
                    "Connected.".green().bold(),
                    RemoteView::Placeholder.caption().dimmed()
                );
            }
        }
        CallEvent::Tick { elapsed_seconds, .. } => {
            println!("  {}", format_elapsed(*elapsed_seconds).dimmed())
        }
        CallEvent::LocalStreamReady { .. } => println!("Camera and microphone ready"),
        CallEvent::CaptureUnavailable { error, .. } => println!(
            "{} {}",
            "Local preview unavailable:".yellow(),
            error
        ),
        CallEvent::MicrophoneToggled { enabled, .. } => {
            println!("Microphone {}", if *enabled { "on" } else { "muted" })
        }
        CallEvent::CameraToggled { enabled, .. } => {
            println!("Camera {}", if *enabled { "on" } else { "off" })
        }
        CallEvent::Ended {
            elapsed_seconds, ..
        } => println!(
            "{} after {}",
            "Call ended".bold(),
            format_elapsed(*elapsed_seconds)
        ),
    }
    Ok(())
}
