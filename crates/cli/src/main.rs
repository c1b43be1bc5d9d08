//! Main entry point for the Docbot CLI
//!
//! Browses the provider directory and runs simulated consultations against
//! the mock capture device.

mod commands;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use docbot_consult_core::config::ConsultConfig;
use docbot_consult_core::logging::{parse_log_level, setup_logging, LogFormat, LoggingConfig};
use docbot_consult_core::{ProviderId, VERSION};

use crate::commands::call::CallOptions;

#[derive(Parser, Debug)]
#[command(
    name = "docbot",
    version = VERSION,
    about = "Find a care provider and start a video consultation"
)]
struct Cli {
    /// Configuration file (TOML). Defaults to <config dir>/docbot/config.toml if present
    #[arg(long, short, global = true, env = "DOCBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Provider list (JSON); overrides the configured providers_path
    #[arg(long, global = true)]
    providers: Option<PathBuf>,

    /// Log level written to stderr
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Prefix log lines with source file and line
    #[arg(long, global = true)]
    log_source: bool,

    /// Log when each call's span opens and closes
    #[arg(long, global = true)]
    log_spans: bool,

    /// Emit JSON instead of tables and coloured text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List providers, optionally filtered by name or specialty
    List {
        /// Case-insensitive search text
        #[arg(long, short)]
        query: Option<String>,
    },
    /// Start a consultation with an online provider
    Call {
        /// Provider id as shown by `docbot list`
        provider_id: u32,

        /// Hang up after this many seconds (default: wait for Ctrl+C)
        #[arg(long, value_name = "SECS")]
        hold: Option<u64>,

        /// Simulate the user refusing camera/microphone access
        #[arg(long)]
        deny_camera: bool,

        /// Toggles only change the on-screen state; tracks keep flowing
        #[arg(long)]
        cosmetic_toggles: bool,

        /// Mute the microphone when the call timer reaches this value
        #[arg(long, value_name = "SECS")]
        mute_at: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = if cli.json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    let logging = LoggingConfig::new(parse_log_level(&cli.log_level)?)
        .with_format(format)
        .with_source_location(cli.log_source)
        .with_call_spans(cli.log_spans);
    setup_logging(&logging)?;

    let config_path = cli.config.or_else(default_config_path);
    let mut config = ConsultConfig::load(config_path.as_deref())?;
    if let Some(path) = cli.providers {
        config = config.with_providers_path(path);
    }

    match cli.command {
        Command::List { query } => commands::list::execute(config, query.as_deref(), cli.json),
        Command::Call {
            provider_id,
            hold,
            deny_camera,
            cosmetic_toggles,
            mute_at,
        } => {
            let options = CallOptions {
                provider_id: ProviderId(provider_id),
                hold: hold.map(Duration::from_secs),
                deny_camera,
                cosmetic_toggles,
                mute_at,
            };
            commands::call::execute(config, options, cli.json).await
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("docbot").join("config.toml");
    path.is_file().then_some(path)
}
