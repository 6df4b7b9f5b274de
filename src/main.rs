//! Meetbook booking service
//!
//! ```sh
//! # Run with default config (~/.config/meetbook/config.toml)
//! meetbook-service
//!
//! # Custom config path and port
//! meetbook-service --config /etc/meetbook/config.toml --api-port 9090
//!
//! # Validate config without starting
//! meetbook-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use meetbook::config::{default_config_path, AppConfig, ConfigError};
use meetbook::server::{init_tracing, ServerHandle, ServerOptions};

/// Meeting room booking service.
#[derive(Parser, Debug)]
#[command(
    name = "meetbook-service",
    version,
    about = "Meeting room booking service",
    long_about = "Meetbook: REST API for booking meeting rooms, door check-in and \
                  start reminders.\n\n\
                  Default config: ~/.config/meetbook/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "MEETBOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    let (mut config, from_file) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, true),
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            (AppConfig::default(), false)
        }
        Err(e) => {
            eprintln!("❌ {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("✅ Configuration is valid");
        println!(
            "   Config file : {}{}",
            config_path.display(),
            if from_file { "" } else { " (not found, defaults)" }
        );
        println!("   API address : {}:{}", config.server.api_host, config.server.api_port);
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        println!(
            "   Reminders   : {} ({} min lead, {}:00-{}:00 UTC)",
            if config.reminder.enabled { "on" } else { "off" },
            config.reminder.lead_minutes,
            config.reminder.active_start_hour,
            config.reminder.active_end_hour
        );
        return Ok(());
    }

    init_tracing(&config);
    if from_file {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        warn!(
            "No config at {}, using defaults",
            config_path.display()
        );
    }
    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;

    Ok(())
}
