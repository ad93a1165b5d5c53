//! API keys service binary
//!
//! ```sh
//! # Run with default config (~/.config/apikeys-service/config.toml)
//! apikeys-service
//!
//! # Custom config path and port
//! apikeys-service --config /etc/apikeys-service/config.toml --port 9000
//!
//! # Validate config without starting
//! apikeys-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use apikeys::config::{AppConfig, CONFIG_ENV};
use apikeys::server::{init_tracing, ServerHandle, ServerOptions};

/// Versioned REST API for managing API keys.
#[derive(Parser, Debug)]
#[command(
    name = "apikeys-service",
    version,
    about = "Versioned REST API for API key management",
    long_about = "REST API for creating, listing, fetching and deleting API keys.\n\n\
                  Default config: ~/.config/apikeys-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the admin user and initial API key.
    #[arg(long)]
    no_bootstrap: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(apikeys::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) if cli.check => {
            eprintln!("Invalid configuration in {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config from {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.server.address());
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        bootstrap: !cli.no_bootstrap,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
