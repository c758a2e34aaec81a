//! Car rental service: CLI runner
//!
//! Headless process that owns the database, applies migrations and runs
//! the reservation expiry sweep until SIGTERM/SIGINT.
//!
//! ```sh
//! # Run with default config (~/.config/car-rental/config.toml)
//! car-rental-service
//!
//! # Custom config path
//! car-rental-service --config /etc/car-rental/config.toml
//!
//! # Override the database
//! car-rental-service --database-url "sqlite://./fleet.db?mode=rwc"
//!
//! # Validate config without starting
//! car-rental-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use car_rental::config::AppConfig;
use car_rental::server::{init_tracing, ServiceHandle, ServiceOptions};

/// Car rental reservations and rentals service.
#[derive(Parser, Debug)]
#[command(
    name = "car-rental-service",
    version,
    about = "Car rental reservations and rentals service",
    long_about = "Runs the car rental service: SQLite persistence, migrations \
                  and expiry of unconfirmed reservations.\n\n\
                  Default config: ~/.config/car-rental/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "CAR_RENTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Override the database URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Validate the configuration file and exit without starting the service.
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
    let config_path = cli.config.unwrap_or_else(car_rental::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(mut cfg) => {
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            // Init tracing first so subsequent logs are formatted properly
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            if cli.check {
                eprintln!("❌ Configuration is invalid: {}", e);
                std::process::exit(1);
            }
            let mut cfg = AppConfig::default();
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            init_tracing(&cfg);
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            cfg
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(ref level) = cli.log_level {
        info!("CLI override: log_level = {}", level);
    }
    if let Some(url) = cli.database_url {
        info!("CLI override: database_url = {}", url);
        config.database.url = url;
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        if let Err(e) = config.validate() {
            eprintln!("❌ Configuration is invalid: {}", e);
            std::process::exit(1);
        }
        println!("✅ Configuration is valid");
        println!("   Config file    : {}", config_path.display());
        println!("   Database       : {}", config.database.url);
        println!("   Draft TTL      : {} min", config.reservations.draft_ttl_minutes);
        println!("   Expiry sweep   : every {} s", config.reservations.expiry_check_interval_secs);
        println!("   Log level      : {}", config.logging.level);
        return Ok(());
    }

    // ── Start service ──────────────────────────────────────────
    let handle = ServiceHandle::start(ServiceOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    // Install OS signal handlers (SIGTERM, SIGINT)
    handle.install_signal_handler();

    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    // Wait for shutdown signal, then clean up
    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
