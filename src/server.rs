//! Reusable car rental service runtime.
//!
//! Provides [`ServiceHandle`] that encapsulates the full lifecycle:
//! database init, migrations, use-case services, the reservation expiry
//! task, and graceful shutdown.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::services::{
    start_reservation_expiry_task, FleetService, RentalService, ReservationService,
};
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::{init_database, run_migrations, SeaOrmRepositoryProvider};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the service.
pub struct ServiceOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

// ── ServiceHandle ──────────────────────────────────────────────────

/// Handle to a running car rental service.
///
/// # Examples
///
/// ```rust,no_run
/// use car_rental::server::{ServiceHandle, ServiceOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServiceHandle::start(ServiceOptions::default()).await?;
///     // ... wait for shutdown signal ...
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServiceHandle {
    /// Repository provider for data access.
    pub repos: Arc<dyn RepositoryProvider>,
    pub reservations: Arc<ReservationService>,
    pub rentals: Arc<RentalService>,
    pub fleet: Arc<FleetService>,
    /// The configuration the service was started with.
    pub config: AppConfig,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    expiry_task: tokio::task::JoinHandle<()>,
}

impl ServiceHandle {
    /// Start the service with the given options.
    ///
    /// This will:
    /// 1. Connect to the database and run migrations
    /// 2. Build the repository provider and use-case services
    /// 3. Start the reservation expiry task
    pub async fn start(opts: ServiceOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting car rental service...");

        // ── Database ───────────────────────────────────────────
        let db = init_database(&app_cfg.database_config()).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            run_migrations(&db).await?;
            info!("Migrations completed");
        }

        // ── Repositories & Services ────────────────────────────
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let reservations = Arc::new(ReservationService::new(
            repos.clone(),
            app_cfg.reservation_settings(),
        ));
        let rentals = Arc::new(RentalService::new(repos.clone(), reservations.clone()));
        let fleet = Arc::new(FleetService::new(repos.clone()));

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);

        // ── Background tasks ───────────────────────────────────
        let expiry_task = start_reservation_expiry_task(
            reservations.clone(),
            shutdown.signal(),
            app_cfg.reservations.expiry_check_interval_secs,
        );

        info!(
            draft_ttl_minutes = app_cfg.reservations.draft_ttl_minutes,
            "🚗 Car rental service started"
        );

        Ok(Self {
            repos,
            reservations,
            rentals,
            fleet,
            config: app_cfg,
            db,
            shutdown,
            expiry_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the service to fully stop after shutdown has been triggered.
    pub async fn wait(self) {
        info!("⏳ Waiting for background tasks to complete...");

        match tokio::time::timeout(self.shutdown.timeout(), self.expiry_task).await {
            Ok(Ok(())) => info!("Reservation expiry task stopped"),
            Ok(Err(e)) => error!("Reservation expiry task panicked: {}", e),
            Err(_) => warn!(
                "Reservation expiry task did not stop within {:?}",
                self.shutdown.timeout()
            ),
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("✅ Database connection closed");
        }

        info!("👋 Car rental service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down car rental service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    /// Check if the background task is still running.
    pub fn is_running(&self) -> bool {
        !self.expiry_task.is_finished()
    }
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServiceHandle::start`]).
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
