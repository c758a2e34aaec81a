//! Background task that periodically expires overdue Draft reservations.
//!
//! Runs in a tokio::spawn loop, calling
//! [`ReservationService::expire_overdue`] every `check_interval_secs`.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{info, warn};

use super::reservation::ReservationService;
use crate::shared::shutdown::ShutdownSignal;

/// Start the reservation expiry background task.
pub fn start_reservation_expiry_task(
    service: Arc<ReservationService>,
    shutdown: ShutdownSignal,
    check_interval_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            check_interval = check_interval_secs,
            "📅 Reservation expiry task started"
        );

        let mut interval = tokio::time::interval(Duration::from_secs(check_interval_secs.max(1)));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = service.expire_overdue(Utc::now()).await {
                        warn!(error = %e, "Reservation expiry check error");
                    }
                }
                _ = shutdown.wait() => {
                    info!("📅 Reservation expiry task shutting down");
                    break;
                }
            }
        }

        info!("📅 Reservation expiry task stopped");
    })
}
