//! Reservation repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::model::Reservation;
use crate::shared::errors::StoreResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a new reservation
    async fn add(&self, reservation: Reservation) -> StoreResult<()>;

    /// Find reservation by ID
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Reservation>>;

    /// Update an existing reservation
    async fn update(&self, reservation: Reservation) -> StoreResult<()>;

    /// Find all reservations (any status), newest first
    async fn find_all(&self) -> StoreResult<Vec<Reservation>>;

    /// All reservations of one customer, newest first
    async fn find_by_customer(&self, customer_id: Uuid) -> StoreResult<Vec<Reservation>>;

    /// Drafts with `created_at <= created_cutoff` or `start <= start_cutoff`.
    ///
    /// The aggregate makes the final overdue decision.
    async fn find_expiry_candidates(
        &self,
        created_cutoff: DateTime<Utc>,
        start_cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<Reservation>>;
}
