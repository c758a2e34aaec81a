//! Application ports (hexagonal architecture boundaries)
//!
//! [`ReservationFacade`] is the only way the rentals side reads or changes
//! reservations. The production implementation is
//! [`ReservationService`](crate::application::services::ReservationService).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{CarCategory, RentalPeriod, Reservation, ReservationStatus};
use crate::shared::errors::AppResult;

/// Read model of a confirmed reservation, as seen from the rentals side
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedReservation {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub category: CarCategory,
    pub period: RentalPeriod,
    pub confirmed_at: DateTime<Utc>,
    pub rental_id: Option<Uuid>,
}

impl ConfirmedReservation {
    /// `None` unless the reservation is currently `Confirmed`
    pub fn from_reservation(reservation: &Reservation) -> Option<Self> {
        match reservation.status() {
            ReservationStatus::Confirmed {
                confirmed_at,
                rental_id,
            } => Some(Self {
                id: reservation.id(),
                customer_id: reservation.customer_id(),
                category: reservation.category().clone(),
                period: *reservation.period(),
                confirmed_at: *confirmed_at,
                rental_id: *rental_id,
            }),
            _ => None,
        }
    }
}

#[async_trait]
pub trait ReservationFacade: Send + Sync {
    /// `Ok(None)` when the reservation is missing or not confirmed
    async fn find_confirmed_by_id(&self, id: Uuid) -> AppResult<Option<ConfirmedReservation>>;

    /// Link a rental to a confirmed reservation. Repeating the call with the
    /// same rental is a no-op.
    async fn mark_as_rented(&self, reservation_id: Uuid, rental_id: Uuid) -> AppResult<()>;
}
