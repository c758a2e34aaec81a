//! Rental domain entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::readings::{FuelLevel, Odometer};
use crate::shared::errors::{DomainError, DomainResult};

/// Rental status, derived from whether a return was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentalStatus {
    /// Car is with the customer
    Active,
    /// Car is back
    Completed,
}

impl RentalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }
}

/// Odometer and fuel readings at the moment the car changed hands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handover {
    pub km: Odometer,
    pub fuel: FuelLevel,
    pub at: DateTime<Utc>,
}

/// A car rental created from a confirmed reservation
#[derive(Debug, Clone, PartialEq)]
pub struct Rental {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub customer_id: Uuid,
    pub car_id: Uuid,
    pub pickup: Handover,
    /// Set exactly once, by [`Rental::return_car`]
    pub returned: Option<Handover>,
}

impl Rental {
    pub fn pick_up(reservation_id: Uuid, customer_id: Uuid, car_id: Uuid, pickup: Handover) -> Self {
        Self {
            id: Uuid::new_v4(),
            reservation_id,
            customer_id,
            car_id,
            pickup,
            returned: None,
        }
    }

    pub fn status(&self) -> RentalStatus {
        if self.returned.is_some() {
            RentalStatus::Completed
        } else {
            RentalStatus::Active
        }
    }

    pub fn return_car(&mut self, handover: Handover) -> DomainResult<()> {
        if self.returned.is_some() {
            return Err(DomainError::InvalidStatusTransition {
                entity: "rental",
                from: self.status().as_str(),
                operation: "return",
            });
        }
        if handover.km < self.pickup.km {
            return Err(DomainError::InvalidKm(format!(
                "return reading {} is below pickup reading {}",
                handover.km, self.pickup.km
            )));
        }
        self.returned = Some(handover);
        Ok(())
    }

    /// Distance driven, once returned
    pub fn km_driven(&self) -> Option<u32> {
        self.returned.map(|r| r.km.km() - self.pickup.km.km())
    }
}

// ── Tests ──────────────────────────────────────────────────────
