//! Reservation aggregate and its state machine

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::conflict::ReservationConflict;
use crate::domain::car::CarCategory;
use crate::domain::period::RentalPeriod;
use crate::shared::errors::{DomainError, DomainResult};

/// Reservation lifecycle state.
///
/// Each variant carries only the timestamps that exist in that state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationStatus {
    /// Created, period still editable, holds no capacity
    Draft,
    /// Holds capacity; `rental_id` is set once the car is picked up
    Confirmed {
        confirmed_at: DateTime<Utc>,
        rental_id: Option<Uuid>,
    },
    Cancelled {
        confirmed_at: Option<DateTime<Utc>>,
        cancelled_at: DateTime<Utc>,
    },
    /// Draft that was never confirmed before its deadline
    Expired { expired_at: DateTime<Utc> },
}

impl ReservationStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Confirmed { .. } => "Confirmed",
            Self::Cancelled { .. } => "Cancelled",
            Self::Expired { .. } => "Expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::Expired { .. })
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Confirmed { confirmed_at, .. } => Some(*confirmed_at),
            Self::Cancelled { confirmed_at, .. } => *confirmed_at,
            _ => None,
        }
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Cancelled { cancelled_at, .. } => Some(*cancelled_at),
            _ => None,
        }
    }

    pub fn expired_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Expired { expired_at } => Some(*expired_at),
            _ => None,
        }
    }

    pub fn rental_id(&self) -> Option<Uuid> {
        match self {
            Self::Confirmed { rental_id, .. } => *rental_id,
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Reservation of a car category for a rental period.
///
/// All mutation goes through the transition methods below; a failed
/// transition leaves the reservation untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    id: Uuid,
    customer_id: Uuid,
    category: CarCategory,
    period: RentalPeriod,
    status: ReservationStatus,
    created_at: DateTime<Utc>,
}

impl Reservation {
    /// New reservation in `Draft`
    pub fn create(
        customer_id: Uuid,
        category: CarCategory,
        period: RentalPeriod,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            category,
            period,
            status: ReservationStatus::Draft,
            created_at: now,
        }
    }

    /// Rehydrate from storage
    pub fn restore(
        id: Uuid,
        customer_id: Uuid,
        category: CarCategory,
        period: RentalPeriod,
        status: ReservationStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer_id,
            category,
            period,
            status,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }

    pub fn category(&self) -> &CarCategory {
        &self.category
    }

    pub fn period(&self) -> &RentalPeriod {
        &self.period
    }

    pub fn status(&self) -> &ReservationStatus {
        &self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn rental_id(&self) -> Option<Uuid> {
        self.status.rental_id()
    }

    pub fn is_draft(&self) -> bool {
        matches!(self.status, ReservationStatus::Draft)
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.status, ReservationStatus::Confirmed { .. })
    }

    fn invalid_transition(&self, operation: &'static str) -> DomainError {
        DomainError::InvalidStatusTransition {
            entity: "reservation",
            from: self.status.name(),
            operation,
        }
    }

    /// Replace the period of a Draft. `verdict` is the conflict check for the new period.
    pub fn change_period(
        &mut self,
        period: RentalPeriod,
        verdict: ReservationConflict,
    ) -> DomainResult<()> {
        if !self.is_draft() {
            return Err(self.invalid_transition("change the period of"));
        }
        verdict.ensure_none()?;
        self.period = period;
        Ok(())
    }

    pub fn confirm(&mut self, verdict: ReservationConflict, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_draft() {
            return Err(self.invalid_transition("confirm"));
        }
        verdict.ensure_none()?;
        self.status = ReservationStatus::Confirmed {
            confirmed_at: now,
            rental_id: None,
        };
        Ok(())
    }

    /// Not idempotent: cancelling an already cancelled reservation fails.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        let confirmed_at = match &self.status {
            ReservationStatus::Draft => None,
            ReservationStatus::Confirmed { confirmed_at, .. } => Some(*confirmed_at),
            ReservationStatus::Cancelled { .. } | ReservationStatus::Expired { .. } => {
                return Err(self.invalid_transition("cancel"));
            }
        };
        self.status = ReservationStatus::Cancelled {
            confirmed_at,
            cancelled_at: now,
        };
        Ok(())
    }

    /// A Draft expires `draft_ttl` after creation, or when its period starts,
    /// whichever comes first.
    pub fn expiry_deadline(&self, draft_ttl: Duration) -> DateTime<Utc> {
        self.created_at
            .checked_add_signed(draft_ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .min(self.period.start())
    }

    pub fn is_overdue(&self, now: DateTime<Utc>, draft_ttl: Duration) -> bool {
        self.is_draft() && now >= self.expiry_deadline(draft_ttl)
    }

    pub fn expire(&mut self, now: DateTime<Utc>, draft_ttl: Duration) -> DomainResult<()> {
        if !self.is_draft() {
            return Err(self.invalid_transition("expire"));
        }
        if now < self.expiry_deadline(draft_ttl) {
            return Err(self.invalid_transition("expire a not yet overdue"));
        }
        self.status = ReservationStatus::Expired { expired_at: now };
        Ok(())
    }

    /// Link the rental created at pickup. Idempotent for the same rental.
    pub fn mark_as_rented(&mut self, rental: Uuid) -> DomainResult<()> {
        let linked = match &self.status {
            ReservationStatus::Confirmed { rental_id, .. } => *rental_id,
            _ => return Err(self.invalid_transition("rent")),
        };
        match linked {
            Some(existing) if existing == rental => Ok(()),
            Some(_) => Err(self.invalid_transition("re-rent")),
            None => {
                if let ReservationStatus::Confirmed { rental_id, .. } = &mut self.status {
                    *rental_id = Some(rental);
                }
                Ok(())
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
