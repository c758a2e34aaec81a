//! Capacity conflict policy for reservations
//!
//! A category can hold at most as many overlapping confirmed reservations
//! as it has cars. The verdict is recomputed on every check.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::car::CarCategory;
use crate::domain::period::RentalPeriod;
use crate::shared::errors::{DomainError, DomainResult, StoreResult};

/// Outcome of a capacity check. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationConflict {
    None,
    /// The category has no cars at all
    NoCategoryCapacity,
    /// Every car of the category is already taken for part of the period
    OverCapacity,
}

impl ReservationConflict {
    pub fn evaluate(capacity: u64, overlapping_confirmed: u64) -> Self {
        if capacity == 0 {
            Self::NoCategoryCapacity
        } else if overlapping_confirmed >= capacity {
            Self::OverCapacity
        } else {
            Self::None
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn ensure_none(self) -> DomainResult<()> {
        if self.is_none() {
            Ok(())
        } else {
            Err(DomainError::Conflict(self))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::NoCategoryCapacity => "NoCategoryCapacity",
            Self::OverCapacity => "OverCapacity",
        }
    }
}

impl std::fmt::Display for ReservationConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of cars available in a category
#[async_trait]
pub trait CapacitySource: Send + Sync {
    async fn count_cars_in_category(&self, category: &CarCategory) -> StoreResult<u64>;
}

/// Number of confirmed reservations overlapping a period
#[async_trait]
pub trait OverlapSource: Send + Sync {
    /// Counts `Confirmed` reservations of `category` whose period overlaps
    /// `period` (half-open), ignoring `exclude`.
    async fn count_confirmed_overlapping(
        &self,
        category: &CarCategory,
        period: &RentalPeriod,
        exclude: Option<Uuid>,
    ) -> StoreResult<u64>;
}

/// Decides whether a reservation can hold capacity for a period.
///
/// Read-only: two counts, no writes, safe to call repeatedly.
pub struct ReservationConflictPolicy<'a> {
    capacity: &'a dyn CapacitySource,
    overlaps: &'a dyn OverlapSource,
}

impl<'a> ReservationConflictPolicy<'a> {
    pub fn new(capacity: &'a dyn CapacitySource, overlaps: &'a dyn OverlapSource) -> Self {
        Self { capacity, overlaps }
    }

    pub async fn check(
        &self,
        category: &CarCategory,
        period: &RentalPeriod,
        exclude: Option<Uuid>,
    ) -> StoreResult<ReservationConflict> {
        let capacity = self.capacity.count_cars_in_category(category).await?;
        if capacity == 0 {
            return Ok(ReservationConflict::NoCategoryCapacity);
        }

        let overlapping = self
            .overlaps
            .count_confirmed_overlapping(category, period, exclude)
            .await?;

        Ok(ReservationConflict::evaluate(capacity, overlapping))
    }
}
