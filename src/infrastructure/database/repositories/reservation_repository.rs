//! SeaORM implementation of ReservationRepository and OverlapSource

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QueryTrait, Set,
};
use tracing::debug;
use uuid::Uuid;

use crate::domain::car::CarCategory;
use crate::domain::period::RentalPeriod;
use crate::domain::reservation::{
    OverlapSource, Reservation, ReservationRepository, ReservationStatus,
};
use crate::infrastructure::database::entities::reservation::{self, ReservationState};
use crate::shared::errors::{InfraError, StoreResult};

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn corrupted(id: Uuid, what: impl std::fmt::Display) -> InfraError {
    InfraError::Corrupted(format!("reservation {}: {}", id, what))
}

fn status_from_model(m: &reservation::Model) -> StoreResult<ReservationStatus> {
    let status = match m.status {
        ReservationState::Draft => ReservationStatus::Draft,
        ReservationState::Confirmed => ReservationStatus::Confirmed {
            confirmed_at: m
                .confirmed_at
                .ok_or_else(|| corrupted(m.id, "confirmed without confirmed_at"))?,
            rental_id: m.rental_id,
        },
        ReservationState::Cancelled => ReservationStatus::Cancelled {
            confirmed_at: m.confirmed_at,
            cancelled_at: m
                .cancelled_at
                .ok_or_else(|| corrupted(m.id, "cancelled without cancelled_at"))?,
        },
        ReservationState::Expired => ReservationStatus::Expired {
            expired_at: m
                .expired_at
                .ok_or_else(|| corrupted(m.id, "expired without expired_at"))?,
        },
    };
    Ok(status)
}

fn state_of(status: &ReservationStatus) -> ReservationState {
    match status {
        ReservationStatus::Draft => ReservationState::Draft,
        ReservationStatus::Confirmed { .. } => ReservationState::Confirmed,
        ReservationStatus::Cancelled { .. } => ReservationState::Cancelled,
        ReservationStatus::Expired { .. } => ReservationState::Expired,
    }
}

fn model_to_domain(m: reservation::Model) -> StoreResult<Reservation> {
    let status = status_from_model(&m)?;
    let category = CarCategory::new(&m.category).map_err(|e| corrupted(m.id, e))?;
    let period = RentalPeriod::new(m.start_at, m.end_at).map_err(|e| corrupted(m.id, e))?;
    Ok(Reservation::restore(
        m.id,
        m.customer_id,
        category,
        period,
        status,
        m.created_at,
    ))
}

fn to_active_model(r: &Reservation) -> reservation::ActiveModel {
    let status = r.status();
    reservation::ActiveModel {
        id: Set(r.id()),
        customer_id: Set(r.customer_id()),
        category: Set(r.category().as_str().to_string()),
        start_at: Set(r.period().start()),
        end_at: Set(r.period().end()),
        status: Set(state_of(status)),
        created_at: Set(r.created_at()),
        confirmed_at: Set(status.confirmed_at()),
        cancelled_at: Set(status.cancelled_at()),
        expired_at: Set(status.expired_at()),
        rental_id: Set(status.rental_id()),
    }
}

fn collect(models: Vec<reservation::Model>) -> StoreResult<Vec<Reservation>> {
    models.into_iter().map(model_to_domain).collect()
}

// ── ReservationRepository impl ──────────────────────────────────

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn add(&self, r: Reservation) -> StoreResult<()> {
        debug!("Saving reservation: {}", r.id());
        to_active_model(&r).insert(&self.db).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Reservation>> {
        reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn update(&self, r: Reservation) -> StoreResult<()> {
        debug!("Updating reservation: {} -> {}", r.id(), r.status().name());

        let existing = reservation::Entity::find_by_id(r.id()).one(&self.db).await?;
        if existing.is_none() {
            return Err(corrupted(r.id(), "update of a row that does not exist"));
        }

        to_active_model(&r).update(&self.db).await?;
        Ok(())
    }

    async fn find_all(&self) -> StoreResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .order_by_desc(reservation::Column::CreatedAt)
            .all(&self.db)
            .await?;
        collect(models)
    }

    async fn find_by_customer(&self, customer_id: Uuid) -> StoreResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::CustomerId.eq(customer_id))
            .order_by_desc(reservation::Column::CreatedAt)
            .all(&self.db)
            .await?;
        collect(models)
    }

    async fn find_expiry_candidates(
        &self,
        created_cutoff: DateTime<Utc>,
        start_cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::Status.eq(ReservationState::Draft))
            .filter(
                Condition::any()
                    .add(reservation::Column::CreatedAt.lte(created_cutoff))
                    .add(reservation::Column::StartAt.lte(start_cutoff)),
            )
            .order_by_desc(reservation::Column::CreatedAt)
            .all(&self.db)
            .await?;
        collect(models)
    }
}

#[async_trait]
impl OverlapSource for SeaOrmReservationRepository {
    async fn count_confirmed_overlapping(
        &self,
        category: &CarCategory,
        period: &RentalPeriod,
        exclude: Option<Uuid>,
    ) -> StoreResult<u64> {
        // Half-open intervals: touching endpoints do not overlap
        let count = reservation::Entity::find()
            .filter(reservation::Column::Status.eq(ReservationState::Confirmed))
            .filter(reservation::Column::Category.eq(category.as_str()))
            .filter(reservation::Column::StartAt.lt(period.end()))
            .filter(reservation::Column::EndAt.gt(period.start()))
            .apply_if(exclude, |q, id| q.filter(reservation::Column::Id.ne(id)))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
