//! SeaORM implementation of RentalRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::debug;
use uuid::Uuid;

use crate::domain::rental::{FuelLevel, Handover, Odometer, Rental, RentalRepository};
use crate::infrastructure::database::entities::rental::{self, FuelGauge};
use crate::shared::errors::{InfraError, StoreResult};

pub struct SeaOrmRentalRepository {
    db: DatabaseConnection,
}

impl SeaOrmRentalRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

impl From<FuelGauge> for FuelLevel {
    fn from(g: FuelGauge) -> Self {
        match g {
            FuelGauge::Empty => FuelLevel::Empty,
            FuelGauge::Quarter => FuelLevel::Quarter,
            FuelGauge::Half => FuelLevel::Half,
            FuelGauge::ThreeQuarters => FuelLevel::ThreeQuarters,
            FuelGauge::Full => FuelLevel::Full,
        }
    }
}

impl From<FuelLevel> for FuelGauge {
    fn from(f: FuelLevel) -> Self {
        match f {
            FuelLevel::Empty => FuelGauge::Empty,
            FuelLevel::Quarter => FuelGauge::Quarter,
            FuelLevel::Half => FuelGauge::Half,
            FuelLevel::ThreeQuarters => FuelGauge::ThreeQuarters,
            FuelLevel::Full => FuelGauge::Full,
        }
    }
}

fn corrupted(id: Uuid, what: impl std::fmt::Display) -> InfraError {
    InfraError::Corrupted(format!("rental {}: {}", id, what))
}

fn model_to_domain(m: rental::Model) -> StoreResult<Rental> {
    let pickup = Handover {
        km: Odometer::new(m.km_out).map_err(|e| corrupted(m.id, e))?,
        fuel: m.fuel_out.into(),
        at: m.picked_up_at,
    };

    let returned = match (m.km_in, m.fuel_in, m.returned_at) {
        (Some(km), Some(fuel), Some(at)) => Some(Handover {
            km: Odometer::new(km).map_err(|e| corrupted(m.id, e))?,
            fuel: fuel.into(),
            at,
        }),
        (None, None, None) => None,
        _ => return Err(corrupted(m.id, "partial return readings")),
    };

    Ok(Rental {
        id: m.id,
        reservation_id: m.reservation_id,
        customer_id: m.customer_id,
        car_id: m.car_id,
        pickup,
        returned,
    })
}

fn to_active_model(r: &Rental) -> rental::ActiveModel {
    rental::ActiveModel {
        id: Set(r.id),
        reservation_id: Set(r.reservation_id),
        customer_id: Set(r.customer_id),
        car_id: Set(r.car_id),
        km_out: Set(i64::from(r.pickup.km.km())),
        fuel_out: Set(r.pickup.fuel.into()),
        picked_up_at: Set(r.pickup.at),
        km_in: Set(r.returned.map(|h| i64::from(h.km.km()))),
        fuel_in: Set(r.returned.map(|h| h.fuel.into())),
        returned_at: Set(r.returned.map(|h| h.at)),
    }
}

// ── RentalRepository impl ───────────────────────────────────────

#[async_trait]
impl RentalRepository for SeaOrmRentalRepository {
    async fn add(&self, r: Rental) -> StoreResult<()> {
        debug!("Saving rental: {} for reservation {}", r.id, r.reservation_id);
        to_active_model(&r).insert(&self.db).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Rental>> {
        rental::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_reservation(&self, reservation_id: Uuid) -> StoreResult<Option<Rental>> {
        rental::Entity::find()
            .filter(rental::Column::ReservationId.eq(reservation_id))
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_active_by_car(&self, car_id: Uuid) -> StoreResult<Option<Rental>> {
        rental::Entity::find()
            .filter(rental::Column::CarId.eq(car_id))
            .filter(rental::Column::ReturnedAt.is_null())
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn update(&self, r: Rental) -> StoreResult<()> {
        debug!("Updating rental: {} -> {}", r.id, r.status().as_str());

        let existing = rental::Entity::find_by_id(r.id).one(&self.db).await?;
        if existing.is_none() {
            return Err(corrupted(r.id, "update of a row that does not exist"));
        }

        to_active_model(&r).update(&self.db).await?;
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> StoreResult<()> {
        debug!("Removing rental: {}", id);
        rental::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
