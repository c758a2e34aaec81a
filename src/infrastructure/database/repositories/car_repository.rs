//! SeaORM implementation of CarRepository and CapacitySource

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::debug;
use uuid::Uuid;

use crate::domain::car::{Car, CarCategory, CarRepository};
use crate::domain::reservation::CapacitySource;
use crate::infrastructure::database::entities::car;
use crate::shared::errors::{InfraError, StoreResult};

pub struct SeaOrmCarRepository {
    db: DatabaseConnection,
}

impl SeaOrmCarRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: car::Model) -> StoreResult<Car> {
    let category = CarCategory::new(&m.category)
        .map_err(|e| InfraError::Corrupted(format!("car {}: {}", m.id, e)))?;
    Ok(Car {
        id: m.id,
        plate: m.plate,
        category,
        created_at: m.created_at,
    })
}

#[async_trait]
impl CarRepository for SeaOrmCarRepository {
    async fn add(&self, c: Car) -> StoreResult<()> {
        debug!("Saving car: {} ({})", c.plate, c.id);

        let model = car::ActiveModel {
            id: Set(c.id),
            plate: Set(c.plate),
            category: Set(c.category.as_str().to_string()),
            created_at: Set(c.created_at),
        };
        model.insert(&self.db).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Car>> {
        car::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_plate(&self, plate: &str) -> StoreResult<Option<Car>> {
        car::Entity::find()
            .filter(car::Column::Plate.eq(plate))
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_all(&self) -> StoreResult<Vec<Car>> {
        car::Entity::find()
            .order_by_asc(car::Column::Plate)
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }
}

#[async_trait]
impl CapacitySource for SeaOrmCarRepository {
    async fn count_cars_in_category(&self, category: &CarCategory) -> StoreResult<u64> {
        let count = car::Entity::find()
            .filter(car::Column::Category.eq(category.as_str()))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
