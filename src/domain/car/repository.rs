//! Car repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::Car;
use crate::shared::errors::StoreResult;

#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Insert a new car
    async fn add(&self, car: Car) -> StoreResult<()>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Car>>;

    async fn find_by_plate(&self, plate: &str) -> StoreResult<Option<Car>>;

    /// All cars, ordered by plate
    async fn find_all(&self) -> StoreResult<Vec<Car>>;
}
