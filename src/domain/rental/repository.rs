//! Rental repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::Rental;
use crate::shared::errors::StoreResult;

#[async_trait]
pub trait RentalRepository: Send + Sync {
    async fn add(&self, rental: Rental) -> StoreResult<()>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Rental>>;

    /// At most one rental exists per reservation
    async fn find_by_reservation(&self, reservation_id: Uuid) -> StoreResult<Option<Rental>>;

    /// Rental of this car that has not been returned yet
    async fn find_active_by_car(&self, car_id: Uuid) -> StoreResult<Option<Rental>>;

    async fn update(&self, rental: Rental) -> StoreResult<()>;

    /// Drop a rental whose pickup could not be completed
    async fn remove(&self, id: Uuid) -> StoreResult<()>;
}
