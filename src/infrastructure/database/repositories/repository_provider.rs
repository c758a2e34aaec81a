//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::car::CarRepository;
use crate::domain::customer::CustomerRepository;
use crate::domain::rental::RentalRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::reservation::{CapacitySource, OverlapSource, ReservationRepository};

use super::car_repository::SeaOrmCarRepository;
use super::customer_repository::SeaOrmCustomerRepository;
use super::rental_repository::SeaOrmRentalRepository;
use super::reservation_repository::SeaOrmReservationRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let car = repos.cars().find_by_plate("AB-123").await?;
/// let n = repos.capacity().count_cars_in_category(&car.category).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    cars: SeaOrmCarRepository,
    customers: SeaOrmCustomerRepository,
    reservations: SeaOrmReservationRepository,
    rentals: SeaOrmRentalRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            cars: SeaOrmCarRepository::new(db.clone()),
            customers: SeaOrmCustomerRepository::new(db.clone()),
            reservations: SeaOrmReservationRepository::new(db.clone()),
            rentals: SeaOrmRentalRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn cars(&self) -> &dyn CarRepository {
        &self.cars
    }

    fn customers(&self) -> &dyn CustomerRepository {
        &self.customers
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }

    fn rentals(&self) -> &dyn RentalRepository {
        &self.rentals
    }

    fn capacity(&self) -> &dyn CapacitySource {
        &self.cars
    }

    fn overlaps(&self) -> &dyn OverlapSource {
        &self.reservations
    }
}
