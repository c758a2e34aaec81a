//! In-memory repositories for development and testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::car::CarRepository;
use crate::domain::customer::CustomerRepository;
use crate::domain::rental::RentalRepository;
use crate::domain::reservation::{
    CapacitySource, OverlapSource, ReservationRepository, ReservationStatus,
};
use crate::domain::{Car, CarCategory, Customer, Rental, RentalPeriod, RepositoryProvider, Reservation};
use crate::shared::errors::{InfraError, StoreResult};

fn missing(entity: &str, id: Uuid) -> InfraError {
    InfraError::Corrupted(format!("{entity} {id} does not exist"))
}

fn duplicate(entity: &str, id: Uuid) -> InfraError {
    InfraError::Corrupted(format!("{entity} {id} already exists"))
}

#[derive(Default)]
pub struct InMemoryCarRepository {
    cars: DashMap<Uuid, Car>,
}

#[async_trait]
impl CarRepository for InMemoryCarRepository {
    async fn add(&self, car: Car) -> StoreResult<()> {
        if self.cars.contains_key(&car.id) {
            return Err(duplicate("car", car.id));
        }
        self.cars.insert(car.id, car);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Car>> {
        Ok(self.cars.get(&id).map(|c| c.clone()))
    }

    async fn find_by_plate(&self, plate: &str) -> StoreResult<Option<Car>> {
        Ok(self
            .cars
            .iter()
            .find(|c| c.plate == plate)
            .map(|c| c.value().clone()))
    }

    async fn find_all(&self) -> StoreResult<Vec<Car>> {
        let mut cars: Vec<Car> = self.cars.iter().map(|c| c.value().clone()).collect();
        cars.sort_by(|a, b| a.plate.cmp(&b.plate));
        Ok(cars)
    }
}

#[async_trait]
impl CapacitySource for InMemoryCarRepository {
    async fn count_cars_in_category(&self, category: &CarCategory) -> StoreResult<u64> {
        Ok(self.cars.iter().filter(|c| c.is_in_category(category)).count() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: DashMap<Uuid, Customer>,
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn add(&self, customer: Customer) -> StoreResult<()> {
        if self.customers.contains_key(&customer.id) {
            return Err(duplicate("customer", customer.id));
        }
        self.customers.insert(customer.id, customer);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Customer>> {
        Ok(self.customers.get(&id).map(|c| c.clone()))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Customer>> {
        Ok(self
            .customers
            .iter()
            .find(|c| c.email == email)
            .map(|c| c.value().clone()))
    }
}

#[derive(Default)]
pub struct InMemoryReservationRepository {
    reservations: DashMap<Uuid, Reservation>,
}

impl InMemoryReservationRepository {
    fn collect_newest_first(&self, keep: impl Fn(&Reservation) -> bool) -> Vec<Reservation> {
        let mut found: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|r| keep(r.value()))
            .map(|r| r.value().clone())
            .collect();
        found.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        found
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn add(&self, reservation: Reservation) -> StoreResult<()> {
        if self.reservations.contains_key(&reservation.id()) {
            return Err(duplicate("reservation", reservation.id()));
        }
        self.reservations.insert(reservation.id(), reservation);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Reservation>> {
        Ok(self.reservations.get(&id).map(|r| r.clone()))
    }

    async fn update(&self, reservation: Reservation) -> StoreResult<()> {
        match self.reservations.get_mut(&reservation.id()) {
            Some(mut slot) => {
                *slot = reservation;
                Ok(())
            }
            None => Err(missing("reservation", reservation.id())),
        }
    }

    async fn find_all(&self) -> StoreResult<Vec<Reservation>> {
        Ok(self.collect_newest_first(|_| true))
    }

    async fn find_by_customer(&self, customer_id: Uuid) -> StoreResult<Vec<Reservation>> {
        Ok(self.collect_newest_first(|r| r.customer_id() == customer_id))
    }

    async fn find_expiry_candidates(
        &self,
        created_cutoff: DateTime<Utc>,
        start_cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<Reservation>> {
        Ok(self.collect_newest_first(|r| {
            r.is_draft() && (r.created_at() <= created_cutoff || r.period().start() <= start_cutoff)
        }))
    }
}

#[async_trait]
impl OverlapSource for InMemoryReservationRepository {
    async fn count_confirmed_overlapping(
        &self,
        category: &CarCategory,
        period: &RentalPeriod,
        exclude: Option<Uuid>,
    ) -> StoreResult<u64> {
        let count = self
            .reservations
            .iter()
            .filter(|r| Some(r.id()) != exclude)
            .filter(|r| matches!(r.status(), ReservationStatus::Confirmed { .. }))
            .filter(|r| r.category() == category && r.period().overlaps(period))
            .count();
        Ok(count as u64)
    }
}

#[derive(Default)]
pub struct InMemoryRentalRepository {
    rentals: DashMap<Uuid, Rental>,
}

#[async_trait]
impl RentalRepository for InMemoryRentalRepository {
    async fn add(&self, rental: Rental) -> StoreResult<()> {
        if self.rentals.contains_key(&rental.id) {
            return Err(duplicate("rental", rental.id));
        }
        if self
            .rentals
            .iter()
            .any(|r| r.reservation_id == rental.reservation_id)
        {
            return Err(InfraError::Corrupted(format!(
                "reservation {} already has a rental",
                rental.reservation_id
            )));
        }
        self.rentals.insert(rental.id, rental);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Rental>> {
        Ok(self.rentals.get(&id).map(|r| r.clone()))
    }

    async fn find_by_reservation(&self, reservation_id: Uuid) -> StoreResult<Option<Rental>> {
        Ok(self
            .rentals
            .iter()
            .find(|r| r.reservation_id == reservation_id)
            .map(|r| r.value().clone()))
    }

    async fn find_active_by_car(&self, car_id: Uuid) -> StoreResult<Option<Rental>> {
        Ok(self
            .rentals
            .iter()
            .find(|r| r.car_id == car_id && r.returned.is_none())
            .map(|r| r.value().clone()))
    }

    async fn update(&self, rental: Rental) -> StoreResult<()> {
        match self.rentals.get_mut(&rental.id) {
            Some(mut slot) => {
                *slot = rental;
                Ok(())
            }
            None => Err(missing("rental", rental.id)),
        }
    }

    async fn remove(&self, id: Uuid) -> StoreResult<()> {
        self.rentals.remove(&id);
        Ok(())
    }
}

/// DashMap-backed [`RepositoryProvider`]. Nothing survives the process.
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    cars: InMemoryCarRepository,
    customers: InMemoryCustomerRepository,
    reservations: InMemoryReservationRepository,
    rentals: InMemoryRentalRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
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
