//! Rental use cases: pickup and return

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::ports::{ConfirmedReservation, ReservationFacade};
use crate::domain::{DomainError, FuelLevel, Handover, Odometer, Rental, RepositoryProvider};
use crate::shared::errors::{AppResult, InfraError};

/// Input of the Pickup use case. Readings arrive unvalidated.
#[derive(Debug, Clone)]
pub struct PickupRental {
    pub reservation_id: Uuid,
    pub customer_id: Uuid,
    pub car_id: Uuid,
    /// Fuel gauge ordinal, 0 (empty) to 4 (full)
    pub fuel_out: i32,
    pub km_out: i64,
    pub picked_up_at: DateTime<Utc>,
}

/// Input of the Return use case
#[derive(Debug, Clone)]
pub struct ReturnRental {
    pub rental_id: Uuid,
    pub fuel_in: i32,
    pub km_in: i64,
    pub returned_at: DateTime<Utc>,
}

pub struct RentalService {
    repos: Arc<dyn RepositoryProvider>,
    reservations: Arc<dyn ReservationFacade>,
}

impl RentalService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, reservations: Arc<dyn ReservationFacade>) -> Self {
        Self {
            repos,
            reservations,
        }
    }

    /// Hand a car over for a confirmed reservation.
    ///
    /// Calling it again for the same reservation returns the rental created
    /// the first time.
    pub async fn pickup(&self, cmd: PickupRental) -> AppResult<Rental> {
        let handover = Handover {
            km: Odometer::new(cmd.km_out)?,
            fuel: FuelLevel::from_ordinal(cmd.fuel_out)?,
            at: cmd.picked_up_at,
        };

        let reservation = self
            .reservations
            .find_confirmed_by_id(cmd.reservation_id)
            .await?
            .ok_or_else(|| {
                DomainError::InvalidReservation(format!(
                    "reservation {} does not exist or is not confirmed",
                    cmd.reservation_id
                ))
            })?;

        if reservation.customer_id != cmd.customer_id {
            return Err(DomainError::InvalidCustomer(format!(
                "customer {} does not hold reservation {}",
                cmd.customer_id, reservation.id
            ))
            .into());
        }

        if let Some(existing) = self.existing_rental(&reservation).await? {
            info!(
                reservation_id = %reservation.id,
                rental_id = %existing.id,
                "Pickup repeated, returning existing rental"
            );
            return Ok(existing);
        }

        let car = self
            .repos
            .cars()
            .find_by_id(cmd.car_id)
            .await?
            .ok_or_else(|| DomainError::InvalidCar(format!("car {} does not exist", cmd.car_id)))?;
        if !car.is_in_category(&reservation.category) {
            return Err(DomainError::InvalidCar(format!(
                "car {} is {}, reservation is for {}",
                car.plate, car.category, reservation.category
            ))
            .into());
        }
        if let Some(active) = self.repos.rentals().find_active_by_car(car.id).await? {
            return Err(DomainError::InvalidCar(format!(
                "car {} is still out on rental {}",
                car.plate, active.id
            ))
            .into());
        }

        let rental = Rental::pick_up(reservation.id, reservation.customer_id, car.id, handover);
        self.repos.rentals().add(rental.clone()).await?;
        if let Err(e) = self
            .reservations
            .mark_as_rented(reservation.id, rental.id)
            .await
        {
            warn!(
                reservation_id = %reservation.id,
                rental_id = %rental.id,
                error = %e,
                "Linking rental failed, discarding it"
            );
            self.repos.rentals().remove(rental.id).await?;
            return Err(e);
        }

        info!(
            rental_id = %rental.id,
            reservation_id = %reservation.id,
            car = %car.plate,
            km_out = %rental.pickup.km,
            fuel_out = %rental.pickup.fuel,
            "Car picked up"
        );
        Ok(rental)
    }

    /// Rental already created for this reservation, relinking it if an
    /// earlier pickup stored the rental but did not get to mark the reservation.
    async fn existing_rental(&self, reservation: &ConfirmedReservation) -> AppResult<Option<Rental>> {
        if let Some(rental_id) = reservation.rental_id {
            let rental = self.repos.rentals().find_by_id(rental_id).await?.ok_or_else(|| {
                InfraError::Corrupted(format!(
                    "reservation {} links missing rental {}",
                    reservation.id, rental_id
                ))
            })?;
            return Ok(Some(rental));
        }

        match self.repos.rentals().find_by_reservation(reservation.id).await? {
            Some(rental) => {
                warn!(
                    reservation_id = %reservation.id,
                    rental_id = %rental.id,
                    "Relinking rental to reservation"
                );
                self.reservations
                    .mark_as_rented(reservation.id, rental.id)
                    .await?;
                Ok(Some(rental))
            }
            None => Ok(None),
        }
    }

    /// Record the return of the car. Fails if the rental was already returned.
    pub async fn return_car(&self, cmd: ReturnRental) -> AppResult<Rental> {
        let handover = Handover {
            km: Odometer::new(cmd.km_in)?,
            fuel: FuelLevel::from_ordinal(cmd.fuel_in)?,
            at: cmd.returned_at,
        };

        let mut rental = self.get(cmd.rental_id).await?;
        if let Err(e) = rental.return_car(handover) {
            warn!(rental_id = %rental.id, error = %e, "Return rejected");
            return Err(e.into());
        }
        self.repos.rentals().update(rental.clone()).await?;

        info!(
            rental_id = %rental.id,
            km_driven = rental.km_driven().unwrap_or_default(),
            fuel_in = %handover.fuel,
            "Car returned"
        );
        Ok(rental)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Rental> {
        self.repos
            .rentals()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Rental", id).into())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::reservation::{
        CreateReservation, ReservationService, ReservationSettings,
    };
    use crate::domain::{Car, CarCategory, Customer, RentalStatus};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use crate::shared::errors::ErrorKind;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2099, 6, 1, hour, 0, 0).unwrap()
    }

    struct Fixture {
        repos: Arc<InMemoryRepositoryProvider>,
        reservations: Arc<ReservationService>,
        rentals: RentalService,
        customer: Uuid,
        economy_car: Uuid,
        suv_car: Uuid,
        reservation: Uuid,
    }

    async fn fixture() -> Fixture {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let economy = Car::new("ECO-1", CarCategory::new("economy").unwrap()).unwrap();
        let suv = Car::new("SUV-1", CarCategory::new("suv").unwrap()).unwrap();
        let (economy_car, suv_car) = (economy.id, suv.id);
        repos.cars().add(economy).await.unwrap();
        repos.cars().add(suv).await.unwrap();

        let customer = Customer::new("Alan Turing", "alan@example.com");
        let customer_id = customer.id;
        repos.customers().add(customer).await.unwrap();

        let reservations = Arc::new(ReservationService::new(
            repos.clone(),
            ReservationSettings::default(),
        ));
        let reservation = reservations
            .create(CreateReservation {
                customer_id,
                category: "economy".into(),
                start: at(9),
                end: at(18),
            })
            .await
            .unwrap();
        reservations.confirm(reservation.id()).await.unwrap();

        let rentals = RentalService::new(repos.clone(), reservations.clone());
        Fixture {
            repos,
            reservations,
            rentals,
            customer: customer_id,
            economy_car,
            suv_car,
            reservation: reservation.id(),
        }
    }

    impl Fixture {
        fn pickup_cmd(&self) -> PickupRental {
            PickupRental {
                reservation_id: self.reservation,
                customer_id: self.customer,
                car_id: self.economy_car,
                fuel_out: 4,
                km_out: 12_000,
                picked_up_at: at(9),
            }
        }

        fn return_cmd(&self, rental_id: Uuid, km_in: i64) -> ReturnRental {
            ReturnRental {
                rental_id,
                fuel_in: 2,
                km_in,
                returned_at: at(17),
            }
        }
    }

    #[tokio::test]
    async fn pickup_creates_rental_and_links_reservation() {
        let f = fixture().await;
        let rental = f.rentals.pickup(f.pickup_cmd()).await.unwrap();

        assert_eq!(rental.status(), RentalStatus::Active);
        assert_eq!(rental.pickup.fuel, FuelLevel::Full);
        assert_eq!(rental.pickup.km.km(), 12_000);

        let reservation = f.reservations.get(f.reservation).await.unwrap();
        assert_eq!(reservation.rental_id(), Some(rental.id));
        assert!(reservation.is_confirmed());
    }

    #[tokio::test]
    async fn second_pickup_returns_same_rental() {
        let f = fixture().await;
        let first = f.rentals.pickup(f.pickup_cmd()).await.unwrap();
        let second = f.rentals.pickup(f.pickup_cmd()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn repeated_pickup_by_other_customer_is_rejected() {
        let f = fixture().await;
        f.rentals.pickup(f.pickup_cmd()).await.unwrap();

        let mut cmd = f.pickup_cmd();
        cmd.customer_id = Uuid::new_v4();
        assert_eq!(
            f.rentals.pickup(cmd).await.unwrap_err().kind(),
            ErrorKind::InvalidCustomer
        );
    }

    /// Cancels the reservation right before linking it, as a concurrent
    /// cancel landing between lookup and link would.
    struct CancelBeforeLink(Arc<ReservationService>);

    #[async_trait::async_trait]
    impl ReservationFacade for CancelBeforeLink {
        async fn find_confirmed_by_id(&self, id: Uuid) -> AppResult<Option<ConfirmedReservation>> {
            self.0.find_confirmed_by_id(id).await
        }

        async fn mark_as_rented(&self, reservation_id: Uuid, rental_id: Uuid) -> AppResult<()> {
            self.0.cancel(reservation_id).await?;
            self.0.mark_as_rented(reservation_id, rental_id).await
        }
    }

    #[tokio::test]
    async fn failed_link_leaves_no_rental_behind() {
        let f = fixture().await;
        let rentals = RentalService::new(
            f.repos.clone(),
            Arc::new(CancelBeforeLink(f.reservations.clone())),
        );

        let err = rentals.pickup(f.pickup_cmd()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStatusTransition);

        assert!(f.repos.rentals().find_active_by_car(f.economy_car).await.unwrap().is_none());
        assert!(f
            .repos
            .rentals()
            .find_by_reservation(f.reservation)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn pickup_requires_confirmed_reservation() {
        let f = fixture().await;
        let draft = f
            .reservations
            .create(CreateReservation {
                customer_id: f.customer,
                category: "economy".into(),
                start: at(19),
                end: at(20),
            })
            .await
            .unwrap();

        let mut cmd = f.pickup_cmd();
        cmd.reservation_id = draft.id();
        let err = f.rentals.pickup(cmd.clone()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidReservation);

        cmd.reservation_id = Uuid::new_v4();
        let err = f.rentals.pickup(cmd).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidReservation);
    }

    #[tokio::test]
    async fn pickup_validates_readings() {
        let f = fixture().await;
        let mut cmd = f.pickup_cmd();
        cmd.fuel_out = 7;
        assert_eq!(
            f.rentals.pickup(cmd).await.unwrap_err().kind(),
            ErrorKind::InvalidFuelLevel
        );

        let mut cmd = f.pickup_cmd();
        cmd.km_out = -5;
        assert_eq!(
            f.rentals.pickup(cmd).await.unwrap_err().kind(),
            ErrorKind::InvalidKm
        );
        assert_eq!(f.reservations.get(f.reservation).await.unwrap().rental_id(), None);
    }

    #[tokio::test]
    async fn pickup_checks_car_and_customer() {
        let f = fixture().await;

        let mut cmd = f.pickup_cmd();
        cmd.car_id = f.suv_car;
        assert_eq!(f.rentals.pickup(cmd).await.unwrap_err().kind(), ErrorKind::InvalidCar);

        let mut cmd = f.pickup_cmd();
        cmd.car_id = Uuid::new_v4();
        assert_eq!(f.rentals.pickup(cmd).await.unwrap_err().kind(), ErrorKind::InvalidCar);

        let mut cmd = f.pickup_cmd();
        cmd.customer_id = Uuid::new_v4();
        assert_eq!(
            f.rentals.pickup(cmd).await.unwrap_err().kind(),
            ErrorKind::InvalidCustomer
        );
    }

    #[tokio::test]
    async fn return_completes_rental() {
        let f = fixture().await;
        let rental = f.rentals.pickup(f.pickup_cmd()).await.unwrap();

        let returned = f
            .rentals
            .return_car(f.return_cmd(rental.id, 12_340))
            .await
            .unwrap();
        assert_eq!(returned.status(), RentalStatus::Completed);
        assert_eq!(returned.returned.unwrap().at, at(17));
        assert_eq!(returned.km_driven(), Some(340));
        assert_eq!(f.rentals.get(rental.id).await.unwrap(), returned);
    }

    #[tokio::test]
    async fn return_below_pickup_km_fails() {
        let f = fixture().await;
        let rental = f.rentals.pickup(f.pickup_cmd()).await.unwrap();
        let err = f
            .rentals
            .return_car(f.return_cmd(rental.id, 11_999))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKm);
        assert_eq!(
            f.rentals.get(rental.id).await.unwrap().status(),
            RentalStatus::Active
        );
    }

    #[tokio::test]
    async fn second_return_fails() {
        let f = fixture().await;
        let rental = f.rentals.pickup(f.pickup_cmd()).await.unwrap();
        f.rentals
            .return_car(f.return_cmd(rental.id, 12_100))
            .await
            .unwrap();
        let err = f
            .rentals
            .return_car(f.return_cmd(rental.id, 12_200))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStatusTransition);
    }

    #[tokio::test]
    async fn return_unknown_rental_is_not_found() {
        let f = fixture().await;
        let err = f
            .rentals
            .return_car(f.return_cmd(Uuid::new_v4(), 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn car_out_on_rental_cannot_be_picked_up_again() {
        let f = fixture().await;
        f.rentals.pickup(f.pickup_cmd()).await.unwrap();

        // Second economy reservation for the same customer later in the day.
        let later = f
            .reservations
            .create(CreateReservation {
                customer_id: f.customer,
                category: "economy".into(),
                start: at(18),
                end: at(18) + Duration::hours(3),
            })
            .await
            .unwrap();
        f.reservations.confirm(later.id()).await.unwrap();

        let mut cmd = f.pickup_cmd();
        cmd.reservation_id = later.id();
        assert_eq!(f.rentals.pickup(cmd).await.unwrap_err().kind(), ErrorKind::InvalidCar);
    }
}
