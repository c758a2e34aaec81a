//! Domain layer: value objects, aggregates and repository ports.

pub mod car;
pub mod customer;
pub mod period;
pub mod rental;
pub mod repositories;
pub mod reservation;

// Re-export commonly used types
pub use car::{Car, CarCategory};
pub use customer::Customer;
pub use period::RentalPeriod;
pub use rental::{FuelLevel, Handover, Odometer, Rental, RentalStatus};
pub use repositories::RepositoryProvider;
pub use reservation::{
    Reservation, ReservationConflict, ReservationConflictPolicy, ReservationStatus,
};

pub use crate::shared::errors::{DomainError, DomainResult};
