//! Application services (use cases)

pub mod fleet;
pub mod rental;
pub mod reservation;
pub mod reservation_expiry;

pub use fleet::{FleetService, RegisterCar, RegisterCustomer};
pub use rental::{PickupRental, RentalService, ReturnRental};
pub use reservation::{CreateReservation, ReservationService, ReservationSettings};
pub use reservation_expiry::start_reservation_expiry_task;
