//! Database entities module

pub mod car;
pub mod customer;
pub mod rental;
pub mod reservation;

pub use car::Entity as Car;
pub use customer::Entity as Customer;
pub use rental::Entity as Rental;
pub use reservation::Entity as Reservation;
