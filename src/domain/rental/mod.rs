//! Rental aggregate
//!
//! A rental starts at pickup of a confirmed reservation and completes at return.

pub mod model;
pub mod readings;
pub mod repository;

pub use model::{Handover, Rental, RentalStatus};
pub use readings::{FuelLevel, Odometer};
pub use repository::RentalRepository;
