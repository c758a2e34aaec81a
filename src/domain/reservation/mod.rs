//! Reservation aggregate
//!
//! Contains the Reservation entity, its state machine, the capacity
//! conflict policy and the repository interface.

pub mod conflict;
pub mod model;
pub mod repository;

pub use conflict::{CapacitySource, OverlapSource, ReservationConflict, ReservationConflictPolicy};
pub use model::{Reservation, ReservationStatus};
pub use repository::ReservationRepository;
