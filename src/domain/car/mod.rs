//! Car aggregate
//!
//! Cars provide the per-category capacity that reservations are checked against.

pub mod model;
pub mod repository;

pub use model::{Car, CarCategory};
pub use repository::CarRepository;
