//! # Car Rental Service
//!
//! Reservations and rentals for a fleet of cars grouped into categories.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Aggregates (car, customer, reservation, rental), the rental
//!   period value type, the capacity conflict policy and repository traits
//! - **application**: Use cases orchestrating the aggregates
//! - **infrastructure**: SeaORM/SQLite persistence and in-memory storage
//! - **shared**: Error taxonomy and shutdown signalling
//! - **server**: Runtime bootstrap used by the CLI

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError};

// Re-export database types for easy access
pub use infrastructure::{
    init_database, DatabaseConfig, InMemoryRepositoryProvider, SeaOrmRepositoryProvider,
};

pub use shared::errors::{AppError, AppResult, DomainError, ErrorKind, InfraError};
