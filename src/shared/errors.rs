//! Error taxonomy
//!
//! Aggregates fail with [`DomainError`], repositories with [`InfraError`],
//! use cases with [`AppError`] wrapping either.

use thiserror::Error;

use crate::domain::reservation::ReservationConflict;

/// Coarse error classification used by callers to map failures to their
/// own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidPeriod,
    InvalidStatusTransition,
    InvalidFuelLevel,
    InvalidKm,
    InvalidReservation,
    InvalidCar,
    InvalidCustomer,
    NotFound,
    Conflict,
    Infrastructure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidPeriod => "InvalidPeriod",
            Self::InvalidStatusTransition => "InvalidStatusTransition",
            Self::InvalidFuelLevel => "InvalidFuelLevel",
            Self::InvalidKm => "InvalidKm",
            Self::InvalidReservation => "InvalidReservation",
            Self::InvalidCar => "InvalidCar",
            Self::InvalidCustomer => "InvalidCustomer",
            Self::NotFound => "NotFound",
            Self::Conflict => "Conflict",
            Self::Infrastructure => "Infrastructure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expected business-rule violations. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid period: start {start} must be before end {end}")]
    InvalidPeriod {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    #[error("Cannot {operation} a {entity} in status {from}")]
    InvalidStatusTransition {
        entity: &'static str,
        from: &'static str,
        operation: &'static str,
    },

    #[error("Invalid fuel level: {0}")]
    InvalidFuelLevel(String),

    #[error("Invalid km: {0}")]
    InvalidKm(String),

    #[error("Invalid reservation: {0}")]
    InvalidReservation(String),

    #[error("Invalid car: {0}")]
    InvalidCar(String),

    #[error("Invalid customer: {0}")]
    InvalidCustomer(String),

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Reservation conflict: {0}")]
    Conflict(ReservationConflict),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPeriod { .. } => ErrorKind::InvalidPeriod,
            Self::InvalidStatusTransition { .. } => ErrorKind::InvalidStatusTransition,
            Self::InvalidFuelLevel(_) => ErrorKind::InvalidFuelLevel,
            Self::InvalidKm(_) => ErrorKind::InvalidKm,
            Self::InvalidReservation(_) => ErrorKind::InvalidReservation,
            Self::InvalidCar(_) => ErrorKind::InvalidCar,
            Self::InvalidCustomer(_) => ErrorKind::InvalidCustomer,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }
}

/// Storage failures. These abort the use case.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Corrupted record: {0}")]
    Corrupted(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(e) => e.kind(),
            Self::Infra(_) => ErrorKind::Infrastructure,
        }
    }

    /// Whether the failure came from infrastructure rather than a business rule.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Infra(_))
    }

    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            Self::Infra(_) => None,
        }
    }
}

/// Result type for aggregate operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type for repository operations
pub type StoreResult<T> = Result<T, InfraError>;

/// Result type for use cases
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_are_not_fatal() {
        let err: AppError = DomainError::InvalidKm("negative".into()).into();
        assert!(!err.is_fatal());
        assert_eq!(err.kind(), ErrorKind::InvalidKm);
    }

    #[test]
    fn infra_errors_are_fatal() {
        let err: AppError = InfraError::Corrupted("bad status".into()).into();
        assert!(err.is_fatal());
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
        assert!(err.as_domain().is_none());
    }

    #[test]
    fn status_transition_message() {
        let err = DomainError::InvalidStatusTransition {
            entity: "reservation",
            from: "Cancelled",
            operation: "cancel",
        };
        assert_eq!(err.to_string(), "Cannot cancel a reservation in status Cancelled");
    }

    #[test]
    fn not_found_message() {
        let err = DomainError::not_found("Rental", 42);
        assert_eq!(err.to_string(), "Not found: Rental with id=42");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
