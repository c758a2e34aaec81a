//! Car domain entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::shared::errors::{DomainError, DomainResult};

/// Fleet classification (economy, suv, ...). Stored trimmed and lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CarCategory(String);

impl CarCategory {
    pub fn new(name: impl AsRef<str>) -> DomainResult<Self> {
        let normalized = name.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(DomainError::InvalidCar("category must not be empty".into()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CarCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A car in the rental fleet
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub id: Uuid,
    /// Licence plate, unique across the fleet
    pub plate: String,
    pub category: CarCategory,
    pub created_at: DateTime<Utc>,
}

impl Car {
    pub fn new(plate: &str, category: CarCategory) -> DomainResult<Self> {
        let plate = plate.trim().to_uppercase();
        if plate.is_empty() {
            return Err(DomainError::InvalidCar("plate must not be empty".into()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            plate,
            category,
            created_at: Utc::now(),
        })
    }

    pub fn is_in_category(&self, category: &CarCategory) -> bool {
        &self.category == category
    }
}
