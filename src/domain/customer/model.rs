//! Customer domain entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered customer who can hold reservations and rentals
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub full_name: String,
    /// Unique, stored lowercase
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Input is expected to be validated by the caller.
    pub fn new(full_name: &str, email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.trim().to_string(),
            email: email.trim().to_lowercase(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_customer_normalizes_email() {
        let c = Customer::new(" Ada Lovelace ", " Ada@Example.COM ");
        assert_eq!(c.full_name, "Ada Lovelace");
        assert_eq!(c.email, "ada@example.com");
    }
}
