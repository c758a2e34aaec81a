//! Customer repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::Customer;
use crate::shared::errors::StoreResult;

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn add(&self, customer: Customer) -> StoreResult<()>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Customer>>;

    /// Lookup by normalized (lowercase) email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Customer>>;
}
