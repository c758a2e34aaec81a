//! SeaORM implementation of CustomerRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::debug;
use uuid::Uuid;

use crate::domain::customer::{Customer, CustomerRepository};
use crate::infrastructure::database::entities::customer;
use crate::shared::errors::StoreResult;

pub struct SeaOrmCustomerRepository {
    db: DatabaseConnection,
}

impl SeaOrmCustomerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: customer::Model) -> Customer {
    Customer {
        id: m.id,
        full_name: m.full_name,
        email: m.email,
        created_at: m.created_at,
    }
}

#[async_trait]
impl CustomerRepository for SeaOrmCustomerRepository {
    async fn add(&self, c: Customer) -> StoreResult<()> {
        debug!("Saving customer: {}", c.id);

        let model = customer::ActiveModel {
            id: Set(c.id),
            full_name: Set(c.full_name),
            email: Set(c.email),
            created_at: Set(c.created_at),
        };
        model.insert(&self.db).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Customer>> {
        let model = customer::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Customer>> {
        let model = customer::Entity::find()
            .filter(customer::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }
}
