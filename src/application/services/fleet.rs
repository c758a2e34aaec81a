//! Fleet and customer registration

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Car, CarCategory, Customer, DomainError, RepositoryProvider};
use crate::shared::errors::AppResult;

#[derive(Debug, Clone, Validate)]
pub struct RegisterCar {
    #[validate(length(min = 1, max = 20))]
    pub plate: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
}

#[derive(Debug, Clone, Validate)]
pub struct RegisterCustomer {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
}

/// Registers the cars that make up category capacity and the customers
/// that hold reservations.
pub struct FleetService {
    repos: Arc<dyn RepositoryProvider>,
}

impl FleetService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn register_car(&self, cmd: RegisterCar) -> AppResult<Car> {
        cmd.validate()
            .map_err(|e| DomainError::InvalidCar(e.to_string()))?;

        let car = Car::new(&cmd.plate, CarCategory::new(&cmd.category)?)?;
        if self.repos.cars().find_by_plate(&car.plate).await?.is_some() {
            return Err(
                DomainError::InvalidCar(format!("plate {} is already registered", car.plate)).into(),
            );
        }

        self.repos.cars().add(car.clone()).await?;
        info!(car_id = %car.id, plate = %car.plate, category = %car.category, "Car registered");
        Ok(car)
    }

    pub async fn register_customer(&self, cmd: RegisterCustomer) -> AppResult<Customer> {
        cmd.validate()
            .map_err(|e| DomainError::InvalidCustomer(e.to_string()))?;

        let customer = Customer::new(&cmd.full_name, &cmd.email);
        if self
            .repos
            .customers()
            .find_by_email(&customer.email)
            .await?
            .is_some()
        {
            return Err(DomainError::InvalidCustomer(format!(
                "email {} is already registered",
                customer.email
            ))
            .into());
        }

        self.repos.customers().add(customer.clone()).await?;
        info!(customer_id = %customer.id, "Customer registered");
        Ok(customer)
    }

    pub async fn get_car(&self, id: Uuid) -> AppResult<Car> {
        self.repos
            .cars()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Car", id).into())
    }

    pub async fn get_customer(&self, id: Uuid) -> AppResult<Customer> {
        self.repos
            .customers()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", id).into())
    }

    pub async fn list_cars(&self) -> AppResult<Vec<Car>> {
        Ok(self.repos.cars().find_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use crate::shared::errors::ErrorKind;

    fn service() -> FleetService {
        FleetService::new(Arc::new(InMemoryRepositoryProvider::new()))
    }

    fn car(plate: &str, category: &str) -> RegisterCar {
        RegisterCar {
            plate: plate.into(),
            category: category.into(),
        }
    }

    #[tokio::test]
    async fn register_and_fetch_car() {
        let fleet = service();
        let registered = fleet.register_car(car("b-42", "SUV")).await.unwrap();
        assert_eq!(registered.plate, "B-42");
        assert_eq!(registered.category.as_str(), "suv");
        assert_eq!(fleet.get_car(registered.id).await.unwrap(), registered);
    }

    #[tokio::test]
    async fn duplicate_plate_rejected() {
        let fleet = service();
        fleet.register_car(car("B-42", "suv")).await.unwrap();
        let err = fleet.register_car(car("b-42", "economy")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCar);
        assert_eq!(fleet.list_cars().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_plate_rejected() {
        let err = service().register_car(car("", "suv")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCar);
    }

    #[tokio::test]
    async fn register_customer_validates_email() {
        let fleet = service();
        let err = fleet
            .register_customer(RegisterCustomer {
                full_name: "Edsger".into(),
                email: "not-an-email".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCustomer);

        let customer = fleet
            .register_customer(RegisterCustomer {
                full_name: "Edsger Dijkstra".into(),
                email: "edsger@example.org".into(),
            })
            .await
            .unwrap();
        assert_eq!(fleet.get_customer(customer.id).await.unwrap(), customer);
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let fleet = service();
        let cmd = RegisterCustomer {
            full_name: "Barbara Liskov".into(),
            email: "barbara@example.org".into(),
        };
        fleet.register_customer(cmd.clone()).await.unwrap();
        let err = fleet
            .register_customer(RegisterCustomer {
                email: "Barbara@Example.org".into(),
                ..cmd
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCustomer);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let fleet = service();
        assert_eq!(
            fleet.get_car(Uuid::new_v4()).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            fleet.get_customer(Uuid::new_v4()).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
