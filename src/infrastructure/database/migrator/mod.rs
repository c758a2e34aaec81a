//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_cars;
mod m20250301_000002_create_customers;
mod m20250301_000003_create_reservations;
mod m20250301_000004_create_rentals;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_cars::Migration),
            Box::new(m20250301_000002_create_customers::Migration),
            Box::new(m20250301_000003_create_reservations::Migration),
            Box::new(m20250301_000004_create_rentals::Migration),
        ]
    }
}
