//! Create rentals table

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_cars::Cars;
use super::m20250301_000003_create_reservations::Reservations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rentals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rentals::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Rentals::ReservationId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Rentals::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Rentals::CarId).uuid().not_null())
                    .col(ColumnDef::new(Rentals::KmOut).big_integer().not_null())
                    .col(ColumnDef::new(Rentals::FuelOut).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Rentals::PickedUpAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rentals::KmIn).big_integer())
                    .col(ColumnDef::new(Rentals::FuelIn).string_len(16))
                    .col(ColumnDef::new(Rentals::ReturnedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rentals_reservation")
                            .from(Rentals::Table, Rentals::ReservationId)
                            .to(Reservations::Table, Reservations::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rentals_car")
                            .from(Rentals::Table, Rentals::CarId)
                            .to(Cars::Table, Cars::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rentals_car")
                    .table(Rentals::Table)
                    .col(Rentals::CarId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rentals::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Rentals {
    Table,
    Id,
    ReservationId,
    CustomerId,
    CarId,
    KmOut,
    FuelOut,
    PickedUpAt,
    KmIn,
    FuelIn,
    ReturnedAt,
}
