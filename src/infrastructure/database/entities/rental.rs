//! Rental entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fuel gauge position as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum FuelGauge {
    #[sea_orm(string_value = "Empty")]
    Empty,
    #[sea_orm(string_value = "Quarter")]
    Quarter,
    #[sea_orm(string_value = "Half")]
    Half,
    #[sea_orm(string_value = "ThreeQuarters")]
    ThreeQuarters,
    #[sea_orm(string_value = "Full")]
    Full,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rentals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub reservation_id: Uuid,

    pub customer_id: Uuid,
    pub car_id: Uuid,

    pub km_out: i64,
    pub fuel_out: FuelGauge,
    pub picked_up_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub km_in: Option<i64>,

    #[sea_orm(nullable)]
    pub fuel_in: Option<FuelGauge>,

    #[sea_orm(nullable)]
    pub returned_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reservation::Entity",
        from = "Column::ReservationId",
        to = "super::reservation::Column::Id"
    )]
    Reservation,
    #[sea_orm(
        belongs_to = "super::car::Entity",
        from = "Column::CarId",
        to = "super::car::Column::Id"
    )]
    Car,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservation.def()
    }
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Car.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
