//! Reservation entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Persisted reservation state. The timestamps that belong to each state
/// live in the nullable columns of [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ReservationState {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Confirmed")]
    Confirmed,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
    #[sea_orm(string_value = "Expired")]
    Expired,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub customer_id: Uuid,
    pub category: String,

    /// Half-open period `[start_at, end_at)`
    pub start_at: DateTimeUtc,
    pub end_at: DateTimeUtc,

    pub status: ReservationState,
    pub created_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub confirmed_at: Option<DateTimeUtc>,

    #[sea_orm(nullable)]
    pub cancelled_at: Option<DateTimeUtc>,

    #[sea_orm(nullable)]
    pub expired_at: Option<DateTimeUtc>,

    /// Set at pickup
    #[sea_orm(nullable)]
    pub rental_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
