//! Advance entity - A pre-payment offer from a manager to a user.
//!
//! Independent of the rent-claim flow. At most one row per floor may be in
//! the `pending` status at creation time; the check lives in the core, not
//! in a database constraint.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Advance payment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "advance")]
pub struct Model {
    /// Unique identifier for the advance offer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Floor the advance is tied to
    pub fid: i64,
    /// User the advance is offered to
    pub advance_uid: i64,
    /// Offered amount in whole currency units
    pub money: i64,
    /// Lifecycle status: `"pending"`, `"accepted"` or `"rejected"`
    pub status: String,
    /// When the offer was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Advance and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each advance belongs to one floor
    #[sea_orm(
        belongs_to = "super::floor::Entity",
        from = "Column::Fid",
        to = "super::floor::Column::Id"
    )]
    Floor,
}

impl Related<super::floor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Floor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
