//! Floor entity - A leasable unit within a property.
//!
//! A floor carries its nominal monthly rent and at most one current tenant;
//! `tenant` is None while the floor is vacant. There is no intermediate
//! state: pending requests live in the notification table, never here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Floor database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "floor")]
pub struct Model {
    /// Unique identifier for the floor
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property this floor belongs to
    pub pid: i64,
    /// Display name (e.g. "2nd Floor", "Flat B")
    pub name: String,
    /// Nominal monthly rent in whole currency units
    pub rent: i64,
    /// Current tenant, None while vacant
    pub tenant: Option<i64>,
    /// When the floor was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Floor and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each floor belongs to one property
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::Pid",
        to = "super::property::Column::Id"
    )]
    Property,
    /// One floor accumulates many payment rows
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    /// One floor may have many advance-payment rows over time
    #[sea_orm(has_many = "super::advance::Entity")]
    Advances,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::advance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Advances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
