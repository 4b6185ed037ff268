//! Property entity - A building owned or administered by one or more managers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Property database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "property")]
pub struct Model {
    /// Unique identifier for the property
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g. "Green Villa")
    pub name: String,
    /// Street address
    pub address: String,
    /// Optional photo reference
    pub photo: Option<String>,
    /// When the property was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Property and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One property contains many floors
    #[sea_orm(has_many = "super::floor::Entity")]
    Floors,
    /// Managers are linked through the care-of relation
    #[sea_orm(has_many = "super::care_of::Entity")]
    CareOf,
    /// Notifications are scoped to a property
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::floor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Floors.def()
    }
}

impl Related<super::care_of::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CareOf.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
