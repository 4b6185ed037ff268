//! User entity - Managers and tenants alike are plain users.
//!
//! Whether someone acts as a manager or a tenant is not a property of the
//! user row; it is derived from the `care_of` relation and from floor
//! occupancy.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Phone number, the handle by which users look each other up
    #[sea_orm(unique)]
    pub phone_number: String,
    /// Device token for push delivery, None until the device registers one
    pub fcm_token: Option<String>,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user manages properties through the care-of relation
    #[sea_orm(has_many = "super::care_of::Entity")]
    CareOf,
}

impl Related<super::care_of::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CareOf.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
