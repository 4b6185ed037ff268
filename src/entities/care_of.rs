//! Care-of entity - The many-to-many link between managers and properties.
//!
//! A row here is what makes a user a manager of a property; every
//! authorization guard in the core reduces to an existence check against
//! this table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Care-of database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "care_of")]
pub struct Model {
    /// Unique identifier for the link row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Managing user
    pub uid: i64,
    /// Managed property
    pub pid: i64,
}

/// Defines relationships between the care-of link and its endpoints
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The managing user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::Uid",
        to = "super::user::Column::Id"
    )]
    User,
    /// The managed property
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::Pid",
        to = "super::property::Column::Id"
    )]
    Property,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
