//! Notification entity - The single mutable record of a cross-actor request.
//!
//! One row represents a pending or resolved request between two users over
//! a (property, floor) pair. The `kind` column is the first-class type tag
//! assigned at creation; `message` keeps the textual wire convention
//! (`"Payment amount: 500 tk"`, ...) that external consumers still parse.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    /// Unique identifier for the notification
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property the request is scoped to
    pub pid: i64,
    /// Floor the request is scoped to
    pub fid: i64,
    /// User who created the request
    pub sender: i64,
    /// User the request is addressed to
    pub receiver: i64,
    /// Human-readable message, wire-format compatible
    pub message: String,
    /// Type tag: `"tenant_request"`, `"rent_claim"`, `"advance_offer"` or `"generic"`
    pub kind: String,
    /// Lifecycle status: `"pending"`, `"accepted"`, `"rejected"`, `"comment"` or `""`
    pub status: String,
    /// Follow-up comment attached after resolution, None until one is made
    pub comment: Option<String>,
    /// Whether the receiver has seen the notification
    pub is_read: bool,
    /// When the notification was created
    pub created_at: DateTimeUtc,
    /// When the notification was last touched
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Notification and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each notification is scoped to one property
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::Pid",
        to = "super::property::Column::Id"
    )]
    Property,
    /// Each notification is scoped to one floor
    #[sea_orm(
        belongs_to = "super::floor::Entity",
        from = "Column::Fid",
        to = "super::floor::Column::Id"
    )]
    Floor,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl Related<super::floor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Floor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
