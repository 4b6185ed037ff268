//! Payment entity - The append-only rent/electricity ledger.
//!
//! Rows are never updated or deleted; corrections are made by inserting
//! offsetting entries. Outstanding balances are prefix sums over the rows
//! of one `(fid, uid)` pair ordered by `created_at` (ties broken by id),
//! so `created_at` is the ordering key the ledger depends on.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment")]
pub struct Model {
    /// Unique identifier for the ledger entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Floor the entry is scoped to
    pub fid: i64,
    /// Tenant the entry is scoped to
    pub uid: i64,
    /// Rent newly billed in this entry
    pub rent: i64,
    /// Amount paid against rent in this entry
    pub received_money: i64,
    /// Electricity newly billed, None when the entry carries no bill
    pub electricity_bill: Option<i64>,
    /// Amount paid against electricity, None when nothing was paid
    pub paid_bill: Option<i64>,
    /// Whether the entry settled its own billing in full
    pub full_payment: bool,
    /// Ledger ordering key
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each ledger entry belongs to one floor
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
