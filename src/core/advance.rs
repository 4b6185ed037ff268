//! Advance payments - pre-payment offers outside the rent-claim flow.
//!
//! A manager offers an advance to a user for a floor; the offer sits in
//! the `advance` table as `pending` until the matching notification is
//! accepted or rejected, which moves the row to its terminal status
//! without ever touching the payment ledger.

use crate::{
    core::{
        directory, message,
        notify::{self, Status},
    },
    dispatch::Dispatcher,
    entities::{Advance, Floor, User, advance, floor},
    errors::{Error, Result},
};
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::warn;

/// An advance row with its payee's display name, for floor detail views.
#[derive(Debug, Clone)]
pub struct AdvanceDetail {
    /// The advance row itself
    pub advance: advance::Model,
    /// Display name of the user the advance was offered to
    pub payee_name: String,
}

/// Creates a pending advance offer and notifies the payee.
///
/// At most one pending advance may exist per floor. The advance row is
/// the business mutation; a failure to create the companion notification
/// is logged and does not undo the offer.
pub async fn create_offer<D>(
    db: &DatabaseConnection,
    dispatcher: &D,
    manager_id: i64,
    property_id: i64,
    floor_id: i64,
    payee_id: i64,
    money: i64,
) -> Result<advance::Model>
where
    D: Dispatcher,
{
    if money <= 0 {
        return Err(Error::InvalidAmount { amount: money });
    }
    if !directory::is_manager(db, manager_id, property_id).await? {
        return Err(Error::NotManager {
            user_id: manager_id,
            property_id,
        });
    }

    let floor_exists = Floor::find()
        .filter(floor::Column::Id.eq(floor_id))
        .filter(floor::Column::Pid.eq(property_id))
        .count(db)
        .await?
        > 0;
    if !floor_exists {
        return Err(Error::FloorNotFound { id: floor_id });
    }

    let payee_exists = User::find_by_id(payee_id).one(db).await?.is_some();
    if !payee_exists {
        return Err(Error::UserNotFound { id: payee_id });
    }

    if has_pending(db, floor_id).await? {
        return Err(Error::PendingAdvanceExists { floor_id });
    }

    let offer = advance::ActiveModel {
        fid: Set(floor_id),
        advance_uid: Set(payee_id),
        money: Set(money),
        status: Set(Status::Pending.as_str().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let text = message::format_advance_offer(money);
    if let Err(error) = notify::send(
        db,
        dispatcher,
        manager_id,
        payee_id,
        property_id,
        floor_id,
        text,
        Status::Pending,
        None,
    )
    .await
    {
        warn!(
            advance = offer.id,
            floor = floor_id,
            %error,
            "advance offer stored but its notification failed"
        );
    }

    Ok(offer)
}

/// Moves the floor's pending advance rows to a terminal status. Called by
/// the notification state machine inside its accept/reject transaction.
pub async fn resolve_pending<C>(db: &C, floor_id: i64, status: Status) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Advance::update_many()
        .col_expr(
            advance::Column::Status,
            Expr::value(status.as_str().to_string()),
        )
        .filter(advance::Column::Fid.eq(floor_id))
        .filter(advance::Column::Status.eq(Status::Pending.as_str()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Withdraws the floor's pending advance offer. Manager-only.
pub async fn cancel_pending(
    db: &DatabaseConnection,
    manager_id: i64,
    floor_id: i64,
) -> Result<()> {
    let floor_row = Floor::find_by_id(floor_id)
        .one(db)
        .await?
        .ok_or(Error::FloorNotFound { id: floor_id })?;

    if !directory::is_manager(db, manager_id, floor_row.pid).await? {
        return Err(Error::NotManager {
            user_id: manager_id,
            property_id: floor_row.pid,
        });
    }

    let result = Advance::delete_many()
        .filter(advance::Column::Fid.eq(floor_id))
        .filter(advance::Column::Status.eq(Status::Pending.as_str()))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::AdvanceNotFound { floor_id });
    }
    Ok(())
}

/// Whether the floor has a pending advance offer.
pub async fn has_pending<C>(db: &C, floor_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = Advance::find()
        .filter(advance::Column::Fid.eq(floor_id))
        .filter(advance::Column::Status.eq(Status::Pending.as_str()))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// All advance rows for a floor with a positive amount, newest first.
pub async fn advances_for_floor(
    db: &DatabaseConnection,
    floor_id: i64,
) -> Result<Vec<AdvanceDetail>> {
    let rows = Advance::find()
        .filter(advance::Column::Fid.eq(floor_id))
        .filter(advance::Column::Money.gt(0))
        .order_by_desc(advance::Column::CreatedAt)
        .all(db)
        .await?;

    let mut details = Vec::with_capacity(rows.len());
    for row in rows {
        let payee_name = directory::user_display_name(db, row.advance_uid).await?;
        details.push(AdvanceDetail {
            advance: row,
            payee_name,
        });
    }
    Ok(details)
}
