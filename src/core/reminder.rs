//! Monthly rent reminders
//!
//! A time-triggered sweep that sends every tenant a rent reminder once a
//! month, on or after the configured day. The `system_state` table records
//! when the last sweep ran so restarts within the same month do not repeat
//! it. Reminders are informational: they carry the blank status and offer
//! no accept/reject actions.

use crate::{
    config::policy::ReminderPolicy,
    core::{
        directory, message,
        notify::{self, Status},
    },
    dispatch::Dispatcher,
    entities::{Floor, Payment, Property, SystemState, floor, payment, system_state},
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, warn};

const LAST_SWEEP_KEY: &str = "last_reminder_sweep";

/// Outcome of one reminder sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    /// Reminders created and handed to the dispatcher
    pub sent: usize,
    /// Occupied floors skipped because of an error
    pub skipped: usize,
}

/// Runs the sweep if it is due, recording the run date afterwards.
/// Returns `None` when nothing was due.
pub async fn run_due_sweep<D>(
    db: &DatabaseConnection,
    dispatcher: &D,
    policy: &ReminderPolicy,
) -> Result<Option<SweepSummary>>
where
    D: Dispatcher,
{
    let today = Utc::now().date_naive();
    if !is_sweep_needed(db, policy, today).await? {
        return Ok(None);
    }
    let summary = sweep(db, dispatcher).await?;
    set_last_sweep_date(db, today).await?;
    Ok(Some(summary))
}

/// Whether a sweep should run on `today`: the configured day of the month
/// has been reached and no sweep has run this month yet.
pub async fn is_sweep_needed(
    db: &DatabaseConnection,
    policy: &ReminderPolicy,
    today: NaiveDate,
) -> Result<bool> {
    if today.day() < policy.day_of_month {
        return Ok(false);
    }
    let last = last_sweep_date(db).await?;
    Ok(last.is_none_or(|date| date.year() != today.year() || date.month() != today.month()))
}

/// Sends one reminder per occupied floor, unconditionally. Per-floor
/// failures are logged and counted, never aborting the rest of the sweep.
pub async fn sweep<D>(db: &DatabaseConnection, dispatcher: &D) -> Result<SweepSummary>
where
    D: Dispatcher,
{
    let occupied = Floor::find()
        .filter(floor::Column::Tenant.is_not_null())
        .all(db)
        .await?;

    let mut sent = 0;
    let mut skipped = 0;
    for floor_row in occupied {
        match remind_floor(db, dispatcher, &floor_row).await {
            Ok(()) => sent += 1,
            Err(error) => {
                warn!(floor = floor_row.id, %error, "skipping reminder for floor");
                skipped += 1;
            }
        }
    }

    info!(sent, skipped, "monthly reminder sweep finished");
    Ok(SweepSummary { sent, skipped })
}

async fn remind_floor<D>(
    db: &DatabaseConnection,
    dispatcher: &D,
    floor_row: &floor::Model,
) -> Result<()>
where
    D: Dispatcher,
{
    let tenant_id = floor_row.tenant.ok_or(Error::FloorVacant {
        floor_id: floor_row.id,
    })?;
    let property = Property::find_by_id(floor_row.pid)
        .one(db)
        .await?
        .ok_or(Error::PropertyNotFound { id: floor_row.pid })?;
    let manager_id = directory::first_manager(db, floor_row.pid)
        .await?
        .ok_or(Error::ManagerNotFound {
            property_id: floor_row.pid,
        })?;

    // The figure shown is the rent billed by the latest ledger row, zero
    // when the tenant has no history yet
    let latest_rent = Payment::find()
        .filter(payment::Column::Fid.eq(floor_row.id))
        .order_by_desc(payment::Column::CreatedAt)
        .order_by_desc(payment::Column::Id)
        .one(db)
        .await?
        .map_or(0, |p| p.rent);

    let text = message::format_reminder(&property.name, &floor_row.name, latest_rent);
    notify::send(
        db,
        dispatcher,
        manager_id,
        tenant_id,
        floor_row.pid,
        floor_row.id,
        text,
        Status::Empty,
        None,
    )
    .await?;
    Ok(())
}

/// The date of the last completed sweep, if one is recorded.
pub async fn last_sweep_date(db: &DatabaseConnection) -> Result<Option<NaiveDate>> {
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_SWEEP_KEY))
        .one(db)
        .await?;

    match state {
        Some(s) => NaiveDate::parse_from_str(&s.value, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| Error::Config {
                message: format!("Failed to parse last sweep date: {e}"),
            }),
        None => Ok(None),
    }
}

async fn set_last_sweep_date(db: &DatabaseConnection, date: NaiveDate) -> Result<()> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let now = Utc::now();

    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_SWEEP_KEY))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active: system_state::ActiveModel = state.into();
        active.value = Set(date_str);
        active.updated_at = Set(now);
        active.update(db).await?;
    } else {
        system_state::ActiveModel {
            key: Set(LAST_SWEEP_KEY.to_string()),
            value: Set(date_str),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}
