//! Ledger engine - outstanding balances over the append-only payment log.
//!
//! Every balance is a prefix sum over the payment rows of one
//! `(floor, tenant)` pair, ordered by `created_at` (ties broken by id).
//! Nothing is cached: each query re-walks the rows, which keeps
//! out-of-order correction entries cheap at the cost of O(n) per read.
//! Negative outstanding amounts mean over-payment and are preserved,
//! never clamped.

use crate::{
    core::directory,
    entities::{Floor, Payment, floor, payment},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};

/// Outstanding rent and electricity dues for one floor and tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Balance {
    /// Σ(rent − received_money) over the ledger so far
    pub rent_due: i64,
    /// Σ(electricity_bill − paid_bill) over the ledger so far
    pub electricity_due: i64,
}

/// One row of the payment history as presented to a reader.
///
/// `rent` and `electricity_bill` carry the cumulative balance strictly
/// before this row; `due_rent` and `due_electricity_bill` carry it through
/// this row inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Backing ledger row id
    pub id: i64,
    /// Rent newly billed by this row
    pub new_added_rent: i64,
    /// Outstanding rent before this row
    pub rent: i64,
    /// Amount paid against rent in this row
    pub received_money: i64,
    /// Outstanding rent through this row
    pub due_rent: i64,
    /// Whether this row settled its own billing in full
    pub full_payment: bool,
    /// Ledger ordering key
    pub created_at: sea_orm::prelude::DateTimeUtc,
    /// Electricity newly billed by this row, if any
    pub new_added_electricity_bill: Option<i64>,
    /// Electricity paid by this row, if any
    pub paid_electricity_bill: Option<i64>,
    /// Outstanding electricity before this row
    pub electricity_bill: i64,
    /// Outstanding electricity through this row
    pub due_electricity_bill: i64,
}

/// Page navigation metadata for the history listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page presented
    pub current_page: u64,
    /// Total number of pages at this page size
    pub total_pages: u64,
    /// Total ledger rows for the floor and tenant
    pub total_count: u64,
    /// Rows per page
    pub per_page: u64,
    /// Whether a later page exists
    pub has_next_page: bool,
    /// Whether an earlier page exists
    pub has_prev_page: bool,
}

/// One page of payment history, newest row first.
#[derive(Debug, Clone)]
pub struct HistoryPage {
    /// The rows of this page
    pub entries: Vec<HistoryEntry>,
    /// Navigation metadata
    pub pagination: Pagination,
}

/// Computes the outstanding balance for a floor's current tenant.
///
/// A missing floor is an error; a vacant floor reports a zero balance
/// without touching the ledger.
pub async fn outstanding_balance(db: &DatabaseConnection, floor_id: i64) -> Result<Balance> {
    let floor_row = Floor::find_by_id(floor_id)
        .one(db)
        .await?
        .ok_or(Error::FloorNotFound { id: floor_id })?;

    let Some(tenant_id) = floor_row.tenant else {
        return Ok(Balance::default());
    };

    let rows = ledger_rows(db, floor_id, tenant_id).await?;
    let mut balance = Balance::default();
    for row in &rows {
        balance.rent_due += row.rent - row.received_money;
        balance.electricity_due += row.electricity_bill.unwrap_or(0) - row.paid_bill.unwrap_or(0);
    }
    Ok(balance)
}

/// Builds one page of payment history for a floor's current tenant,
/// newest row first, with running balances recomputed from scratch.
///
/// `page` is 1-based (0 is treated as 1); `per_page` is clamped to 1..=100.
/// A vacant floor yields an empty page rather than an error.
pub async fn payment_history(
    db: &DatabaseConnection,
    floor_id: i64,
    page: u64,
    per_page: u64,
) -> Result<HistoryPage> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);

    let floor_row = Floor::find_by_id(floor_id)
        .one(db)
        .await?
        .ok_or(Error::FloorNotFound { id: floor_id })?;

    let Some(tenant_id) = floor_row.tenant else {
        return Ok(HistoryPage {
            entries: Vec::new(),
            pagination: Pagination {
                current_page: page,
                total_pages: 0,
                total_count: 0,
                per_page,
                has_next_page: false,
                has_prev_page: page > 1,
            },
        });
    };

    let rows = ledger_rows(db, floor_id, tenant_id).await?;

    // Prefix sums in ledger order, then presented newest first.
    let mut entries = Vec::with_capacity(rows.len());
    let mut rent_running = 0;
    let mut electricity_running = 0;
    for row in rows {
        let rent_before = rent_running;
        let electricity_before = electricity_running;
        rent_running += row.rent - row.received_money;
        electricity_running += row.electricity_bill.unwrap_or(0) - row.paid_bill.unwrap_or(0);
        entries.push(HistoryEntry {
            id: row.id,
            new_added_rent: row.rent,
            rent: rent_before,
            received_money: row.received_money,
            due_rent: rent_running,
            full_payment: row.full_payment,
            created_at: row.created_at,
            new_added_electricity_bill: row.electricity_bill,
            paid_electricity_bill: row.paid_bill,
            electricity_bill: electricity_before,
            due_electricity_bill: electricity_running,
        });
    }
    entries.reverse();

    let total_count = entries.len() as u64;
    let total_pages = total_count.div_ceil(per_page);
    let offset = usize::try_from((page - 1) * per_page).unwrap_or(usize::MAX);
    let page_entries: Vec<HistoryEntry> = entries
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .collect();

    Ok(HistoryPage {
        entries: page_entries,
        pagination: Pagination {
            current_page: page,
            total_pages,
            total_count,
            per_page,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        },
    })
}

/// Appends a manager-authored billing entry to a floor's ledger.
///
/// The floor must belong to the property and have a tenant. Negative
/// amounts are legal: corrections are made with offsetting entries, never
/// by editing existing rows. `full_payment` is derived from whether the
/// entry settles exactly what it bills.
pub async fn create_payment(
    db: &DatabaseConnection,
    manager_id: i64,
    property_id: i64,
    floor_id: i64,
    rent: i64,
    received_money: i64,
    electricity_bill: Option<i64>,
) -> Result<payment::Model> {
    if !directory::is_manager(db, manager_id, property_id).await? {
        return Err(Error::NotManager {
            user_id: manager_id,
            property_id,
        });
    }

    let floor_row = Floor::find()
        .filter(floor::Column::Id.eq(floor_id))
        .filter(floor::Column::Pid.eq(property_id))
        .one(db)
        .await?
        .ok_or(Error::FloorNotFound { id: floor_id })?;

    let tenant_id = floor_row.tenant.ok_or(Error::FloorVacant { floor_id })?;

    let entry = payment::ActiveModel {
        fid: Set(floor_id),
        uid: Set(tenant_id),
        rent: Set(rent),
        received_money: Set(received_money),
        electricity_bill: Set(electricity_bill),
        paid_bill: Set(None),
        full_payment: Set(received_money - rent == 0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(entry)
}

/// Appends the ledger entry produced by accepting a rent-payment claim:
/// nothing newly billed, the claimed amount credited, and any claimed
/// electricity figure credited against the electricity balance.
pub async fn record_claim_payment<C>(
    db: &C,
    floor_id: i64,
    tenant_id: i64,
    amount: i64,
    paid_electricity: Option<i64>,
) -> Result<payment::Model>
where
    C: ConnectionTrait,
{
    let entry = payment::ActiveModel {
        fid: Set(floor_id),
        uid: Set(tenant_id),
        rent: Set(0),
        received_money: Set(amount),
        electricity_bill: Set(Some(0)),
        paid_bill: Set(paid_electricity),
        full_payment: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(entry)
}

/// All ledger rows for one `(floor, tenant)` pair in ledger order.
async fn ledger_rows(
    db: &DatabaseConnection,
    floor_id: i64,
    tenant_id: i64,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::Fid.eq(floor_id))
        .filter(payment::Column::Uid.eq(tenant_id))
        .order_by_asc(payment::Column::CreatedAt)
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
