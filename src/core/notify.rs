//! Notification state machine - request lifecycle between managers and tenants.
//!
//! A notification is created `pending` and is terminal once it leaves that
//! status: `pending -> accepted` or `pending -> rejected` via [`respond`],
//! or deletion by a participant via [`delete`]. Terminal rows may still
//! receive a comment annotation, which never reopens them but spawns a
//! fresh reply notification to the counterpart.
//!
//! Each accept/reject runs its status update and its kind-specific side
//! effect (floor assignment, ledger append, advance resolution) in one
//! database transaction; the auto-generated reply is created after the
//! commit and its failure is logged, never surfaced to the caller.

use crate::{
    core::{
        advance, directory, ledger,
        message::{self, MessageKind},
    },
    dispatch::{self, Dispatcher, PushMessage},
    entities::{Floor, Notification, Property, floor, notification},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, warn};

/// Lifecycle status of a notification (and of an advance row).
///
/// `Empty` is the blank status carried by non-actionable rows such as
/// monthly reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Awaiting an accept/reject decision
    Pending,
    /// Accepted; terminal
    Accepted,
    /// Rejected; terminal
    Rejected,
    /// A non-actionable comment reply
    Comment,
    /// No status; informational rows
    Empty,
}

impl Status {
    /// The value stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Comment => "comment",
            Self::Empty => "",
        }
    }

    /// Parses a stored status value; unknown values read as `Empty`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "accepted" => Self::Accepted,
            "rejected" => Self::Rejected,
            "comment" => Self::Comment,
            _ => Self::Empty,
        }
    }
}

/// A notification decorated with the names a reader wants next to it.
#[derive(Debug, Clone)]
pub struct NotificationView {
    /// The notification row itself
    pub notification: notification::Model,
    /// Name of the property the request is scoped to
    pub property_name: String,
    /// Name of the floor the request is scoped to
    pub floor_name: String,
    /// Display name of the sender
    pub sender_name: String,
    /// Display name of the receiver
    pub receiver_name: String,
    /// Whether accept/reject actions apply (status is still pending)
    pub show_actions: bool,
}

/// What a deletion changed beyond the row itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// True when the deleted row was a rent claim and no pending
    /// non-advance request remains on the floor afterwards
    pub floor_pending_cleared: bool,
}

/// Persists a notification row and attempts out-of-band delivery.
///
/// The row insert is the business mutation and its failure is an error;
/// push delivery is best-effort and a failure there is only logged. The
/// `kind` column is derived from the message text, so a malformed claim
/// or offer message is rejected here, before anything is stored.
pub async fn send<D>(
    db: &DatabaseConnection,
    dispatcher: &D,
    sender: i64,
    receiver: i64,
    property_id: i64,
    floor_id: i64,
    message_text: String,
    status: Status,
    comment: Option<String>,
) -> Result<notification::Model>
where
    D: Dispatcher,
{
    let kind = MessageKind::parse(&message_text)?;
    let now = Utc::now();
    let row = notification::ActiveModel {
        pid: Set(property_id),
        fid: Set(floor_id),
        sender: Set(sender),
        receiver: Set(receiver),
        message: Set(message_text),
        kind: Set(kind.tag().to_string()),
        status: Set(status.as_str().to_string()),
        comment: Set(comment),
        is_read: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let property_name = Property::find_by_id(property_id)
        .one(db)
        .await?
        .map_or_else(|| "Property".to_string(), |p| p.name);
    let floor_name = Floor::find_by_id(floor_id)
        .one(db)
        .await?
        .map_or_else(|| "Floor".to_string(), |f| f.name);

    let push = PushMessage {
        receiver,
        title: dispatch::push_title(&row.message, &property_name, &floor_name),
        body: row.message.clone(),
        notification_id: row.id,
        property_id,
        floor_id,
        kind: dispatch::push_kind(&row.message),
    };
    if let Err(error) = dispatcher.deliver(&push).await {
        warn!(
            notification = row.id,
            receiver,
            %error,
            "push delivery failed, keeping the stored notification"
        );
    }

    Ok(row)
}

/// A manager asks the user behind `phone` to become the tenant of a floor.
pub async fn send_tenant_request<D>(
    db: &DatabaseConnection,
    dispatcher: &D,
    manager_id: i64,
    property_id: i64,
    floor_id: i64,
    phone: &str,
) -> Result<notification::Model>
where
    D: Dispatcher,
{
    if !directory::is_manager(db, manager_id, property_id).await? {
        return Err(Error::NotManager {
            user_id: manager_id,
            property_id,
        });
    }
    if phone.trim().is_empty() {
        return Err(Error::MissingField {
            field: "phone number",
        });
    }

    let property = Property::find_by_id(property_id)
        .one(db)
        .await?
        .ok_or(Error::PropertyNotFound { id: property_id })?;
    let floor_row = Floor::find()
        .filter(floor::Column::Id.eq(floor_id))
        .filter(floor::Column::Pid.eq(property_id))
        .one(db)
        .await?
        .ok_or(Error::FloorNotFound { id: floor_id })?;

    let tenant = directory::find_user_by_phone(db, phone)
        .await?
        .ok_or_else(|| Error::PhoneNotRegistered {
            phone: phone.to_string(),
        })?;

    if floor_has_pending_request(db, floor_id).await? {
        return Err(Error::PendingRequestExists { floor_id });
    }

    let text = message::format_tenant_request(&property.name, &floor_row.name);
    let created = send(
        db,
        dispatcher,
        manager_id,
        tenant.id,
        property_id,
        floor_id,
        text,
        Status::Pending,
        None,
    )
    .await?;
    info!(
        notification = created.id,
        floor = floor_id,
        tenant = tenant.id,
        "tenant request sent"
    );
    Ok(created)
}

/// A tenant claims to have paid `amount` (and optionally electricity),
/// addressed to the property's manager for confirmation. No ledger entry
/// is written until the claim is accepted.
pub async fn send_rent_claim<D>(
    db: &DatabaseConnection,
    dispatcher: &D,
    tenant_id: i64,
    property_id: i64,
    floor_id: i64,
    amount: i64,
    month: Option<u32>,
    paid_electricity: Option<i64>,
) -> Result<notification::Model>
where
    D: Dispatcher,
{
    let occupied_by_sender = Floor::find()
        .filter(floor::Column::Id.eq(floor_id))
        .filter(floor::Column::Pid.eq(property_id))
        .filter(floor::Column::Tenant.eq(tenant_id))
        .count(db)
        .await?
        > 0;
    if !occupied_by_sender {
        return Err(Error::NotTenant {
            user_id: tenant_id,
            floor_id,
        });
    }

    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    if let Some(bill) = paid_electricity {
        if bill < 0 {
            return Err(Error::InvalidAmount { amount: bill });
        }
    }

    let manager_id = directory::first_manager(db, property_id)
        .await?
        .ok_or(Error::ManagerNotFound { property_id })?;

    if floor_has_pending_request(db, floor_id).await? {
        return Err(Error::PendingRequestExists { floor_id });
    }

    let text = message::format_rent_claim(amount, month, paid_electricity);
    let created = send(
        db,
        dispatcher,
        tenant_id,
        manager_id,
        property_id,
        floor_id,
        text,
        Status::Pending,
        None,
    )
    .await?;
    info!(
        notification = created.id,
        floor = floor_id,
        amount,
        "rent claim sent to manager"
    );
    Ok(created)
}

/// Accepts or rejects a pending notification.
///
/// Only the receiver may respond, and only while the row is `pending`.
/// The status update and the kind-specific side effect commit together;
/// if the side effect fails nothing is applied. The auto-reply to the
/// original sender happens after the commit, fire-and-forget.
pub async fn respond<D>(
    db: &DatabaseConnection,
    dispatcher: &D,
    user_id: i64,
    notification_id: i64,
    accept: bool,
) -> Result<notification::Model>
where
    D: Dispatcher,
{
    let txn = db.begin().await?;

    let notif = Notification::find()
        .filter(notification::Column::Id.eq(notification_id))
        .filter(notification::Column::Receiver.eq(user_id))
        .one(&txn)
        .await?
        .ok_or(Error::NotificationNotFound {
            id: notification_id,
        })?;

    if Status::parse(&notif.status) != Status::Pending {
        return Err(Error::RequestNotPending {
            id: notification_id,
        });
    }

    let kind = MessageKind::parse(&notif.message)?;
    let new_status = if accept {
        Status::Accepted
    } else {
        Status::Rejected
    };

    let mut active: notification::ActiveModel = notif.clone().into();
    active.status = Set(new_status.as_str().to_string());
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    match kind {
        MessageKind::RentClaim {
            amount,
            electricity,
        } if accept => {
            let floor_row = Floor::find_by_id(notif.fid)
                .one(&txn)
                .await?
                .ok_or(Error::FloorNotFound { id: notif.fid })?;
            let tenant_id = floor_row.tenant.ok_or(Error::FloorVacant {
                floor_id: notif.fid,
            })?;
            ledger::record_claim_payment(&txn, notif.fid, tenant_id, amount, electricity).await?;
        }
        MessageKind::AdvanceOffer { .. } => {
            advance::resolve_pending(&txn, notif.fid, new_status).await?;
        }
        MessageKind::TenantRequest | MessageKind::Generic if accept => {
            // Re-check occupancy inside the transaction so two pending
            // requests for the same floor cannot both be accepted.
            let floor_row = Floor::find_by_id(notif.fid)
                .one(&txn)
                .await?
                .ok_or(Error::FloorNotFound { id: notif.fid })?;
            if floor_row.tenant.is_some() {
                return Err(Error::FloorOccupied {
                    floor_id: notif.fid,
                });
            }
            let mut floor_active: floor::ActiveModel = floor_row.into();
            floor_active.tenant = Set(Some(notif.receiver));
            floor_active.update(&txn).await?;
        }
        _ => {}
    }

    txn.commit().await?;
    info!(
        notification = notif.id,
        status = new_status.as_str(),
        "notification resolved"
    );

    // Fire-and-forget: the transition above is committed and must not be
    // undone by a reply failure.
    let reply_text = message::response_message(&kind, accept);
    if let Err(error) = send(
        db,
        dispatcher,
        notif.receiver,
        notif.sender,
        notif.pid,
        notif.fid,
        reply_text,
        new_status,
        None,
    )
    .await
    {
        warn!(
            notification = notif.id,
            %error,
            "failed to create auto-reply notification"
        );
    }

    Ok(updated)
}

/// Cancels a pending notification. Sender or receiver only.
pub async fn delete(
    db: &DatabaseConnection,
    user_id: i64,
    notification_id: i64,
) -> Result<DeleteOutcome> {
    let txn = db.begin().await?;

    let notif = Notification::find_by_id(notification_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotificationNotFound {
            id: notification_id,
        })?;

    if notif.sender != user_id && notif.receiver != user_id {
        return Err(Error::NotParticipant {
            user_id,
            notification_id,
        });
    }
    if Status::parse(&notif.status) != Status::Pending {
        return Err(Error::RequestNotPending {
            id: notification_id,
        });
    }

    let floor_id = notif.fid;
    let was_rent_claim = notif.kind == message::tag::RENT_CLAIM;
    notif.delete(&txn).await?;

    let floor_pending_cleared =
        was_rent_claim && !floor_has_pending_request(&txn, floor_id).await?;

    txn.commit().await?;
    Ok(DeleteOutcome {
        floor_pending_cleared,
    })
}

/// Attaches a comment to a notification (whatever its status) and spawns
/// a reply notification to the other participant.
///
/// The reply inherits the original's current status; a `pending` original
/// produces a `comment` reply, which offers no accept/reject actions.
/// Returns the reply.
pub async fn add_comment<D>(
    db: &DatabaseConnection,
    dispatcher: &D,
    user_id: i64,
    notification_id: i64,
    comment: String,
) -> Result<notification::Model>
where
    D: Dispatcher,
{
    let original = Notification::find_by_id(notification_id)
        .one(db)
        .await?
        .ok_or(Error::NotificationNotFound {
            id: notification_id,
        })?;

    if original.sender != user_id && original.receiver != user_id {
        return Err(Error::NotParticipant {
            user_id,
            notification_id,
        });
    }

    let counterpart = if user_id == original.sender {
        original.receiver
    } else {
        original.sender
    };

    let reply_status = match Status::parse(&original.status) {
        Status::Accepted => Status::Accepted,
        Status::Rejected => Status::Rejected,
        Status::Pending => Status::Comment,
        Status::Comment | Status::Empty => Status::Pending,
    };

    let reply_text = if comment.is_empty() {
        "Response sent".to_string()
    } else {
        comment.clone()
    };

    let reply = send(
        db,
        dispatcher,
        user_id,
        counterpart,
        original.pid,
        original.fid,
        reply_text,
        reply_status,
        None,
    )
    .await?;

    let mut active: notification::ActiveModel = original.into();
    active.comment = Set(Some(comment));
    active.updated_at = Set(Utc::now());
    active.update(db).await?;

    Ok(reply)
}

/// All notifications received by a user, newest first, with display names
/// resolved.
pub async fn notifications_for(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<NotificationView>> {
    let rows = Notification::find()
        .filter(notification::Column::Receiver.eq(user_id))
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await?;

    let mut views = Vec::with_capacity(rows.len());
    for row in rows {
        let property_name = Property::find_by_id(row.pid)
            .one(db)
            .await?
            .map_or_else(|| "Property".to_string(), |p| p.name);
        let floor_name = Floor::find_by_id(row.fid)
            .one(db)
            .await?
            .map_or_else(|| "Floor".to_string(), |f| f.name);
        let sender_name = directory::user_display_name(db, row.sender).await?;
        let receiver_name = directory::user_display_name(db, row.receiver).await?;
        let show_actions = Status::parse(&row.status) == Status::Pending;
        views.push(NotificationView {
            notification: row,
            property_name,
            floor_name,
            sender_name,
            receiver_name,
            show_actions,
        });
    }
    Ok(views)
}

/// The tenant's own pending rent claims on a floor, newest first.
pub async fn pending_rent_claims(
    db: &DatabaseConnection,
    user_id: i64,
    property_id: i64,
    floor_id: i64,
) -> Result<Vec<notification::Model>> {
    let occupied_by_sender = Floor::find()
        .filter(floor::Column::Id.eq(floor_id))
        .filter(floor::Column::Pid.eq(property_id))
        .filter(floor::Column::Tenant.eq(user_id))
        .count(db)
        .await?
        > 0;
    if !occupied_by_sender {
        return Err(Error::NotTenant { user_id, floor_id });
    }

    Notification::find()
        .filter(notification::Column::Fid.eq(floor_id))
        .filter(notification::Column::Sender.eq(user_id))
        .filter(notification::Column::Kind.eq(message::tag::RENT_CLAIM))
        .filter(notification::Column::Status.eq(Status::Pending.as_str()))
        .order_by_desc(notification::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks every unread notification received by the user as read.
/// Returns how many rows changed.
pub async fn mark_all_read(db: &DatabaseConnection, user_id: i64) -> Result<u64> {
    let result = Notification::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .col_expr(notification::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(notification::Column::Receiver.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Whether a non-advance request is pending on the floor. This is the
/// derived "pending" indicator floor listings show, and the collision
/// check applied when tenant requests and rent claims are created.
pub async fn floor_has_pending_request<C>(db: &C, floor_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = Notification::find()
        .filter(notification::Column::Fid.eq(floor_id))
        .filter(notification::Column::Status.eq(Status::Pending.as_str()))
        .filter(notification::Column::Kind.ne(message::tag::ADVANCE_OFFER))
        .count(db)
        .await?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::Payment;
    use crate::entities::payment;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_accept_tenant_request_assigns_tenant() -> Result<()> {
        let db = setup_test_db().await?;
        let dispatcher = RecordingDispatcher::default();
        let manager = create_test_user(&db, "Mina", "01711111111").await?;
        let tenant = create_test_user(&db, "Tarek", "01722222222").await?;
        let prop = create_test_property(&db, manager.id, "Green Villa").await?;
        let fl = create_test_floor(&db, prop.id, "2nd Floor", 1000).await?;

        let request =
            send_tenant_request(&db, &dispatcher, manager.id, prop.id, fl.id, "01722222222")
                .await?;
        assert_eq!(request.status, "pending");
        assert_eq!(request.kind, message::tag::TENANT_REQUEST);
        assert_eq!(request.receiver, tenant.id);

        let resolved = respond(&db, &dispatcher, tenant.id, request.id, true).await?;
        assert_eq!(resolved.status, "accepted");

        let floor_row = crate::entities::Floor::find_by_id(fl.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(floor_row.tenant, Some(tenant.id));

        // The auto-reply went back to the manager with the new status
        let replies = notifications_for(&db, manager.id).await?;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].notification.message, "Tenant request is accepted");
        assert_eq!(replies[0].notification.status, "accepted");
        assert!(!replies[0].show_actions);

        Ok(())
    }

    #[tokio::test]
    async fn test_respond_twice_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let dispatcher = RecordingDispatcher::default();
        let manager = create_test_user(&db, "Mina", "01711111111").await?;
        let tenant = create_test_user(&db, "Tarek", "01722222222").await?;
        let prop = create_test_property(&db, manager.id, "Green Villa").await?;
        let fl = create_test_floor(&db, prop.id, "2nd Floor", 1000).await?;

        let request =
            send_tenant_request(&db, &dispatcher, manager.id, prop.id, fl.id, "01722222222")
                .await?;
        respond(&db, &dispatcher, tenant.id, request.id, true).await?;

        let again = respond(&db, &dispatcher, tenant.id, request.id, true).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::RequestNotPending { id: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_second_accept_on_same_floor_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        let dispatcher = RecordingDispatcher::default();
        let manager = create_test_user(&db, "Mina", "01711111111").await?;
        let first = create_test_user(&db, "Tarek", "01722222222").await?;
        let second = create_test_user(&db, "Rima", "01733333333").await?;
        let prop = create_test_property(&db, manager.id, "Green Villa").await?;
        let fl = create_test_floor(&db, prop.id, "2nd Floor", 1000).await?;

        // Two pending requests for the same vacant floor, as a creation
        // race would leave them
        let to_first = insert_test_notification(
            &db,
            manager.id,
            first.id,
            prop.id,
            fl.id,
            "Tenant request for Green Villa - 2nd Floor",
            "pending",
        )
        .await?;
        let to_second = insert_test_notification(
            &db,
            manager.id,
            second.id,
            prop.id,
            fl.id,
            "Tenant request for Green Villa - 2nd Floor",
            "pending",
        )
        .await?;

        respond(&db, &dispatcher, first.id, to_first.id, true).await?;

        let conflict = respond(&db, &dispatcher, second.id, to_second.id, true).await;
        assert!(matches!(
            conflict.unwrap_err(),
            Error::FloorOccupied { floor_id: _ }
        ));

        // The losing row rolled back to pending and the floor kept its
        // single tenant
        let floor_row = crate::entities::Floor::find_by_id(fl.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(floor_row.tenant, Some(first.id));

        let losing = Notification::find_by_id(to_second.id).one(&db).await?.unwrap();
        assert_eq!(losing.status, "pending");

        Ok(())
    }

    #[tokio::test]
    async fn test_reject_tenant_request_leaves_floor_vacant() -> Result<()> {
        let db = setup_test_db().await?;
        let dispatcher = RecordingDispatcher::default();
        let manager = create_test_user(&db, "Mina", "01711111111").await?;
        let tenant = create_test_user(&db, "Tarek", "01722222222").await?;
        let prop = create_test_property(&db, manager.id, "Green Villa").await?;
        let fl = create_test_floor(&db, prop.id, "2nd Floor", 1000).await?;

        let request =
            send_tenant_request(&db, &dispatcher, manager.id, prop.id, fl.id, "01722222222")
                .await?;
        let resolved = respond(&db, &dispatcher, tenant.id, request.id, false).await?;
        assert_eq!(resolved.status, "rejected");

        let floor_row = crate::entities::Floor::find_by_id(fl.id)
            .one(&db)
            .await?
            .unwrap();
        assert!(floor_row.tenant.is_none());

        let replies = notifications_for(&db, manager.id).await?;
        assert_eq!(replies[0].notification.message, "Tenant request is rejected");

        Ok(())
    }

    #[tokio::test]
    async fn test_accept_rent_claim_appends_one_payment() -> Result<()> {
        let (db, manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();

        let claim =
            send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 500, None, None).await?;
        assert_eq!(claim.message, "Payment amount: 500 tk");
        assert_eq!(claim.kind, message::tag::RENT_CLAIM);
        assert_eq!(claim.receiver, manager.id);

        respond(&db, &dispatcher, manager.id, claim.id, true).await?;

        let rows = Payment::find()
            .filter(payment::Column::Fid.eq(fl.id))
            .all(&db)
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rent, 0);
        assert_eq!(rows[0].received_money, 500);
        assert!(rows[0].full_payment);

        let replies = notifications_for(&db, tenant.id).await?;
        assert_eq!(replies[0].notification.message, "Payment of 500 tk is accepted");

        Ok(())
    }

    #[tokio::test]
    async fn test_reject_rent_claim_appends_nothing() -> Result<()> {
        let (db, manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();

        let claim =
            send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 500, None, None).await?;
        respond(&db, &dispatcher, manager.id, claim.id, false).await?;

        let rows = Payment::find()
            .filter(payment::Column::Fid.eq(fl.id))
            .all(&db)
            .await?;
        assert!(rows.is_empty());

        let replies = notifications_for(&db, tenant.id).await?;
        assert_eq!(replies[0].notification.message, "Payment of 500 tk is rejected");

        Ok(())
    }

    #[tokio::test]
    async fn test_accept_rent_claim_with_electricity() -> Result<()> {
        let (db, manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();

        let claim = send_rent_claim(
            &db,
            &dispatcher,
            tenant.id,
            prop.id,
            fl.id,
            1200,
            Some(3),
            Some(150),
        )
        .await?;
        assert_eq!(
            claim.message,
            "Payment amount: 1200 tk for March, Paid electricity bill: 150 tk"
        );

        respond(&db, &dispatcher, manager.id, claim.id, true).await?;

        let rows = Payment::find()
            .filter(payment::Column::Fid.eq(fl.id))
            .all(&db)
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].received_money, 1200);
        assert_eq!(rows[0].paid_bill, Some(150));

        Ok(())
    }

    #[tokio::test]
    async fn test_respond_requires_receiver() -> Result<()> {
        let (db, _manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();

        let claim =
            send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 500, None, None).await?;

        // The sender cannot resolve their own claim
        let result = respond(&db, &dispatcher, tenant.id, claim.id, true).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotificationNotFound { id: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_push_failure_does_not_fail_respond() -> Result<()> {
        let (db, manager, tenant, prop, fl) = setup_tenancy().await?;
        let recording = RecordingDispatcher::default();
        let claim =
            send_rent_claim(&db, &recording, tenant.id, prop.id, fl.id, 500, None, None).await?;

        let failing = FailingDispatcher;
        let resolved = respond(&db, &failing, manager.id, claim.id, true).await?;
        assert_eq!(resolved.status, "accepted");

        // The reply row exists even though its push never went out
        let replies = notifications_for(&db, tenant.id).await?;
        assert_eq!(replies.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_pending_request_is_rejected() -> Result<()> {
        let (db, manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();

        send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 500, None, None).await?;

        let second =
            send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 700, None, None).await;
        assert!(matches!(
            second.unwrap_err(),
            Error::PendingRequestExists { floor_id: _ }
        ));

        let tenant_request =
            send_tenant_request(&db, &dispatcher, manager.id, prop.id, fl.id, "01722222222").await;
        assert!(matches!(
            tenant_request.unwrap_err(),
            Error::PendingRequestExists { floor_id: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_pending_advance_does_not_block_requests() -> Result<()> {
        let (db, manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();

        crate::core::advance::create_offer(
            &db,
            &dispatcher,
            manager.id,
            prop.id,
            fl.id,
            tenant.id,
            20000,
        )
        .await?;

        // The advance offer is pending, but rent claims are still allowed
        let claim =
            send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 500, None, None).await?;
        assert_eq!(claim.status, "pending");

        Ok(())
    }

    #[tokio::test]
    async fn test_send_rent_claim_requires_tenancy() -> Result<()> {
        let (db, manager, _tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();

        let result =
            send_rent_claim(&db, &dispatcher, manager.id, prop.id, fl.id, 500, None, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotTenant {
                user_id: _,
                floor_id: _
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_pending_claim_clears_floor_indicator() -> Result<()> {
        let (db, _manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();

        let claim =
            send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 500, None, None).await?;
        assert!(floor_has_pending_request(&db, fl.id).await?);

        let outcome = delete(&db, tenant.id, claim.id).await?;
        assert!(outcome.floor_pending_cleared);
        assert!(!floor_has_pending_request(&db, fl.id).await?);

        // No ledger entry was ever written for the deleted claim
        let rows = Payment::find()
            .filter(payment::Column::Fid.eq(fl.id))
            .all(&db)
            .await?;
        assert!(rows.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_claim_keeps_indicator_when_another_pending_remains() -> Result<()> {
        let (db, manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();

        let claim =
            send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 500, None, None).await?;
        // A second pending row on the same floor, inserted directly as a
        // racing creation would leave it
        insert_test_notification(
            &db,
            tenant.id,
            manager.id,
            prop.id,
            fl.id,
            "Payment amount: 900 tk",
            "pending",
        )
        .await?;

        let outcome = delete(&db, tenant.id, claim.id).await?;
        assert!(!outcome.floor_pending_cleared);
        assert!(floor_has_pending_request(&db, fl.id).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_guards() -> Result<()> {
        let (db, manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();
        let outsider = create_test_user(&db, "Orin", "01799999999").await?;

        let claim =
            send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 500, None, None).await?;

        let result = delete(&db, outsider.id, claim.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotParticipant {
                user_id: _,
                notification_id: _
            }
        ));

        respond(&db, &dispatcher, manager.id, claim.id, false).await?;
        let result = delete(&db, tenant.id, claim.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::RequestNotPending { id: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_comment_on_accepted_notification() -> Result<()> {
        let (db, manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();

        let claim =
            send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 500, None, None).await?;
        respond(&db, &dispatcher, manager.id, claim.id, true).await?;

        let before = Notification::find().all(&db).await?.len();

        let reply = add_comment(
            &db,
            &dispatcher,
            manager.id,
            claim.id,
            "Received in cash".to_string(),
        )
        .await?;
        assert_eq!(reply.status, "accepted");
        assert_eq!(reply.receiver, tenant.id);
        assert_eq!(reply.message, "Received in cash");

        // Exactly one new row; the original kept its status and gained
        // only the comment
        let after = Notification::find().all(&db).await?.len();
        assert_eq!(after, before + 1);

        let original = Notification::find_by_id(claim.id).one(&db).await?.unwrap();
        assert_eq!(original.status, "accepted");
        assert_eq!(original.comment.as_deref(), Some("Received in cash"));

        Ok(())
    }

    #[tokio::test]
    async fn test_comment_on_pending_notification_is_not_actionable() -> Result<()> {
        let (db, manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();

        let claim =
            send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 500, None, None).await?;

        let reply = add_comment(
            &db,
            &dispatcher,
            tenant.id,
            claim.id,
            "Paid via bank transfer".to_string(),
        )
        .await?;
        assert_eq!(reply.status, "comment");
        assert_eq!(reply.receiver, manager.id);

        let views = notifications_for(&db, manager.id).await?;
        let comment_view = views
            .iter()
            .find(|v| v.notification.id == reply.id)
            .unwrap();
        assert!(!comment_view.show_actions);

        Ok(())
    }

    #[tokio::test]
    async fn test_comment_by_non_participant_is_forbidden() -> Result<()> {
        let (db, _manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();
        let outsider = create_test_user(&db, "Orin", "01799999999").await?;

        let claim =
            send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 500, None, None).await?;

        let result = add_comment(&db, &dispatcher, outsider.id, claim.id, "hi".to_string()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotParticipant {
                user_id: _,
                notification_id: _
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_pending_rent_claims_listing() -> Result<()> {
        let (db, _manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();

        let claim =
            send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 500, None, None).await?;

        let claims = pending_rent_claims(&db, tenant.id, prop.id, fl.id).await?;
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].id, claim.id);

        let other = create_test_user(&db, "Orin", "01799999999").await?;
        let result = pending_rent_claims(&db, other.id, prop.id, fl.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotTenant {
                user_id: _,
                floor_id: _
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_all_read() -> Result<()> {
        let (db, manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();

        send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 500, None, None).await?;

        let changed = mark_all_read(&db, manager.id).await?;
        assert_eq!(changed, 1);

        let views = notifications_for(&db, manager.id).await?;
        assert!(views.iter().all(|v| v.notification.is_read));

        // Second pass finds nothing unread
        let changed = mark_all_read(&db, manager.id).await?;
        assert_eq!(changed, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_dispatcher_receives_pushes() -> Result<()> {
        let (db, manager, tenant, prop, fl) = setup_tenancy().await?;
        let dispatcher = RecordingDispatcher::default();

        let claim =
            send_rent_claim(&db, &dispatcher, tenant.id, prop.id, fl.id, 500, None, None).await?;
        respond(&db, &dispatcher, manager.id, claim.id, true).await?;

        let pushes = dispatcher.recorded();
        assert_eq!(pushes.len(), 2);
        assert_eq!(pushes[0].receiver, manager.id);
        assert_eq!(pushes[0].kind, "payment");
        assert!(pushes[0].title.starts_with("Payment Notification"));
        assert_eq!(pushes[1].receiver, tenant.id);

        Ok(())
    }
}
