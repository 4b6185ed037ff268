//! Shared test utilities for rentbook.
//!
//! This module provides common helper functions for setting up test
//! databases and creating test entities with sensible defaults, plus the
//! dispatcher test doubles.

use crate::{
    core::message::MessageKind,
    dispatch::{Dispatcher, PushMessage},
    entities::{Floor, care_of, floor, notification, payment, property, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, prelude::*};
use std::sync::{Mutex, PoisonError};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user.
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
    phone: &str,
) -> Result<user::Model> {
    user::ActiveModel {
        name: Set(name.to_string()),
        phone_number: Set(phone.to_string()),
        fcm_token: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a test property managed by `manager_id`.
pub async fn create_test_property(
    db: &DatabaseConnection,
    manager_id: i64,
    name: &str,
) -> Result<property::Model> {
    let created = property::ActiveModel {
        name: Set(name.to_string()),
        address: Set("1 Test Road".to_string()),
        photo: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    care_of::ActiveModel {
        uid: Set(manager_id),
        pid: Set(created.id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(created)
}

/// Creates a vacant test floor.
pub async fn create_test_floor(
    db: &DatabaseConnection,
    property_id: i64,
    name: &str,
    rent: i64,
) -> Result<floor::Model> {
    floor::ActiveModel {
        pid: Set(property_id),
        name: Set(name.to_string()),
        rent: Set(rent),
        tenant: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Moves a tenant into a floor directly, bypassing the request flow.
pub async fn occupy_floor(
    db: &DatabaseConnection,
    floor_id: i64,
    tenant_id: i64,
) -> Result<floor::Model> {
    let floor_row = Floor::find_by_id(floor_id)
        .one(db)
        .await?
        .ok_or(Error::FloorNotFound { id: floor_id })?;
    let mut active: floor::ActiveModel = floor_row.into();
    active.tenant = Set(Some(tenant_id));
    active.update(db).await.map_err(Into::into)
}

/// Appends a ledger row with no electricity figures.
pub async fn create_test_payment(
    db: &DatabaseConnection,
    floor_id: i64,
    tenant_id: i64,
    rent: i64,
    received_money: i64,
) -> Result<payment::Model> {
    create_custom_payment(db, floor_id, tenant_id, rent, received_money, None, None).await
}

/// Appends a ledger row with full control over the electricity columns.
pub async fn create_custom_payment(
    db: &DatabaseConnection,
    floor_id: i64,
    tenant_id: i64,
    rent: i64,
    received_money: i64,
    electricity_bill: Option<i64>,
    paid_bill: Option<i64>,
) -> Result<payment::Model> {
    payment::ActiveModel {
        fid: Set(floor_id),
        uid: Set(tenant_id),
        rent: Set(rent),
        received_money: Set(received_money),
        electricity_bill: Set(electricity_bill),
        paid_bill: Set(paid_bill),
        full_payment: Set(rent == received_money),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Inserts a notification row directly, deriving its kind from the
/// message text. Used to stage states the creation guards would refuse,
/// such as two pending requests racing on one floor.
pub async fn insert_test_notification(
    db: &DatabaseConnection,
    sender: i64,
    receiver: i64,
    property_id: i64,
    floor_id: i64,
    message_text: &str,
    status: &str,
) -> Result<notification::Model> {
    let kind = MessageKind::parse(message_text)?;
    let now = Utc::now();
    notification::ActiveModel {
        pid: Set(property_id),
        fid: Set(floor_id),
        sender: Set(sender),
        receiver: Set(receiver),
        message: Set(message_text.to_string()),
        kind: Set(kind.tag().to_string()),
        status: Set(status.to_string()),
        comment: Set(None),
        is_read: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Sets up the standard scenario: a manager, a tenant, one property and
/// one occupied floor. Returns (db, manager, tenant, property, floor).
pub async fn setup_tenancy() -> Result<(
    DatabaseConnection,
    user::Model,
    user::Model,
    property::Model,
    floor::Model,
)> {
    let db = setup_test_db().await?;
    let manager = create_test_user(&db, "Mina", "01711111111").await?;
    let tenant = create_test_user(&db, "Tarek", "01722222222").await?;
    let prop = create_test_property(&db, manager.id, "Green Villa").await?;
    let fl = create_test_floor(&db, prop.id, "2nd Floor", 1000).await?;
    let fl = occupy_floor(&db, fl.id, tenant.id).await?;
    Ok((db, manager, tenant, prop, fl))
}

/// Dispatcher that records every push it is handed.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    pushes: Mutex<Vec<PushMessage>>,
}

impl RecordingDispatcher {
    /// Everything delivered so far, in order.
    pub fn recorded(&self) -> Vec<PushMessage> {
        self.pushes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Dispatcher for RecordingDispatcher {
    async fn deliver(&self, push: &PushMessage) -> Result<()> {
        self.pushes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(push.clone());
        Ok(())
    }
}

/// Dispatcher whose transport is always down.
#[derive(Debug, Clone, Copy)]
pub struct FailingDispatcher;

impl Dispatcher for FailingDispatcher {
    async fn deliver(&self, _push: &PushMessage) -> Result<()> {
        Err(Error::Dispatch {
            message: "transport offline".to_string(),
        })
    }
}
