//! Dispatch collaborator - out-of-band delivery of notifications.
//!
//! The core persists every notification row itself and then hands a
//! [`PushMessage`] to a [`Dispatcher`]. Delivery is best-effort by design:
//! a failed push is logged by the caller and never rolls back the state
//! transition that produced it. The production default, [`LogDispatcher`],
//! only records the attempt; wiring a real push transport is a deployment
//! concern, not a core one.

use crate::core::message;
use crate::errors::Result;
use tracing::info;

/// A rendered push notification, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    /// User the push is addressed to
    pub receiver: i64,
    /// Short headline derived from the message kind and location
    pub title: String,
    /// Full message text
    pub body: String,
    /// Backing notification row
    pub notification_id: i64,
    /// Property the notification is scoped to
    pub property_id: i64,
    /// Floor the notification is scoped to
    pub floor_id: i64,
    /// Client-side routing tag (`"payment"`, `"tenant_request"`, ...)
    pub kind: &'static str,
}

/// Delivery sink for push notifications.
pub trait Dispatcher {
    /// Attempts to deliver one push message.
    async fn deliver(&self, push: &PushMessage) -> Result<()>;
}

/// Dispatcher that records deliveries in the log and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDispatcher;

impl Dispatcher for LogDispatcher {
    async fn deliver(&self, push: &PushMessage) -> Result<()> {
        info!(
            receiver = push.receiver,
            notification = push.notification_id,
            kind = push.kind,
            title = %push.title,
            "push delivery (log only)"
        );
        Ok(())
    }
}

/// Derives the push headline from the message content plus location names,
/// falling back to a generic headline for unrecognized content.
#[must_use]
pub fn push_title(message_text: &str, property_name: &str, floor_name: &str) -> String {
    if message_text.contains(message::TENANT_REQUEST_PREFIX) {
        format!("New Tenant Request - {property_name} {floor_name}")
    } else if message_text.contains("Payment amount") {
        format!("Payment Notification - {property_name} {floor_name}")
    } else if message_text.contains("Advance payment") {
        format!("Advance Payment Request - {property_name} {floor_name}")
    } else if message_text.contains("accepted") || message_text.contains("rejected") {
        format!("Request Update - {property_name} {floor_name}")
    } else if message_text.contains("Monthly rent reminder") {
        format!("Monthly Rent Reminder - {property_name} {floor_name}")
    } else {
        format!("New Notification! - {property_name} {floor_name}")
    }
}

/// Derives the client-side routing tag from the message content.
#[must_use]
pub fn push_kind(message_text: &str) -> &'static str {
    if message_text.contains("Monthly rent reminder") {
        "monthly_reminder"
    } else if message_text.contains("Payment amount") {
        "payment"
    } else if message_text.contains("Advance payment") {
        "advance_payment"
    } else if message_text.contains(message::TENANT_REQUEST_PREFIX) {
        "tenant_request"
    } else {
        "notification"
    }
}
