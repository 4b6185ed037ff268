//! Message kinds and the textual wire conventions that encode them.
//!
//! A notification's type used to be implicit in its message text; here the
//! kind is an explicit tagged variant assigned at creation and stored in
//! the `kind` column, while the message text keeps the exact conventions
//! external consumers parse:
//!
//! - `"Payment amount: <n> tk"` (optionally `" for <Month>"`, optionally
//!   `", Paid electricity bill: <n> tk"`) is a rent-payment claim;
//! - `"Advance payment request: <n> tk"` is an advance-payment offer;
//! - `"Tenant request for <property> - <floor>"` is a tenancy request;
//! - anything else is generic and takes tenant-request semantics on accept.

use crate::errors::{Error, Result};

/// Message prefix that marks a rent-payment claim.
pub const RENT_CLAIM_PREFIX: &str = "Payment amount:";
/// Message prefix that marks an advance-payment offer.
pub const ADVANCE_OFFER_PREFIX: &str = "Advance payment request:";
/// Marker preceding the optional electricity figure in a rent claim.
pub const ELECTRICITY_MARKER: &str = "Paid electricity bill:";
/// Message prefix that marks a tenancy request.
pub const TENANT_REQUEST_PREFIX: &str = "Tenant request";

/// Stored values for the notification `kind` column.
pub mod tag {
    /// A manager asking a user to become the tenant of a floor.
    pub const TENANT_REQUEST: &str = "tenant_request";
    /// A tenant claiming to have paid rent (and possibly electricity).
    pub const RENT_CLAIM: &str = "rent_claim";
    /// A manager offering an advance payment to a user.
    pub const ADVANCE_OFFER: &str = "advance_offer";
    /// Reminders, replies and comments.
    pub const GENERIC: &str = "generic";
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// The kind of request a notification carries, with any amounts it encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Accepting assigns the receiver as the floor's tenant.
    TenantRequest,
    /// Accepting appends a payment row crediting `amount` (and `electricity`
    /// against the electricity balance, when present).
    RentClaim {
        /// Rent amount the sender claims to have paid
        amount: i64,
        /// Electricity amount paid alongside, if any
        electricity: Option<i64>,
    },
    /// Accepting or rejecting resolves the floor's pending advance row.
    AdvanceOffer {
        /// Offered amount
        amount: i64,
    },
    /// No dedicated side effect; treated like a tenancy request on accept.
    Generic,
}

impl MessageKind {
    /// Classifies a message by the wire conventions above.
    ///
    /// Fails with [`Error::UnparsableAmount`] when a claim or offer prefix
    /// matches but no amount can be extracted; everything else that matches
    /// no prefix is [`MessageKind::Generic`].
    pub fn parse(message: &str) -> Result<Self> {
        if message.starts_with(RENT_CLAIM_PREFIX) {
            let amount =
                amount_after(message, RENT_CLAIM_PREFIX).ok_or_else(|| Error::UnparsableAmount {
                    message: message.to_string(),
                })?;
            return Ok(Self::RentClaim {
                amount,
                electricity: amount_after(message, ELECTRICITY_MARKER),
            });
        }

        if message.starts_with(ADVANCE_OFFER_PREFIX) {
            let amount = amount_after(message, ADVANCE_OFFER_PREFIX).ok_or_else(|| {
                Error::UnparsableAmount {
                    message: message.to_string(),
                }
            })?;
            return Ok(Self::AdvanceOffer { amount });
        }

        if message.starts_with(TENANT_REQUEST_PREFIX) {
            return Ok(Self::TenantRequest);
        }

        Ok(Self::Generic)
    }

    /// The value stored in the notification `kind` column.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::TenantRequest => tag::TENANT_REQUEST,
            Self::RentClaim { .. } => tag::RENT_CLAIM,
            Self::AdvanceOffer { .. } => tag::ADVANCE_OFFER,
            Self::Generic => tag::GENERIC,
        }
    }
}

/// Extracts the integer that follows `marker` and precedes the literal
/// `tk`, allowing whitespace on either side of the digits.
fn amount_after(text: &str, marker: &str) -> Option<i64> {
    let (_, rest) = text.split_once(marker)?;
    let rest = rest.trim_start();
    let digits = rest
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    let (number, tail) = rest.split_at(digits);
    if !tail.trim_start().starts_with("tk") {
        return None;
    }
    number.parse().ok()
}

/// Formats a rent-payment claim message.
///
/// `month` is a 1-based calendar month; out-of-range values are ignored.
#[must_use]
pub fn format_rent_claim(amount: i64, month: Option<u32>, paid_electricity: Option<i64>) -> String {
    let mut message = match month.and_then(|m| MONTH_NAMES.get(m.checked_sub(1)? as usize)) {
        Some(name) => format!("{RENT_CLAIM_PREFIX} {amount} tk for {name}"),
        None => format!("{RENT_CLAIM_PREFIX} {amount} tk"),
    };
    if let Some(bill) = paid_electricity {
        message.push_str(&format!(", {ELECTRICITY_MARKER} {bill} tk"));
    }
    message
}

/// Formats an advance-payment offer message.
#[must_use]
pub fn format_advance_offer(money: i64) -> String {
    format!("{ADVANCE_OFFER_PREFIX} {money} tk")
}

/// Formats a tenancy-request message.
#[must_use]
pub fn format_tenant_request(property_name: &str, floor_name: &str) -> String {
    format!("{TENANT_REQUEST_PREFIX} for {property_name} - {floor_name}")
}

/// Formats a monthly rent reminder message.
#[must_use]
pub fn format_reminder(property_name: &str, floor_name: &str, due_rent: i64) -> String {
    format!("Monthly rent reminder for {property_name} - {floor_name}:\nDue Rent: {due_rent} tk")
}

/// Composes the auto-reply sent when a request is accepted or rejected.
#[must_use]
pub fn response_message(kind: &MessageKind, accepted: bool) -> String {
    let outcome = if accepted { "accepted" } else { "rejected" };
    match kind {
        MessageKind::RentClaim { amount, .. } => format!("Payment of {amount} tk is {outcome}"),
        MessageKind::AdvanceOffer { amount } => {
            format!("Advance payment of {amount} tk is {outcome}")
        }
        MessageKind::TenantRequest | MessageKind::Generic => {
            format!("Tenant request is {outcome}")
        }
    }
}
