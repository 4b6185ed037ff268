//! Core business logic - framework-agnostic rental operations.
//!
//! The modules here own all semantics: the tenancy directory, the payment
//! ledger, the notification state machine and its message conventions,
//! advance offers, the monthly reminder sweep and the risk heuristics.
//! Nothing in here knows about HTTP or any particular push transport.

/// Advance-payment offers and their lifecycle
pub mod advance;
/// Tenancy directory - property/floor bookkeeping and authorization reads
pub mod directory;
/// Payment insights - late-payment metrics and risk scores
pub mod insight;
/// Ledger engine - outstanding balances over the payment log
pub mod ledger;
/// Message kinds and their textual wire conventions
pub mod message;
/// Notification state machine
pub mod notify;
/// Monthly rent reminder sweep
pub mod reminder;
