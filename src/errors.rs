//! Unified error types for the rentbook crate.
//!
//! Variants fall into five families: lookup misses, authorization failures,
//! state conflicts, input validation, and infrastructure errors. Guard
//! failures are raised before any mutation; database errors surface after
//! the surrounding transaction has rolled back.

use thiserror::Error;

/// All errors the crate can produce.
#[derive(Debug, Error)]
pub enum Error {
    // --- lookup misses ---
    #[error("Property {id} not found")]
    PropertyNotFound { id: i64 },

    #[error("Floor {id} not found")]
    FloorNotFound { id: i64 },

    #[error("Notification {id} not found")]
    NotificationNotFound { id: i64 },

    #[error("User {id} not found")]
    UserNotFound { id: i64 },

    #[error("No user registered with phone number {phone}")]
    PhoneNotRegistered { phone: String },

    #[error("No manager assigned to property {property_id}")]
    ManagerNotFound { property_id: i64 },

    #[error("No pending advance payment for floor {floor_id}")]
    AdvanceNotFound { floor_id: i64 },

    // --- authorization ---
    #[error("User {user_id} does not manage property {property_id}")]
    NotManager { user_id: i64, property_id: i64 },

    #[error("User {user_id} is not the tenant of floor {floor_id}")]
    NotTenant { user_id: i64, floor_id: i64 },

    #[error("User {user_id} is not a participant of notification {notification_id}")]
    NotParticipant { user_id: i64, notification_id: i64 },

    // --- state conflicts ---
    #[error("Floor {floor_id} is already occupied")]
    FloorOccupied { floor_id: i64 },

    #[error("Floor {floor_id} has no tenant")]
    FloorVacant { floor_id: i64 },

    #[error("A pending request already exists for floor {floor_id}")]
    PendingRequestExists { floor_id: i64 },

    #[error("A pending advance payment already exists for floor {floor_id}")]
    PendingAdvanceExists { floor_id: i64 },

    #[error("Notification {id} is no longer pending")]
    RequestNotPending { id: i64 },

    // --- input validation ---
    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: i64 },

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("Could not extract an amount from message: {message}")]
    UnparsableAmount { message: String },

    // --- infrastructure ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Push delivery failed: {message}")]
    Dispatch { message: String },
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
