//! Database configuration module.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated straight from the entity definitions via
//! `Schema::create_table_from_entity`, so the database schema always
//! matches the Rust structs without hand-written SQL.

use crate::entities::{Advance, CareOf, Floor, Notification, Payment, Property, SystemState, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from the `DATABASE_URL` environment variable,
/// falling back to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/rentbook.sqlite".to_string())
}

/// Establishes the database connection.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let user_table = schema.create_table_from_entity(User);
    let property_table = schema.create_table_from_entity(Property);
    let care_of_table = schema.create_table_from_entity(CareOf);
    let floor_table = schema.create_table_from_entity(Floor);
    let payment_table = schema.create_table_from_entity(Payment);
    let advance_table = schema.create_table_from_entity(Advance);
    let notification_table = schema.create_table_from_entity(Notification);
    let system_state_table = schema.create_table_from_entity(SystemState);

    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&property_table)).await?;
    db.execute(builder.build(&care_of_table)).await?;
    db.execute(builder.build(&floor_table)).await?;
    db.execute(builder.build(&payment_table)).await?;
    db.execute(builder.build(&advance_table)).await?;
    db.execute(builder.build(&notification_table)).await?;
    db.execute(builder.build(&system_state_table)).await?;

    Ok(())
}
