//! Rentbook daemon - wires configuration, the database and the periodic
//! monthly-reminder sweep together. All request/response surfaces live
//! elsewhere; this binary only keeps the time-triggered sweep running.

use dotenvy::dotenv;
use rentbook::{
    config::{database, policy},
    core::reminder,
    dispatch::LogDispatcher,
    errors::Result,
};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load policy configuration
    let app_policy = policy::load_default_policy()
        .inspect_err(|e| error!("Failed to load policy configuration: {e}"))?;
    info!(
        reminder_day = app_policy.reminder.day_of_month,
        "Policy configuration loaded."
    );

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Run the reminder loop
    let dispatcher = LogDispatcher;
    let mut interval =
        tokio::time::interval(Duration::from_secs(app_policy.reminder.check_interval_secs.max(1)));
    info!("Reminder loop started.");

    loop {
        interval.tick().await;
        match reminder::run_due_sweep(&db, &dispatcher, &app_policy.reminder).await {
            Ok(Some(summary)) => {
                info!(
                    sent = summary.sent,
                    skipped = summary.skipped,
                    "monthly reminder sweep completed"
                );
            }
            Ok(None) => {}
            Err(e) => error!("reminder sweep failed: {e}"),
        }
    }
}
