//! First-run setup flag, stored in the `app_config` table.
//!
//! While the flag is unset the instance accepts a single unauthenticated
//! admin registration; afterwards accounts come from the admin panel only.

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::errors::ServiceError;

const SETUP_KEY: &str = "setup_complete";

pub async fn is_complete(db: &DatabaseConnection) -> Result<bool, ServiceError> {
    let value = models::app_config::get(db, SETUP_KEY).await?;
    Ok(value == Some(serde_json::Value::Bool(true)))
}

pub async fn mark_complete(db: &DatabaseConnection) -> Result<(), ServiceError> {
    models::app_config::set(db, SETUP_KEY, serde_json::Value::Bool(true)).await?;
    info!("setup_marked_complete");
    Ok(())
}
