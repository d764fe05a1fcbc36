#![cfg(test)]
use migration::MigratorTrait;
use models::db::connect_with_config;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

fn test_db_config() -> configs::DatabaseConfig {
    let mut cfg = configs::DatabaseConfig::default();
    cfg.normalize_from_env();
    if cfg.max_connections == 0 {
        cfg.max_connections = 10;
    }
    cfg.min_connections = cfg.min_connections.max(1);
    if cfg.connect_timeout_secs == 0 {
        cfg.connect_timeout_secs = 30;
    }
    if cfg.acquire_timeout_secs == 0 {
        cfg.acquire_timeout_secs = 10;
    }
    if cfg.idle_timeout_secs == 0 {
        cfg.idle_timeout_secs = 600;
    }
    cfg
}

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    // Run migrations exactly once, with a throwaway connection
    MIGRATED
        .get_or_init(|| async {
            let cfg = test_db_config();
            let db = connect_with_config(&cfg).await.expect("connect db for migration");
            migration::Migrator::up(&db, None).await.expect("migrate up");
            drop(db);
        })
        .await;

    // Return a fresh connection for the current test's runtime
    let db = connect_with_config(&test_db_config()).await?;
    Ok(db)
}
