#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use configs::DatabaseConfig;
use models::db::connect_with_config;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> DatabaseConfig {
    let _ = dotenvy::dotenv();
    let mut cfg = DatabaseConfig::from_env();
    if cfg.url.trim().is_empty() {
        cfg.url = models::db::DATABASE_URL.clone();
    }
    cfg.min_connections = 1;
    cfg.connect_timeout_secs = 3;
    cfg.acquire_timeout_secs = 10;
    cfg
}

/// Migrated connection, or an error when no database is reachable.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    // Run migrations exactly once, with a throwaway connection
    let migrated = *MIGRATED
        .get_or_init(|| async {
            let Ok(db) = connect_with_config(&test_config()).await else { return false };
            let ok = migration::Migrator::up(&db, None).await.is_ok();
            drop(db);
            ok
        })
        .await;
    if !migrated {
        anyhow::bail!("database unavailable or migrations failed");
    }

    // Return a fresh connection for the current test's runtime
    let db = connect_with_config(&test_config()).await?;
    Ok(db)
}

/// Unique code fragment for rows created by tests.
pub fn unique(prefix: &str) -> String {
    format!("{prefix}{}", &uuid::Uuid::new_v4().simple().to_string()[..8]).to_uppercase()
}

/// Migrated connection for the enclosing test, which returns early when
/// `SKIP_DB_TESTS` is set or no database is reachable.
macro_rules! db_or_skip {
    () => {{
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        match $crate::test_support::get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: {e}");
                return Ok(());
            }
        }
    }};
}
pub(crate) use db_or_skip;
