pub mod certificates;
pub mod models;
pub mod reviews;
pub mod views;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use std::{str::FromStr, time::Duration};

/// Count the view counter starts from on a fresh database.
pub const VIEW_COUNT_SEED: i64 = 1234;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub busy_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://portfolio.db".to_string()),
            max_connections: std::env::var("DB_POOL_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            busy_timeout_secs: std::env::var("DB_BUSY_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        }
    }
}

impl DbConfig {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Handle to the embedded database. Cheap to clone; every clone shares the pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(config: &DbConfig) -> Result<Self, sqlx::Error> {
        tracing::info!("Opening database at {}", config.url);

        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_with(options)
            .await?;

        sqlx::query("SELECT 1").fetch_one(&pool).await?;

        tracing::info!("Database connection pool initialized successfully");
        Ok(Self { pool })
    }

    /// Opens the store and brings the schema up to date.
    pub async fn open(config: &DbConfig) -> Result<Self, sqlx::Error> {
        let store = Self::connect(config).await?;
        store.run_migrations().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<Duration, sqlx::Error> {
        let start = std::time::Instant::now();
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(start.elapsed())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }

    /// Idempotent: safe to run on every startup against the same file.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS certificates (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                filename TEXT NOT NULL,
                filepath TEXT NOT NULL,
                upload_date DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_certificates_upload_date ON certificates(upload_date DESC)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                rating INTEGER NOT NULL CHECK (rating >= 1 AND rating <= 5),
                comment TEXT NOT NULL,
                date DATE DEFAULT (date('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_date ON reviews(date DESC)")
            .execute(&self.pool)
            .await?;

        // One logical counter: the CHECK pins the only legal id to 1.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS views (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                count INTEGER NOT NULL DEFAULT 1234,
                last_updated DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("INSERT OR IGNORE INTO views (id, count) VALUES (1, ?)")
            .bind(VIEW_COUNT_SEED)
            .execute(&self.pool)
            .await?;

        tracing::info!("Database migrations completed successfully");

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// File-backed store in a temp dir; in-memory SQLite would give every
    /// pooled connection its own database.
    pub(crate) async fn temp_store() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        let store = Store::open(&DbConfig::for_url(url)).await.unwrap();
        (store, dir)
    }

    #[test]
    fn test_db_config_default_uses_env_or_fallback() {
        let config = DbConfig::default();
        assert!(config.max_connections >= 1);
        assert!(config.connect_timeout_secs >= 1);
        assert!(!config.url.is_empty());
    }

    #[tokio::test]
    async fn test_health_check_on_open_store() {
        let (store, _dir) = temp_store().await;
        assert!(store.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_migrations_twice_seed_exactly_one_counter_row() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("twice.db").display());
        let config = DbConfig::for_url(url);

        let first = Store::open(&config).await.unwrap();
        first.close().await;
        let second = Store::open(&config).await.unwrap();

        let rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM views")
            .fetch_one(second.pool())
            .await
            .unwrap();
        assert_eq!(rows.0, 1);
        assert_eq!(second.view_count().await.unwrap(), VIEW_COUNT_SEED);
    }

    #[tokio::test]
    async fn test_views_table_rejects_second_row() {
        let (store, _dir) = temp_store().await;
        let result = sqlx::query("INSERT INTO views (id, count) VALUES (2, 0)")
            .execute(store.pool())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_schema_rejects_out_of_range_rating() {
        let (store, _dir) = temp_store().await;
        let result = sqlx::query("INSERT INTO reviews (name, rating, comment) VALUES ('a', 6, 'b')")
            .execute(store.pool())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let (store, _dir) = temp_store().await;
        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
