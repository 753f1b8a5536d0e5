use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::sync::Arc;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS guest_bookmarks (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL,
        ref_id INTEGER NOT NULL,
        summary TEXT,
        url TEXT,
        created_at INTEGER NOT NULL,
        UNIQUE(kind, ref_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS guest_last_reads (
        kind TEXT PRIMARY KEY,
        surah_id INTEGER,
        ayah_number INTEGER,
        dua_id INTEGER,
        summary TEXT,
        url TEXT,
        updated_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS surah_index (
        number INTEGER PRIMARY KEY,
        data TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS surah_details (
        number INTEGER PRIMARY KEY,
        data TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS duas (
        id INTEGER PRIMARY KEY,
        data TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dua_categories (
        id INTEGER PRIMARY KEY,
        data TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cache_metadata (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
];

#[derive(Clone)]
pub struct ConnectionPool {
    pool: Arc<SqlitePool>,
}

impl ConnectionPool {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// In-memory database on a single shared connection, for tests.
    pub async fn from_memory() -> Result<Self, sqlx::Error> {
        Self::new("sqlite::memory:?cache=shared", 1).await
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the guest-record and content-mirror tables when missing.
    pub async fn initialize_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(self.pool.as_ref()).await?;
        }
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
