//! SQLite persistence for inbound message events.
//!
//! The receive loop never touches this crate directly; handlers registered
//! on the event router project events into rows and insert them here.

pub mod record;

pub use record::MessageRecord;

use {
    anyhow::Context,
    sqlx::{Row, sqlite::SqlitePool},
    tracing::{debug, info},
};

/// Handle to the `message_record` table.
pub struct MessageStore {
    pool: SqlitePool,
}

impl MessageStore {
    /// Open the database and make sure the schema exists.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePool::connect(url)
            .await
            .with_context(|| format!("failed to open message store at {url}"))?;
        info!(url, "connected to message store");
        let store = Self::new(pool);
        store.init().await?;
        Ok(store)
    }

    /// Wrap an existing pool (tests, shared pools).
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `message_record` schema if it does not exist. Idempotent.
    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS message_record (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                message_id TEXT NOT NULL,
                sender_id TEXT NOT NULL,
                sender_name TEXT NOT NULL,
                send_time TEXT NOT NULL,
                group_id TEXT,
                group_name TEXT,
                content TEXT NOT NULL,
                at_target_list TEXT
            )",
        )
        .execute(&self.pool)
        .await
        .context("create message_record table")?;
        Ok(())
    }

    /// Insert one record.
    pub async fn insert(&self, record: &MessageRecord) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO message_record
                (message_id, sender_id, sender_name, send_time,
                 group_id, group_name, content, at_target_list)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.message_id)
        .bind(&record.sender_id)
        .bind(&record.sender_name)
        .bind(record.send_time)
        .bind(&record.group_id)
        .bind(&record.group_name)
        .bind(&record.content)
        .bind(&record.at_target_list)
        .execute(&self.pool)
        .await
        .with_context(|| format!("insert message record {}", record.message_id))?;

        debug!(message_id = %record.message_id, "message record persisted");
        Ok(())
    }

    /// Number of stored records.
    pub async fn count(&self) -> anyhow::Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM message_record")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}
