//! Append-only event log backed by embedded SQLite.
//!
//! One table, two access patterns: append a row, read the most recent row
//! for a subject. Rows are never updated or deleted, and "most recent" is
//! decided by insertion order, not by parsing timestamps.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};
use tracing::debug;

use shoplens_model::{EventKind, StoredEvent};

use crate::error::Result;

const CREATE_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain TEXT NOT NULL,
    event_type TEXT NOT NULL,
    recorded_at TEXT NOT NULL,
    payload TEXT
)
"#;

const CREATE_DOMAIN_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_events_domain ON events (domain, id)
"#;

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    domain: String,
    event_type: String,
    recorded_at: DateTime<Utc>,
    payload: Option<String>,
}

impl From<EventRow> for StoredEvent {
    fn from(row: EventRow) -> Self {
        StoredEvent {
            id: row.id,
            domain: row.domain,
            event_type: row.event_type,
            recorded_at: row.recorded_at,
            payload: row.payload,
        }
    }
}

/// Handle to the check log. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct EventStore {
    pool: SqlitePool,
}

impl fmt::Debug for EventStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStore")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

impl EventStore {
    /// Open (creating if needed) the database at `url`, e.g.
    /// `sqlite://shoplens.db`. WAL journaling keeps concurrent
    /// detector appends from blocking page reads.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// In-memory store for tests. A single pinned connection, since every
    /// `:memory:` connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.initialize_schema().await?;
        Ok(store)
    }

    /// Ensure the events table and its lookup index exist.
    pub async fn initialize_schema(&self) -> Result<()> {
        sqlx::query(CREATE_EVENTS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_DOMAIN_INDEX).execute(&self.pool).await?;
        debug!("events table ready");
        Ok(())
    }

    /// Append one event. `payload` is stored as JSON text.
    pub async fn append(
        &self,
        domain: &str,
        kind: EventKind,
        payload: Option<serde_json::Value>,
    ) -> Result<()> {
        let payload_text = match payload {
            Some(value) => Some(serde_json::to_string(&value)?),
            None => None,
        };
        sqlx::query(
            "INSERT INTO events (domain, event_type, recorded_at, payload) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(domain)
        .bind(kind.as_str())
        .bind(Utc::now())
        .bind(payload_text)
        .execute(&self.pool)
        .await?;
        debug!(domain, kind = %kind, "event recorded");
        Ok(())
    }

    /// Most recent event for a subject, or `None` for a never-seen one.
    pub async fn latest(&self, domain: &str) -> Result<Option<StoredEvent>> {
        let row = sqlx::query_as::<_, EventRow>(
            "SELECT id, domain, event_type, recorded_at, payload \
             FROM events WHERE domain = ?1 ORDER BY id DESC LIMIT 1",
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StoredEvent::from))
    }

    /// Full event history for a subject in insertion order.
    pub async fn history(&self, domain: &str) -> Result<Vec<StoredEvent>> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT id, domain, event_type, recorded_at, payload \
             FROM events WHERE domain = ?1 ORDER BY id ASC",
        )
        .bind(domain)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(StoredEvent::from).collect())
    }

    /// Total number of recorded events; used by the health endpoint as a
    /// liveness probe for the database.
    pub async fn count(&self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
