//! Read-only access to persisted entries and one-off pages.
//!
//! [`EntryStore`] is the contract the rest of the crate is written against;
//! [`SqliteStore`] implements it over a SQLite database whose layout is given
//! by [`SCHEMA`]. In the `next` and `previous` columns both `0` and `NULL` mean
//! "no link" and are decoded to `None` here, so nothing past this module sees
//! the numeric sentinel.

use crate::entry::{Entry, EntryId, HistoryRecord, OneOff};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// The tables this crate reads.
pub const SCHEMA: &str = include_str!("../schema.sql");

/// Read-only queries over entries and one-offs. Implementations must be safe
/// to share between concurrent requests.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Returns the entry with the given id, or the most recently published
    /// entry when `id` is `None`.
    async fn get_entry(&self, id: Option<EntryId>) -> Result<Entry>;

    async fn get_one_off(&self, uid: &str) -> Result<OneOff>;

    /// Returns every entry's id and title, most recent first.
    async fn get_history(&self) -> Result<Vec<HistoryRecord>>;

    /// Returns the `limit` most recent entries, most recent first.
    async fn get_recent(&self, limit: usize) -> Result<Vec<Entry>>;

    /// Succeeds if the store can currently answer queries.
    async fn health_check(&self) -> Result<()>;
}

const ENTRY_COLUMNS: &str = "timestamp, title, next, previous, paragraph, image";

#[derive(sqlx::FromRow)]
struct EntryRow {
    timestamp: i64,
    title: String,
    next: Option<i64>,
    previous: Option<i64>,
    paragraph: Option<String>,
    image: Option<String>,
}

impl From<EntryRow> for Entry {
    fn from(row: EntryRow) -> Entry {
        Entry {
            id: row.timestamp,
            title: row.title,
            next: link(row.next),
            previous: link(row.previous),
            content: row.paragraph.unwrap_or_default(),
            image: row.image.unwrap_or_default(),
        }
    }
}

fn link(column: Option<i64>) -> Option<EntryId> {
    column.filter(|&id| id != 0)
}

#[derive(sqlx::FromRow)]
struct OneOffRow {
    uid: String,
    paragraph: Option<String>,
    image: Option<String>,
}

impl From<OneOffRow> for OneOff {
    fn from(row: OneOffRow) -> OneOff {
        OneOff {
            uid: row.uid,
            content: row.paragraph.unwrap_or_default(),
            image: row.image.unwrap_or_default(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    timestamp: i64,
    title: String,
}

/// An [`EntryStore`] backed by a SQLite connection pool.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the database at `path` read-only.
    pub async fn connect(path: &Path, max_connections: u32) -> Result<SqliteStore> {
        let options = SqliteConnectOptions::new().filename(path).read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|source| Error::Unavailable {
                query: "connect",
                key: path.display().to_string(),
                source,
            })?;
        Ok(SqliteStore { pool })
    }

    /// Wraps an already open pool.
    pub fn from_pool(pool: SqlitePool) -> SqliteStore {
        SqliteStore { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl EntryStore for SqliteStore {
    async fn get_entry(&self, id: Option<EntryId>) -> Result<Entry> {
        let row = match id {
            Some(id) => {
                let query = format!("SELECT {ENTRY_COLUMNS} FROM entry WHERE timestamp = ?");
                sqlx::query_as::<_, EntryRow>(&query)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(unavailable("entry", id))?
            }
            None => {
                let query =
                    format!("SELECT {ENTRY_COLUMNS} FROM entry ORDER BY timestamp DESC LIMIT 1");
                sqlx::query_as::<_, EntryRow>(&query)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(unavailable("latest entry", "-"))?
            }
        };

        row.map(Entry::from).ok_or_else(|| Error::NotFound {
            kind: "entry",
            key: match id {
                Some(id) => id.to_string(),
                None => "latest".to_owned(),
            },
        })
    }

    async fn get_one_off(&self, uid: &str) -> Result<OneOff> {
        sqlx::query_as::<_, OneOffRow>("SELECT uid, paragraph, image FROM oneoff WHERE uid = ?")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable("oneoff", uid))?
            .map(OneOff::from)
            .ok_or_else(|| Error::NotFound {
                kind: "oneoff",
                key: uid.to_owned(),
            })
    }

    async fn get_history(&self) -> Result<Vec<HistoryRecord>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT timestamp, title FROM entry ORDER BY timestamp DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable("history", "-"))?;

        Ok(rows
            .into_iter()
            .map(|row| HistoryRecord {
                id: row.timestamp,
                title: row.title,
            })
            .collect())
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<Entry>> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM entry ORDER BY timestamp DESC LIMIT ?");
        let rows = sqlx::query_as::<_, EntryRow>(&query)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable("recent entries", limit))?;
        Ok(rows.into_iter().map(Entry::from).collect())
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(unavailable("health check", "-"))?;
        Ok(())
    }
}

/// Builds a `map_err` adapter that records which query failed for which key.
fn unavailable(
    query: &'static str,
    key: impl ToString,
) -> impl FnOnce(sqlx::Error) -> Error {
    move |source| Error::Unavailable {
        query,
        key: key.to_string(),
        source,
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed store lookup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No entry or one-off matches the requested key.
    #[error("{kind} `{key}` not found")]
    NotFound { kind: &'static str, key: String },

    /// The database could not be reached or the query failed.
    #[error("{query} query for `{key}` failed: {source}")]
    Unavailable {
        query: &'static str,
        key: String,
        #[source]
        source: sqlx::Error,
    },
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
