//! SQLite-backed [`FeedStore`].
//!
//! Layout: one row in `feed_cache` (fixed id, RFC 3339 timestamp) owning the
//! ordered rows of `feed_cache_items`. Item order is kept in an explicit
//! `position` column. Every mutation runs in its own transaction.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::storage::model::{CachedFeed, LocalFeedItem};
use crate::storage::traits::{FeedStore, StoreFuture};
use crate::storage::worker::SerialQueue;

const CACHE_ROW_ID: i64 = 1;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS feed_cache (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        timestamp TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS feed_cache_items (
        cache_id INTEGER NOT NULL REFERENCES feed_cache(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        item_id TEXT NOT NULL,
        description TEXT,
        location TEXT,
        url TEXT NOT NULL,
        PRIMARY KEY (cache_id, position)
    );
"#;

pub struct SqliteFeedStore {
    queue: SerialQueue<Connection>,
}

impl SqliteFeedStore {
    /// Opens (creating if needed) the database at `path` and runs migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let connection = Connection::open(path.as_ref())?;
        Self::with_connection(connection, true)
    }

    /// Private in-memory database, gone when the store is dropped.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, true)
    }

    /// Opens an existing database without write access.
    ///
    /// Retrieval works as usual; insertion and deletion fail.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let connection = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::with_connection(connection, false)
    }

    fn with_connection(connection: Connection, migrate: bool) -> Result<Self> {
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
        if migrate {
            connection.execute_batch(SCHEMA)?;
        }

        let queue = SerialQueue::spawn("sqlite-feed-store", connection)?;
        Ok(Self { queue })
    }
}

impl FeedStore for SqliteFeedStore {
    fn retrieve(&self) -> StoreFuture<Option<CachedFeed>> {
        self.queue.submit(|connection| {
            let cache = read_cache(connection)?;
            tracing::debug!(
                "Retrieved {} cached items from sqlite",
                cache.as_ref().map_or(0, |c| c.items.len())
            );
            Ok(cache)
        })
    }

    fn insert(&self, feed: Vec<LocalFeedItem>, timestamp: DateTime<Utc>) -> StoreFuture<()> {
        self.queue.submit(move |connection| {
            write_cache(connection, &feed, timestamp).map_err(insertion_error)?;
            tracing::debug!("Inserted {} cached items into sqlite", feed.len());
            Ok(())
        })
    }

    fn delete_cached_feed(&self) -> StoreFuture<()> {
        self.queue
            .submit(|connection| remove_cache(connection).map_err(deletion_error))
    }
}

fn retrieval_error(e: rusqlite::Error) -> Error {
    Error::Retrieval(e.to_string())
}

fn insertion_error(e: rusqlite::Error) -> Error {
    Error::Insertion(e.to_string())
}

fn deletion_error(e: rusqlite::Error) -> Error {
    Error::Deletion(e.to_string())
}

struct ItemRow {
    item_id: String,
    description: Option<String>,
    location: Option<String>,
    url: String,
}

impl ItemRow {
    fn into_local(self) -> Result<LocalFeedItem> {
        let id = Uuid::parse_str(&self.item_id)
            .map_err(|e| Error::Retrieval(format!("Corrupt item id '{}': {}", self.item_id, e)))?;
        let url = Url::parse(&self.url)
            .map_err(|e| Error::Retrieval(format!("Corrupt item url '{}': {}", self.url, e)))?;

        Ok(LocalFeedItem {
            id,
            description: self.description,
            location: self.location,
            url,
        })
    }
}

fn read_cache(connection: &mut Connection) -> Result<Option<CachedFeed>> {
    let tx = connection.transaction().map_err(retrieval_error)?;

    let timestamp: Option<String> = tx
        .query_row(
            "SELECT timestamp FROM feed_cache WHERE id = ?1",
            params![CACHE_ROW_ID],
            |row| row.get(0),
        )
        .optional()
        .map_err(retrieval_error)?;

    let Some(timestamp) = timestamp else {
        return Ok(None);
    };

    // Years outside 0000-9999 are written with an explicit sign, which strict
    // RFC 3339 parsing rejects.
    let timestamp = timestamp
        .parse::<DateTime<Utc>>()
        .map_err(|e| Error::Retrieval(format!("Corrupt cache timestamp '{}': {}", timestamp, e)))?;

    let rows = {
        let mut stmt = tx
            .prepare(
                "SELECT item_id, description, location, url FROM feed_cache_items
                 WHERE cache_id = ?1 ORDER BY position",
            )
            .map_err(retrieval_error)?;

        let rows = stmt
            .query_map(params![CACHE_ROW_ID], |row| {
                Ok(ItemRow {
                    item_id: row.get(0)?,
                    description: row.get(1)?,
                    location: row.get(2)?,
                    url: row.get(3)?,
                })
            })
            .map_err(retrieval_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(retrieval_error)?;
        rows
    };

    tx.commit().map_err(retrieval_error)?;

    let items = rows
        .into_iter()
        .map(ItemRow::into_local)
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(CachedFeed::new(items, timestamp)))
}

fn write_cache(
    connection: &mut Connection,
    feed: &[LocalFeedItem],
    timestamp: DateTime<Utc>,
) -> rusqlite::Result<()> {
    let tx = connection.transaction()?;

    // Cascades to the item rows of the previous record.
    tx.execute("DELETE FROM feed_cache", [])?;
    tx.execute(
        "INSERT INTO feed_cache (id, timestamp) VALUES (?1, ?2)",
        params![
            CACHE_ROW_ID,
            timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
        ],
    )?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO feed_cache_items (cache_id, position, item_id, description, location, url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;

        for (position, item) in feed.iter().enumerate() {
            stmt.execute(params![
                CACHE_ROW_ID,
                position as i64,
                item.id.to_string(),
                item.description,
                item.location,
                item.url.as_str(),
            ])?;
        }
    }

    tx.commit()
}

fn remove_cache(connection: &mut Connection) -> rusqlite::Result<()> {
    let tx = connection.transaction()?;
    let removed = tx.execute("DELETE FROM feed_cache", [])?;
    tx.commit()?;

    if removed > 0 {
        tracing::debug!("Removed cached feed from sqlite");
    }
    Ok(())
}
