use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::storage::model::{CachedFeed, LocalFeedItem};
use crate::storage::traits::{FeedStore, StoreFuture};
use crate::storage::worker::SerialQueue;

/// Keeps the whole cache as one JSON document at `path`.
///
/// Every insertion rewrites the document in full: it is serialized in memory,
/// written to a temporary file next to the target and renamed over it, so a
/// reader sees either the old document or the new one.
pub struct FileFeedStore {
    path: PathBuf,
    queue: SerialQueue<PathBuf>,
}

impl FileFeedStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let queue = SerialQueue::spawn("file-feed-store", path.clone())?;

        Ok(Self { path, queue })
    }

    /// Location of the cache document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedStore for FileFeedStore {
    fn retrieve(&self) -> StoreFuture<Option<CachedFeed>> {
        self.queue.submit(|path| read_cache(path))
    }

    fn insert(&self, feed: Vec<LocalFeedItem>, timestamp: DateTime<Utc>) -> StoreFuture<()> {
        self.queue
            .submit(move |path| write_cache(path, &CachedFeed::new(feed, timestamp)))
    }

    fn delete_cached_feed(&self) -> StoreFuture<()> {
        self.queue.submit(|path| remove_cache(path))
    }
}

fn read_cache(path: &Path) -> Result<Option<CachedFeed>> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("Cache file does not exist: {}", path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(Error::Retrieval(format!(
                "Failed to read cache file '{}': {}",
                path.display(),
                e
            )))
        }
    };

    let cache: CachedFeed = serde_json::from_slice(&content).map_err(|e| {
        Error::Retrieval(format!(
            "Failed to decode cache file '{}': {}",
            path.display(),
            e
        ))
    })?;

    tracing::debug!("Loaded {} cached items from {}", cache.items.len(), path.display());
    Ok(Some(cache))
}

fn write_cache(path: &Path, cache: &CachedFeed) -> Result<()> {
    let json_content = serde_json::to_vec_pretty(cache)
        .map_err(|e| Error::Insertion(format!("Failed to encode cache: {}", e)))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(dir).map_err(|e| {
        Error::Insertion(format!(
            "Failed to create cache directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    // Temp file in the same directory so the rename stays on one filesystem.
    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
        Error::Insertion(format!(
            "Failed to create temporary file in '{}': {}",
            dir.display(),
            e
        ))
    })?;

    temp_file
        .write_all(&json_content)
        .and_then(|_| temp_file.as_file().sync_all())
        .map_err(|e| {
            Error::Insertion(format!(
                "Failed to write cache to '{}': {}",
                temp_file.path().display(),
                e
            ))
        })?;

    temp_file.persist(path).map_err(|e| {
        Error::Insertion(format!(
            "Failed to move cache into place at '{}': {}",
            path.display(),
            e.error
        ))
    })?;

    tracing::debug!("Saved {} cached items to {}", cache.items.len(), path.display());
    Ok(())
}

fn remove_cache(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("Removed cache file {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Deletion(format!(
            "Failed to remove cache file '{}': {}",
            path.display(),
            e
        ))),
    }
}
