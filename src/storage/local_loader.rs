use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::feed::{FeedItem, FeedLoader};
use crate::storage::model::LocalFeedItem;
use crate::storage::policy::FeedCachePolicy;
use crate::storage::traits::{FeedCache, FeedStore};

/// Source of "now" for cache decisions.
pub type CurrentDate = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Cache policy on top of a [`FeedStore`]: what to save, what to serve and
/// when to throw a record away.
///
/// Futures returned by its methods borrow the loader, so no result can be
/// delivered once the loader itself has been dropped.
pub struct LocalFeedLoader<S> {
    store: S,
    current_date: CurrentDate,
}

impl<S: FeedStore> LocalFeedLoader<S> {
    pub fn new<F>(store: S, current_date: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            store,
            current_date: Arc::new(current_date),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replaces the cached feed with `feed`, stamped with the current date.
    ///
    /// Deletion runs first; if it fails nothing is inserted. If insertion
    /// fails after a successful deletion the cache stays empty.
    pub async fn save(&self, feed: &[FeedItem]) -> Result<()> {
        self.store.delete_cached_feed().await?;

        let local_feed: Vec<LocalFeedItem> =
            feed.iter().cloned().map(LocalFeedItem::from).collect();
        let count = local_feed.len();

        self.store
            .insert(local_feed, (self.current_date)())
            .await?;

        info!("Cached {} feed items", count);
        Ok(())
    }

    /// Serves the cached feed if it is still fresh, otherwise nothing.
    ///
    /// Never deletes, even when the store fails to read. Any store failure is
    /// reported as `Error::Retrieval`.
    pub async fn load(&self) -> Result<Vec<FeedItem>> {
        let cache = self.store.retrieve().await.map_err(|e| match e {
            Error::Retrieval(_) => e,
            other => Error::Retrieval(other.to_string()),
        })?;

        match cache {
            Some(cache) if FeedCachePolicy::validate(cache.timestamp, (self.current_date)()) => {
                debug!("Serving {} cached items", cache.items.len());
                Ok(cache.into_feed())
            }
            Some(cache) => {
                debug!("Cached feed from {} has expired", cache.timestamp);
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }

    /// Deletes the cached feed if it cannot be read or has expired.
    pub async fn validate_cache(&self) {
        let reason = match self.store.retrieve().await {
            Err(e) => format!("unreadable cache: {}", e),
            Ok(Some(cache)) if FeedCachePolicy::is_expired(cache.timestamp, (self.current_date)()) => {
                format!("cache from {} has expired", cache.timestamp)
            }
            Ok(_) => return,
        };

        info!("Invalidating cached feed ({})", reason);
        if let Err(e) = self.store.delete_cached_feed().await {
            warn!("Failed to invalidate cached feed: {}", e);
        }
    }
}

#[async_trait]
impl<S: FeedStore> FeedLoader for LocalFeedLoader<S> {
    async fn load(&self) -> Result<Vec<FeedItem>> {
        LocalFeedLoader::load(self).await
    }
}

#[async_trait]
impl<S: FeedStore> FeedCache for LocalFeedLoader<S> {
    async fn save(&self, feed: &[FeedItem]) -> Result<()> {
        LocalFeedLoader::save(self, feed).await
    }
}
