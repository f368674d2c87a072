use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

use crate::error::Result;
use crate::feed::FeedItem;
use crate::storage::model::{CachedFeed, LocalFeedItem};

/// Future returned by every [`FeedStore`] operation.
pub type StoreFuture<T> = BoxFuture<'static, Result<T>>;

/// Persistence contract for the local feed cache.
///
/// Implementations hold at most one [`CachedFeed`]. Operations are ordered by
/// the time the method is *called*, not by when the returned future is first
/// polled, so a caller may fire several operations and await them later.
pub trait FeedStore: Send + Sync {
    /// Reads the current record. `Ok(None)` means the store is empty.
    ///
    /// Has no side effects, even when it fails.
    fn retrieve(&self) -> StoreFuture<Option<CachedFeed>>;

    /// Replaces any existing record with `feed` written at `timestamp`.
    ///
    /// On failure no partially written record is observable.
    fn insert(&self, feed: Vec<LocalFeedItem>, timestamp: DateTime<Utc>) -> StoreFuture<()>;

    /// Removes the record. Succeeds when there is nothing to remove.
    ///
    /// On failure the previous record is left untouched.
    fn delete_cached_feed(&self) -> StoreFuture<()>;
}

impl<T: FeedStore + ?Sized> FeedStore for Arc<T> {
    fn retrieve(&self) -> StoreFuture<Option<CachedFeed>> {
        (**self).retrieve()
    }

    fn insert(&self, feed: Vec<LocalFeedItem>, timestamp: DateTime<Utc>) -> StoreFuture<()> {
        (**self).insert(feed, timestamp)
    }

    fn delete_cached_feed(&self) -> StoreFuture<()> {
        (**self).delete_cached_feed()
    }
}

impl<T: FeedStore + ?Sized> FeedStore for Box<T> {
    fn retrieve(&self) -> StoreFuture<Option<CachedFeed>> {
        (**self).retrieve()
    }

    fn insert(&self, feed: Vec<LocalFeedItem>, timestamp: DateTime<Utc>) -> StoreFuture<()> {
        (**self).insert(feed, timestamp)
    }

    fn delete_cached_feed(&self) -> StoreFuture<()> {
        (**self).delete_cached_feed()
    }
}

/// Write side of the cache, as seen by the code that refreshes it.
#[async_trait]
pub trait FeedCache: Send + Sync {
    async fn save(&self, feed: &[FeedItem]) -> Result<()>;
}
