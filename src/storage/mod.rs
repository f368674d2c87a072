pub mod file_store;
pub mod local_loader;
pub mod model;
pub mod policy;
pub mod sqlite_store;
pub mod traits;
pub mod worker;

pub use file_store::FileFeedStore;
pub use local_loader::{CurrentDate, LocalFeedLoader};
pub use model::{CachedFeed, LocalFeedItem};
pub use policy::{FeedCachePolicy, MAX_CACHE_AGE_IN_DAYS};
pub use sqlite_store::SqliteFeedStore;
pub use traits::{FeedCache, FeedStore, StoreFuture};
pub use worker::SerialQueue;
