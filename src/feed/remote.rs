use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::error::Result;
use crate::feed::fetcher::HttpClient;
use crate::feed::parser::FeedItemsMapper;
use crate::feed::{FeedItem, FeedLoader};

/// Loads the feed from a single HTTP endpoint.
pub struct RemoteFeedLoader<C> {
    url: Url,
    client: C,
}

impl<C: HttpClient> RemoteFeedLoader<C> {
    pub fn new(url: Url, client: C) -> Self {
        Self { url, client }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl<C: HttpClient> FeedLoader for RemoteFeedLoader<C> {
    async fn load(&self) -> Result<Vec<FeedItem>> {
        let response = self.client.get(&self.url).await?;

        match FeedItemsMapper::map(&response.body, response.status) {
            Ok(items) => {
                debug!("Loaded {} items from {}", items.len(), self.url);
                Ok(items)
            }
            Err(e) => {
                warn!("Rejected response from {}: {}", self.url, e);
                Err(e)
            }
        }
    }
}
