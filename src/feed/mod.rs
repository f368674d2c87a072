pub mod fetcher;
pub mod parser;
pub mod remote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::Result;

pub use fetcher::{HttpClient, HttpResponse, ReqwestHttpClient};
pub use remote::RemoteFeedLoader;

/// A single image in the feed, as the rest of the application sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Url,
}

impl FeedItem {
    pub fn new(id: Uuid, url: Url) -> Self {
        Self {
            id,
            description: None,
            location: None,
            url,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// One-line summary used by the CLI listing.
    pub fn summary(&self) -> String {
        let mut text = format!("{} {}", self.id, self.url);

        if let Some(description) = &self.description {
            text.push_str(&format!(" | {}", description));
        }

        if let Some(location) = &self.location {
            text.push_str(&format!(" @ {}", location));
        }

        text
    }
}

/// Anything that can produce the current list of feed items.
#[async_trait]
pub trait FeedLoader: Send + Sync {
    async fn load(&self) -> Result<Vec<FeedItem>>;
}
