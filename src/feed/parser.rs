use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::feed::FeedItem;

const OK_200: u16 = 200;

#[derive(Debug, Deserialize)]
struct Root {
    items: Vec<RemoteFeedItem>,
}

/// Item as it appears on the wire; `image` becomes `FeedItem::url`.
#[derive(Debug, Deserialize)]
struct RemoteFeedItem {
    id: Uuid,
    description: Option<String>,
    location: Option<String>,
    image: Url,
}

impl From<RemoteFeedItem> for FeedItem {
    fn from(item: RemoteFeedItem) -> Self {
        Self {
            id: item.id,
            description: item.description,
            location: item.location,
            url: item.image,
        }
    }
}

/// Decodes the body of a feed endpoint response.
pub struct FeedItemsMapper;

impl FeedItemsMapper {
    pub fn map(body: &[u8], status: u16) -> Result<Vec<FeedItem>> {
        if status != OK_200 {
            return Err(Error::InvalidData(format!(
                "Unexpected HTTP status {}",
                status
            )));
        }

        let root: Root = serde_json::from_slice(body)
            .map_err(|e| Error::InvalidData(format!("Malformed feed payload: {}", e)))?;

        Ok(root.items.into_iter().map(FeedItem::from).collect())
    }
}
