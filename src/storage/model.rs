use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::feed::FeedItem;

/// Storage-side twin of [`FeedItem`].
///
/// Kept separate so the persisted shape can evolve without touching the
/// domain model. Absent optionals are omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFeedItem {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub url: Url,
}

impl From<FeedItem> for LocalFeedItem {
    fn from(item: FeedItem) -> Self {
        Self {
            id: item.id,
            description: item.description,
            location: item.location,
            url: item.url,
        }
    }
}

impl From<LocalFeedItem> for FeedItem {
    fn from(item: LocalFeedItem) -> Self {
        Self {
            id: item.id,
            description: item.description,
            location: item.location,
            url: item.url,
        }
    }
}

/// The single record a store holds: the items in order plus when they were written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFeed {
    pub items: Vec<LocalFeedItem>,
    pub timestamp: DateTime<Utc>,
}

impl CachedFeed {
    pub fn new(items: Vec<LocalFeedItem>, timestamp: DateTime<Utc>) -> Self {
        Self { items, timestamp }
    }

    pub fn into_feed(self) -> Vec<FeedItem> {
        self.items.into_iter().map(FeedItem::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialization_omits_missing_optionals() {
        let item = LocalFeedItem {
            id: Uuid::nil(),
            description: None,
            location: Some("Porto".to_string()),
            url: Url::parse("https://example.com/a.png").unwrap(),
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "location": "Porto",
                "url": "https://example.com/a.png"
            })
        );
    }

    #[test]
    fn test_into_feed_preserves_order_and_fields() {
        let items: Vec<LocalFeedItem> = (0..3)
            .map(|i| LocalFeedItem {
                id: Uuid::new_v4(),
                description: Some(format!("description {}", i)),
                location: None,
                url: Url::parse(&format!("https://example.com/{}", i)).unwrap(),
            })
            .collect();
        let cache = CachedFeed::new(items.clone(), Utc::now());

        let feed = cache.into_feed();

        assert_eq!(feed.len(), 3);
        for (local, domain) in items.into_iter().zip(feed) {
            assert_eq!(LocalFeedItem::from(domain), local);
        }
    }
}
