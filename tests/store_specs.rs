//! Behaviour every `FeedStore` backend must share.
//!
//! Each backend's test file includes this module and runs every assertion
//! against its own store. Failure-path checks are split out because each
//! backend provokes failures differently.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use feed_cache::storage::{CachedFeed, FeedStore, LocalFeedItem};
use feed_cache::{Error, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use url::Url;
use uuid::Uuid;

pub fn unique_item(description: Option<&str>, location: Option<&str>) -> LocalFeedItem {
    let id = Uuid::new_v4();
    LocalFeedItem {
        id,
        description: description.map(str::to_string),
        location: location.map(str::to_string),
        url: Url::parse(&format!("https://example.com/images/{}.png", id)).unwrap(),
    }
}

/// Items covering every combination of present and missing optionals.
pub fn unique_feed() -> Vec<LocalFeedItem> {
    vec![
        unique_item(Some("a description"), Some("a location")),
        unique_item(None, Some("another location")),
        unique_item(Some("another description"), None),
        unique_item(None, None),
    ]
}

pub async fn insert<S: FeedStore + ?Sized>(
    sut: &S,
    feed: Vec<LocalFeedItem>,
    timestamp: DateTime<Utc>,
) -> Result<()> {
    sut.insert(feed, timestamp).await
}

pub async fn delete_cache<S: FeedStore + ?Sized>(sut: &S) -> Result<()> {
    sut.delete_cached_feed().await
}

pub async fn expect_to_retrieve<S: FeedStore + ?Sized>(sut: &S, expected: Option<CachedFeed>) {
    match sut.retrieve().await {
        Ok(retrieved) => assert_eq!(retrieved, expected),
        Err(e) => panic!("Expected to retrieve {:?}, got error {} instead", expected, e),
    }
}

pub async fn expect_to_retrieve_twice<S: FeedStore + ?Sized>(sut: &S, expected: Option<CachedFeed>) {
    expect_to_retrieve(sut, expected.clone()).await;
    expect_to_retrieve(sut, expected).await;
}

pub async fn expect_retrieval_failure<S: FeedStore + ?Sized>(sut: &S) {
    match sut.retrieve().await {
        Err(Error::Retrieval(_)) => {}
        other => panic!("Expected a retrieval error, got {:?} instead", other),
    }
}

// -- retrieve --

pub async fn assert_that_retrieve_delivers_empty_on_empty_cache<S: FeedStore + ?Sized>(sut: &S) {
    expect_to_retrieve(sut, None).await;
}

pub async fn assert_that_retrieve_has_no_side_effects_on_empty_cache<S: FeedStore + ?Sized>(sut: &S) {
    expect_to_retrieve_twice(sut, None).await;
}

pub async fn assert_that_retrieve_delivers_found_values_on_non_empty_cache<S: FeedStore + ?Sized>(
    sut: &S,
) {
    let feed = unique_feed();
    let timestamp = Utc::now();

    insert(sut, feed.clone(), timestamp).await.unwrap();

    expect_to_retrieve(sut, Some(CachedFeed::new(feed, timestamp))).await;
}

pub async fn assert_that_retrieve_has_no_side_effects_on_non_empty_cache<S: FeedStore + ?Sized>(
    sut: &S,
) {
    let feed = unique_feed();
    let timestamp = Utc::now();

    insert(sut, feed.clone(), timestamp).await.unwrap();

    expect_to_retrieve_twice(sut, Some(CachedFeed::new(feed, timestamp))).await;
}

pub async fn assert_that_retrieve_delivers_failure_on_retrieval_error<S: FeedStore + ?Sized>(
    sut: &S,
) {
    expect_retrieval_failure(sut).await;
}

pub async fn assert_that_retrieve_has_no_side_effects_on_failure<S: FeedStore + ?Sized>(sut: &S) {
    expect_retrieval_failure(sut).await;
    expect_retrieval_failure(sut).await;
}

/// Timestamps outside the four-digit year range, with sub-second precision.
pub fn extreme_timestamps() -> Vec<DateTime<Utc>> {
    vec![
        Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(-1, 12, 31, 23, 59, 59).unwrap(),
        Utc.with_ymd_and_hms(0, 1, 1, 0, 0, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap(),
    ]
}

pub async fn assert_that_retrieve_delivers_found_values_for_extreme_timestamps<
    S: FeedStore + ?Sized,
>(
    sut: &S,
) {
    for timestamp in extreme_timestamps() {
        let feed = unique_feed();

        insert(sut, feed.clone(), timestamp).await.unwrap();

        expect_to_retrieve(sut, Some(CachedFeed::new(feed, timestamp))).await;
    }
}

// -- insert --

pub async fn assert_that_insert_delivers_no_error_on_empty_cache<S: FeedStore + ?Sized>(sut: &S) {
    let result = insert(sut, unique_feed(), Utc::now()).await;
    assert!(result.is_ok(), "Expected to insert successfully, got {:?}", result);
}

pub async fn assert_that_insert_delivers_no_error_on_non_empty_cache<S: FeedStore + ?Sized>(
    sut: &S,
) {
    insert(sut, unique_feed(), Utc::now()).await.unwrap();

    let result = insert(sut, unique_feed(), Utc::now()).await;
    assert!(result.is_ok(), "Expected to override successfully, got {:?}", result);
}

pub async fn assert_that_insert_overrides_previously_inserted_cache_values<S: FeedStore + ?Sized>(
    sut: &S,
) {
    insert(sut, unique_feed(), Utc::now() - Duration::hours(1)).await.unwrap();

    let latest_feed = vec![unique_item(Some("only"), None)];
    let latest_timestamp = Utc::now();
    insert(sut, latest_feed.clone(), latest_timestamp).await.unwrap();

    expect_to_retrieve(sut, Some(CachedFeed::new(latest_feed, latest_timestamp))).await;
}

pub async fn assert_that_insert_accepts_empty_feed<S: FeedStore + ?Sized>(sut: &S) {
    let timestamp = Utc::now();

    insert(sut, Vec::new(), timestamp).await.unwrap();

    expect_to_retrieve(sut, Some(CachedFeed::new(Vec::new(), timestamp))).await;
}

// -- delete --

pub async fn assert_that_delete_delivers_no_error_on_empty_cache<S: FeedStore + ?Sized>(sut: &S) {
    let result = delete_cache(sut).await;
    assert!(result.is_ok(), "Expected empty cache deletion to succeed, got {:?}", result);
}

pub async fn assert_that_delete_has_no_side_effects_on_empty_cache<S: FeedStore + ?Sized>(sut: &S) {
    delete_cache(sut).await.unwrap();

    expect_to_retrieve(sut, None).await;
}

pub async fn assert_that_delete_delivers_no_error_on_non_empty_cache<S: FeedStore + ?Sized>(
    sut: &S,
) {
    insert(sut, unique_feed(), Utc::now()).await.unwrap();

    let result = delete_cache(sut).await;
    assert!(result.is_ok(), "Expected non-empty cache deletion to succeed, got {:?}", result);
}

pub async fn assert_that_delete_empties_previously_inserted_cache<S: FeedStore + ?Sized>(sut: &S) {
    insert(sut, unique_feed(), Utc::now()).await.unwrap();

    delete_cache(sut).await.unwrap();

    expect_to_retrieve(sut, None).await;
}

// -- ordering --

/// Operations are issued without awaiting; each retrieval must observe
/// exactly the effects of the calls issued before it, and completions must
/// arrive in issue order.
pub async fn assert_that_side_effects_run_serially<S: FeedStore + ?Sized>(sut: &S) {
    let first_feed = unique_feed();
    let first_timestamp = Utc::now() - Duration::minutes(5);
    let last_feed = unique_feed();
    let last_timestamp = Utc::now();

    let first_insert = sut.insert(first_feed.clone(), first_timestamp);
    let after_first_insert = sut.retrieve();
    let deletion = sut.delete_cached_feed();
    let after_deletion = sut.retrieve();
    let last_insert = sut.insert(last_feed.clone(), last_timestamp);
    let after_last_insert = sut.retrieve();

    // Awaited in reverse: the order is fixed when the calls are made.
    assert_eq!(
        after_last_insert.await.unwrap(),
        Some(CachedFeed::new(last_feed, last_timestamp))
    );
    last_insert.await.unwrap();
    assert_eq!(after_deletion.await.unwrap(), None);
    deletion.await.unwrap();
    assert_eq!(
        after_first_insert.await.unwrap(),
        Some(CachedFeed::new(first_feed, first_timestamp))
    );
    first_insert.await.unwrap();

    let mut completions = FuturesUnordered::new();
    completions.push(sut.insert(unique_feed(), Utc::now()).map(|r| ("insert", r)).boxed());
    completions.push(sut.delete_cached_feed().map(|r| ("delete", r)).boxed());
    completions.push(sut.insert(unique_feed(), Utc::now()).map(|r| ("insert again", r)).boxed());

    let mut completed_in_order = Vec::new();
    while let Some((operation, result)) = completions.next().await {
        result.unwrap();
        completed_in_order.push(operation);
    }

    assert_eq!(completed_in_order, vec!["insert", "delete", "insert again"]);
}
