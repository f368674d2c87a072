use chrono::{DateTime, Duration, Utc};

/// Days a cached feed stays fresh.
pub const MAX_CACHE_AGE_IN_DAYS: i64 = 7;

/// Age-based invalidation rule for cached feeds.
///
/// A record is fresh while `now < timestamp + max age`; a record exactly
/// `MAX_CACHE_AGE_IN_DAYS` old is already expired.
pub struct FeedCachePolicy;

impl FeedCachePolicy {
    pub fn max_cache_age() -> Duration {
        Duration::days(MAX_CACHE_AGE_IN_DAYS)
    }

    pub fn validate(timestamp: DateTime<Utc>, against: DateTime<Utc>) -> bool {
        match timestamp.checked_add_signed(Self::max_cache_age()) {
            Some(max_age) => against < max_age,
            None => false,
        }
    }

    pub fn is_expired(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        !Self::validate(timestamp, now)
    }
}
