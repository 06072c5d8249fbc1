//! Live camera feed URLs.

use chrono::{DateTime, Utc};

/// Feed URL with a cache-busting timestamp so hosts reconnect to a fresh stream.
pub fn live_feed_url(base: &str) -> String {
    live_feed_url_at(base, Utc::now())
}

/// Feed URL stamped with `at` in milliseconds since the epoch.
pub fn live_feed_url_at(base: &str, at: DateTime<Utc>) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}t={}", at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn appends_millisecond_timestamp() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            live_feed_url_at("http://localhost:5000/api/video-feed", at),
            "http://localhost:5000/api/video-feed?t=1700000000123"
        );
        assert_eq!(
            live_feed_url_at("http://cam/feed?fps=10", at),
            "http://cam/feed?fps=10&t=1700000000123"
        );
    }

    #[test]
    fn consecutive_urls_differ_over_time() {
        let a = live_feed_url_at("feed", Utc.timestamp_millis_opt(1).unwrap());
        let b = live_feed_url_at("feed", Utc.timestamp_millis_opt(2).unwrap());
        assert_ne!(a, b);
        assert!(live_feed_url("feed").starts_with("feed?t="));
    }
}
