//! In-memory caching for short-link resolution.
//! Uses moka for TTL-based caching with LRU eviction.

use crate::app_config;
use moka::sync::Cache;
use once_cell::sync::Lazy;
use std::time::Duration;

/// Token to target URL. Mappings never change once written, so entries only
/// expire to bound memory.
static SHORT_LINK_CACHE: Lazy<Cache<String, String>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(
            app_config::short_link().cache_ttl_seconds,
        ))
        .max_capacity(10_000)
        .build()
});

pub fn get_short_link(token: &str) -> Option<String> {
    SHORT_LINK_CACHE.get(token)
}

pub fn put_short_link(token: &str, url: &str) {
    SHORT_LINK_CACHE.insert(token.to_owned(), url.to_owned());
}
