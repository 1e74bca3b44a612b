//! Limit/offset pagination envelope.

use crate::app_config;
use actix_web::HttpRequest;
use serde::{Deserialize, Serialize};
use url::Url;

/// Largest offset passed on to the database, which binds it as a signed
/// 64-bit integer.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// `?limit=&offset=` query parameters.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct LimitOffset {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl LimitOffset {
    /// Applies the configured default and cap.
    pub fn resolve(&self) -> (u64, u64) {
        let limits = app_config::limits();
        let limit = self
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(limits.page_size)
            .min(limits.max_page_size);
        (limit, self.offset.unwrap_or(0).min(MAX_OFFSET))
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(req: &HttpRequest, results: Vec<T>, count: u64, limit: u64, offset: u64) -> Self {
        let (next, previous) = match request_url(req) {
            Some(url) => page_links(&url, count, limit, offset),
            None => (None, None),
        };

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// Absolute URL of the current request, as seen by the client.
fn request_url(req: &HttpRequest) -> Option<Url> {
    let conn = req.connection_info();
    Url::parse(&format!("{}://{}{}", conn.scheme(), conn.host(), req.uri())).ok()
}

fn with_window(url: &Url, limit: u64, offset: Option<u64>) -> String {
    let mut url = url.clone();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "limit" && k != "offset")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair("limit", &limit.to_string());
        if let Some(offset) = offset {
            pairs.append_pair("offset", &offset.to_string());
        }
    }

    url.to_string()
}

/// Builds the `next` and `previous` links for a window.
///
/// The first page's link omits `offset`.
pub fn page_links(url: &Url, count: u64, limit: u64, offset: u64) -> (Option<String>, Option<String>) {
    let next = offset
        .checked_add(limit)
        .filter(|next| *next < count)
        .map(|next| with_window(url, limit, Some(next)));

    let previous = if offset == 0 {
        None
    } else if offset <= limit {
        Some(with_window(url, limit, None))
    } else {
        Some(with_window(url, limit, Some(offset - limit)))
    };

    (next, previous)
}
