//! Page-number pagination: page size resolution, page bounds and next/previous links.

use crate::config::PaginationConfig;
use crate::error::AppError;
use axum::http::{header, HeaderMap, Uri};
use url::Url;

const PAGE_PARAM: &str = "page";
const LAST_PAGE: &str = "last";

/// The slice of a result set selected by `page` and `page_size`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based.
    pub number: u64,
    pub size: u64,
    pub num_pages: u64,
}

impl PageWindow {
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.size
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// Requested size clamped to the configured maximum; missing, malformed or non-positive
/// values use the default.
pub fn resolve_page_size(raw: Option<&str>, config: PaginationConfig) -> u64 {
    let default = u64::from(config.page_size);
    match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(n) if n > 0 => (n as u64).min(u64::from(config.max_page_size)),
        _ => default,
    }
}

/// Page 1 of an empty result is valid; anything else out of range is `InvalidPage`.
pub fn resolve_page(raw: Option<&str>, count: u64, size: u64) -> Result<PageWindow, AppError> {
    let size = size.max(1);
    let num_pages = count.div_ceil(size).max(1);
    let number = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => 1,
        Some(LAST_PAGE) => num_pages,
        Some(s) => s.parse::<u64>().map_err(|_| AppError::InvalidPage)?,
    };
    if number < 1 || number > num_pages {
        return Err(AppError::InvalidPage);
    }
    Ok(PageWindow {
        number,
        size,
        num_pages,
    })
}

/// Absolute URL of the current request. Scheme honours `X-Forwarded-Proto`.
pub fn request_url(headers: &HeaderMap, uri: &Uri) -> Option<Url> {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .filter(|s| *s == "https" || *s == "http")
        .unwrap_or("http");
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    Url::parse(&format!("{}://{}{}", scheme, host, path)).ok()
}

/// (next, previous) links for `window`, preserving every other query parameter.
pub fn page_links(current: Option<&Url>, window: &PageWindow) -> (Option<String>, Option<String>) {
    let Some(current) = current else {
        return (None, None);
    };
    let next = window
        .has_next()
        .then(|| with_page(current, Some(window.number + 1)));
    let previous = window.has_previous().then(|| {
        if window.number == 2 {
            with_page(current, None)
        } else {
            with_page(current, Some(window.number - 1))
        }
    });
    (next, previous)
}

/// Replace (or drop, for `None`) the page parameter. Parameters are emitted sorted by key.
fn with_page(current: &Url, page: Option<u64>) -> String {
    let mut pairs: Vec<(String, String)> = current
        .query_pairs()
        .filter(|(k, _)| k != PAGE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if let Some(n) = page {
        pairs.push((PAGE_PARAM.to_string(), n.to_string()));
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut url = current.clone();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs.iter());
    }
    url.to_string()
}
