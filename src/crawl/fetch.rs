// src/crawl/fetch.rs
// =============================================================================
// The network boundary of the crawler.
//
// fetch(uri) answers one of three ways:
// - Ok(status_ok = true)   the page exists, markup holds its HTML
// - Ok(status_ok = false)  the server answered with a non-2xx status; the page
//                          simply contributes nothing
// - Err(Fetch)             transport failure (DNS, TLS, timeout, ...); the
//                          page is skipped and retried on the next run
//
// The Fetch trait lets the pipeline run against a fake in tests.
//
// Rust concepts:
// - async fn in traits: each implementation returns its own future type
// - Generics: the pipeline is generic over F: Fetch (no boxing, no dyn)
// =============================================================================

use crate::error::CrawlError;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Path segment appended to an article link to reach its comments
pub const COMMENTS_SEGMENT: &str = "comments";

/// What came back for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status_ok: bool,
    pub markup: String,
}

impl FetchedPage {
    pub fn ok(markup: impl Into<String>) -> Self {
        FetchedPage {
            status_ok: true,
            markup: markup.into(),
        }
    }

    /// A page that answered with a non-success status
    pub fn absent() -> Self {
        FetchedPage {
            status_ok: false,
            markup: String::new(),
        }
    }
}

pub trait Fetch {
    async fn fetch(&self, uri: &str) -> Result<FetchedPage, CrawlError>;
}

/// Fetches pages over HTTP with reqwest
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the shared client
    //
    // Parameters:
    //   timeout: upper bound for a whole request, body included
    pub fn new(timeout: Duration) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, uri: &str) -> Result<FetchedPage, CrawlError> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| fetch_error(uri, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(url = uri, status = status.as_u16(), "page absent");
            return Ok(FetchedPage::absent());
        }

        let markup = response.text().await.map_err(|e| fetch_error(uri, e))?;
        Ok(FetchedPage::ok(markup))
    }
}

// Turns a reqwest error into a short, readable reason
fn fetch_error(url: &str, error: reqwest::Error) -> CrawlError {
    let reason = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        error.to_string()
    };

    CrawlError::Fetch {
        url: url.to_string(),
        reason,
    }
}

// Derives the comments page of an article
//
// Example:
//   "https://habr.com/ru/articles/1/" -> "https://habr.com/ru/articles/1/comments"
//   "https://habr.com/ru/articles/1"  -> "https://habr.com/ru/articles/1/comments"
pub fn comments_url(link: &str) -> Result<String, CrawlError> {
    let invalid = |source| CrawlError::InvalidLink {
        link: link.to_string(),
        source,
    };

    let mut url = Url::parse(link).map_err(invalid)?;
    {
        // mailto:, data: and friends have no path to extend
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
        segments.pop_if_empty().push(COMMENTS_SEGMENT);
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_url_with_trailing_slash() {
        let url = comments_url("https://habr.com/ru/articles/123/").unwrap();
        assert_eq!(url, "https://habr.com/ru/articles/123/comments");
    }

    #[test]
    fn test_comments_url_without_trailing_slash() {
        let url = comments_url("https://habr.com/ru/articles/123").unwrap();
        assert_eq!(url, "https://habr.com/ru/articles/123/comments");
    }

    #[test]
    fn test_comments_url_rejects_garbage() {
        let err = comments_url("not a link").unwrap_err();
        assert!(matches!(err, CrawlError::InvalidLink { .. }));
        assert!(!err.is_fatal());
        assert!(comments_url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new(Duration::from_secs(1)).is_ok());
    }
}
