//! Remote resource fetching for code embeds.
//!
//! The pipeline only sees the [`Fetcher`] trait. [`HttpFetcher`] is the real
//! implementation; [`StaticFetcher`] serves canned bodies for tests and
//! offline builds.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

/// Default per-request timeout for [`HttpFetcher`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A capability that retrieves the text body behind a URL.
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return its body as text.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, FetchError>>;
}

/// Type alias for a shared fetcher.
pub type BoxedFetcher = Arc<dyn Fetcher>;

/// A URL that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to fetch {url}: {kind}")]
pub struct FetchError {
    pub url: String,
    pub kind: FetchErrorKind,
}

impl FetchError {
    pub fn new(url: impl Into<String>, kind: FetchErrorKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Not an absolute http(s) URL
    InvalidUrl(String),
    /// Connection, TLS or protocol failure
    Network(String),
    /// The server answered with a non-success status
    Status(u16),
    /// The request did not finish in time
    Timeout,
    /// The body could not be read as text
    Body(String),
    /// No canned body (offline fetcher)
    NotFound,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchErrorKind::InvalidUrl(reason) => write!(f, "invalid URL ({reason})"),
            FetchErrorKind::Network(message) => write!(f, "network error: {message}"),
            FetchErrorKind::Status(code) => write!(f, "HTTP {code}"),
            FetchErrorKind::Timeout => f.write_str("request timed out"),
            FetchErrorKind::Body(message) => write!(f, "unreadable body: {message}"),
            FetchErrorKind::NotFound => f.write_str("no such resource"),
        }
    }
}

/// Fetches over HTTP(S) with reqwest.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("inkmark/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }

    /// Use an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let parsed = url::Url::parse(url)
            .map_err(|e| FetchError::new(url, FetchErrorKind::InvalidUrl(e.to_string())))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::new(
                url,
                FetchErrorKind::InvalidUrl(format!("unsupported scheme `{}`", parsed.scheme())),
            ));
        }

        let start = std::time::Instant::now();
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::new(url, classify(&e)))?;

        let status = response.status();
        if !status.is_success() {
            tracing::info!(url, status = status.as_u16(), "HTTP error");
            return Err(FetchError::new(url, FetchErrorKind::Status(status.as_u16())));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::new(url, FetchErrorKind::Timeout)
            } else {
                FetchError::new(url, FetchErrorKind::Body(e.to_string()))
            }
        })?;

        tracing::debug!(
            url,
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );
        Ok(body)
    }
}

fn classify(error: &reqwest::Error) -> FetchErrorKind {
    if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if let Some(status) = error.status() {
        FetchErrorKind::Status(status.as_u16())
    } else {
        FetchErrorKind::Network(error.to_string())
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        Box::pin(self.get(url))
    }
}

/// Serves fixed bodies from memory; unknown URLs fail with
/// [`FetchErrorKind::NotFound`].
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, Result<String, FetchErrorKind>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(url.into(), Ok(body.into()));
        self
    }

    /// Fail requests for `url` with `kind`.
    pub fn with_error(mut self, url: impl Into<String>, kind: FetchErrorKind) -> Self {
        self.bodies.insert(url.into(), Err(kind));
        self
    }
}

impl Fetcher for StaticFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        let result = match self.bodies.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(kind)) => Err(FetchError::new(url, kind.clone())),
            None => Err(FetchError::new(url, FetchErrorKind::NotFound)),
        };
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_fetcher() {
        let fetcher = StaticFetcher::new()
            .with("http://x/a.go", "package main")
            .with_error("http://x/gone", FetchErrorKind::Status(404));

        assert_eq!(fetcher.fetch("http://x/a.go").await.unwrap(), "package main");
        assert_eq!(
            fetcher.fetch("http://x/gone").await.unwrap_err().kind,
            FetchErrorKind::Status(404)
        );
        assert_eq!(
            fetcher.fetch("http://x/none").await.unwrap_err().kind,
            FetchErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_http_fetcher_rejects_non_http_urls() {
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher.fetch("file:///etc/passwd").await.unwrap_err();
        assert!(matches!(err.kind, FetchErrorKind::InvalidUrl(_)));

        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err.kind, FetchErrorKind::InvalidUrl(_)));
    }

    #[test]
    fn test_error_display() {
        let err = FetchError::new("http://x/a", FetchErrorKind::Status(503));
        assert_eq!(err.to_string(), "failed to fetch http://x/a: HTTP 503");
    }
}
