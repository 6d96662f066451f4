//! The Narou API client.

use crate::error::{NarouError, Result};
use crate::query::ApiQuery;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.syosetu.com";

/// Sent with every request.
pub const USER_AGENT: &str = "MCP-Narou/1.0";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Transport seam: fetches a URL and returns the response body.
///
/// [`HttpFetcher`] is the production implementation. Tests substitute a
/// stub that serves canned bodies.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

/// HTTP transport backed by reqwest.
#[derive(Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    /// Build the HTTP client with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        tracing::debug!(%url, "GET");
        let response = self.http.get(url.clone()).send().await?;
        handle_response(response).await
    }
}

/// Absolute URLs of the remote endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub novel: Url,
    pub novel18: Url,
    pub user: Url,
    pub rank_get: Url,
    pub rank_in: Url,
}

impl Endpoints {
    /// Resolve every endpoint against `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| NarouError::Config(format!("invalid base URL {base_url:?}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| NarouError::Config(format!("invalid endpoint {path}: {e}")))
        };
        Ok(Self {
            novel: join("novelapi/api/")?,
            novel18: join("novel18api/api/")?,
            user: join("userapi/api/")?,
            rank_get: join("rank/rankget/")?,
            rank_in: join("rank/rankin/")?,
        })
    }
}

/// Async client for the Narou novel, user, and ranking APIs.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> narou_mcp::error::Result<()> {
/// use narou_mcp::schema::GetNovelRequest;
///
/// let client = narou_mcp::NarouClient::from_env()?;
/// let req = GetNovelRequest::from_args(&serde_json::json!({ "ncode": "n9669bk" }))?;
/// if let Some(novel) = client.get_novel(&req).await? {
///     println!("{}", novel["title"]);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NarouClient<F = HttpFetcher> {
    pub(crate) fetcher: F,
    pub(crate) endpoints: Endpoints,
}

impl NarouClient<HttpFetcher> {
    /// Client for the public API with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client configured from `NAROU_API_BASE_URL` and `NAROU_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("NAROU_API_BASE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = match std::env::var("NAROU_HTTP_TIMEOUT_SECS") {
            Ok(s) if !s.is_empty() => s.parse::<u64>().map_err(|_| {
                NarouError::Config(format!("NAROU_HTTP_TIMEOUT_SECS is not a number: {s}"))
            })?,
            _ => DEFAULT_TIMEOUT_SECS,
        };
        tracing::debug!(%base_url, timeout, "configured Narou client");
        Ok(Self::with_fetcher(
            HttpFetcher::new(Duration::from_secs(timeout))?,
            Endpoints::new(&base_url)?,
        ))
    }

    /// Override the base URL (useful for testing against a mirror).
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self::with_fetcher(
            HttpFetcher::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
            Endpoints::new(base_url)?,
        ))
    }
}

impl<F: Fetcher> NarouClient<F> {
    /// Client over a custom transport.
    pub fn with_fetcher(fetcher: F, endpoints: Endpoints) -> Self {
        Self { fetcher, endpoints }
    }

    /// Resolved endpoint URLs.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// GET an endpoint with the given query and return the body.
    pub(crate) async fn get(&self, endpoint: &Url, query: &ApiQuery) -> Result<String> {
        let url = query.apply(endpoint);
        self.fetcher.fetch(&url).await
    }
}

/// Handle the HTTP response, mapping status codes to errors.
async fn handle_response(response: reqwest::Response) -> Result<String> {
    let status = response.status().as_u16();

    match status {
        200..=299 => Ok(response.text().await?),
        _ => {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status, "Narou API returned an error status");
            Err(NarouError::Api {
                status,
                message: body,
            })
        }
    }
}
