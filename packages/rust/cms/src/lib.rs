//! Client for the site's WordPress REST routes.
//!
//! Reads recently catalogued stories, fetches story detail, checks plugin
//! health, and submits generated articles. Every authenticated call carries
//! the static `X-API-Key` header; there is no retry at any call site.

mod records;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use volare_shared::{CatalogItem, NewPost, PublishResult, Result, VolareError};

pub use records::HealthStatus;

/// Header carrying the static CMS credential.
const API_KEY_HEADER: &str = "X-API-Key";

/// Default timeout in seconds for CMS requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for CMS requests.
const USER_AGENT: &str = concat!("Volare/", env!("CARGO_PKG_VERSION"));

const RECENT_STORIES_PATH: &str = "/wp-json/crawler/v1/stories/recent";
const STORY_DETAIL_PATH: &str = "/wp-json/wp/v2/fcn_story";
const HEALTH_PATH: &str = "/wp-json/crawler/v1/health";
const ARTICLE_PATH: &str = "/wp-json/crawler/v1/article";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Connection settings for [`CmsClient`].
#[derive(Clone)]
pub struct CmsOptions {
    /// Site base URL, e.g. `https://volarereads.com`.
    pub base_url: String,
    /// Value sent as `X-API-Key`.
    pub api_key: String,
    /// Timeout for each request in seconds.
    pub timeout_secs: u64,
}

impl CmsOptions {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Trailing window used when listing recent stories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentWindow {
    /// Stories added within this many days count as recent.
    pub days: u32,
    /// Upper bound on returned stories.
    pub per_page: u32,
}

impl Default for RecentWindow {
    fn default() -> Self {
        Self {
            days: 7,
            per_page: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// FetchOutcome
// ---------------------------------------------------------------------------

/// Outcome of listing recent stories.
#[derive(Debug)]
pub enum FetchOutcome {
    /// At least one story was found.
    Items(Vec<CatalogItem>),
    /// The request succeeded but nothing was added in the window.
    Empty,
    /// Transport failure, non-200 status, or unparseable body.
    Failed(VolareError),
}

impl FetchOutcome {
    fn from_items(items: Vec<CatalogItem>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Items(items)
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated client for the crawler REST routes.
pub struct CmsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CmsClient {
    /// Build a client; fails on an unparseable base URL.
    pub fn new(opts: &CmsOptions) -> Result<Self> {
        let parsed = Url::parse(&opts.base_url).map_err(|e| {
            VolareError::config(format!("invalid CMS base URL '{}': {e}", opts.base_url))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| VolareError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            api_key: opts.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// List stories added within the trailing window.
    ///
    /// Never returns an error: failures are reported as [`FetchOutcome::Failed`]
    /// so the caller decides how to stop.
    #[instrument(skip_all, fields(days = window.days, per_page = window.per_page))]
    pub async fn recent_stories(&self, window: &RecentWindow) -> FetchOutcome {
        match self.try_recent_stories(window).await {
            Ok(mut items) => {
                items.truncate(window.per_page as usize);
                info!(count = items.len(), "fetched recent stories");
                FetchOutcome::from_items(items)
            }
            Err(e) => {
                error!(error = %e, "failed to fetch recent stories");
                FetchOutcome::Failed(e)
            }
        }
    }

    async fn try_recent_stories(&self, window: &RecentWindow) -> Result<Vec<CatalogItem>> {
        let url = self.endpoint(RECENT_STORIES_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[("days", window.days), ("per_page", window.per_page)])
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| network_error(&url, &e))?;

        let body = expect_status(response, RECENT_STORIES_PATH, &[StatusCode::OK]).await?;

        let parsed: records::RecentStoriesResponse = serde_json::from_str(&body).map_err(|e| {
            VolareError::MalformedResponse(format!("{RECENT_STORIES_PATH}: {e}"))
        })?;

        Ok(parsed.stories.into_iter().map(CatalogItem::from).collect())
    }

    /// Fetch the raw `fcn_story` record. Any non-200 status yields `Ok(None)`.
    #[instrument(skip(self))]
    pub async fn story_detail(&self, id: u64) -> Result<Option<serde_json::Value>> {
        let url = format!("{}/{id}", self.endpoint(STORY_DETAIL_PATH));
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| network_error(&url, &e))?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(%status, "story detail unavailable");
            return Ok(None);
        }

        let detail = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| VolareError::MalformedResponse(format!("{STORY_DETAIL_PATH}: {e}")))?;

        Ok(Some(detail))
    }

    /// Query the plugin health route (unauthenticated on the server side).
    #[instrument(skip_all)]
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint(HEALTH_PATH);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| network_error(&url, &e))?;

        let body = expect_status(response, HEALTH_PATH, &[StatusCode::OK]).await?;

        serde_json::from_str(&body)
            .map_err(|e| VolareError::MalformedResponse(format!("{HEALTH_PATH}: {e}")))
    }

    /// Submit a new article. Success is HTTP 200 or 201 with a JSON body.
    #[instrument(skip_all, fields(title = %post.title))]
    pub async fn publish(&self, post: &NewPost) -> Result<PublishResult> {
        let url = self.endpoint(ARTICLE_PATH);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(post)
            .send()
            .await
            .map_err(|e| network_error(&url, &e))?;

        let body = expect_status(
            response,
            ARTICLE_PATH,
            &[StatusCode::OK, StatusCode::CREATED],
        )
        .await?;

        let result: PublishResult = serde_json::from_str(&body)
            .map_err(|e| VolareError::MalformedResponse(format!("{ARTICLE_PATH}: {e}")))?;

        match &result.link {
            Some(link) => info!(%link, "article published"),
            None => warn!("article published but response carried no link"),
        }

        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read the body and reject any status outside `accepted`.
async fn expect_status(
    response: reqwest::Response,
    endpoint: &str,
    accepted: &[StatusCode],
) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| VolareError::Network(format!("{endpoint}: failed to read body: {e}")))?;

    if !accepted.contains(&status) {
        error!(endpoint, status = status.as_u16(), body = %body, "CMS request failed");
        return Err(VolareError::api(endpoint, status.as_u16(), &body));
    }

    Ok(body)
}

fn network_error(url: &str, e: &reqwest::Error) -> VolareError {
    if e.is_timeout() {
        VolareError::Network(format!("{url}: request timed out"))
    } else {
        VolareError::Network(format!("{url}: {e}"))
    }
}
