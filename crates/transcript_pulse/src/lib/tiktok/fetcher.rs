use std::{future::Future, time::Duration};

use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::{
    error::FetchError,
    tiktok::{
        metadata::{item_struct, TikTokPage, VideoMetadata},
        VideoFetcher,
    },
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Bounded retry budget for one `fetch` call, tracked independently
/// per failure category.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Source of raw video pages; the seam that lets fetch retries be
/// tested without a network.
pub trait PageSource {
    fn get_page(&self, url: &str) -> impl Future<Output = Result<TikTokPage, FetchError>> + Send;
}

/// Builds the shared client used for page loads, caption downloads
/// and media downloads: browser-shaped headers and a cookie jar, so
/// session tokens issued by the server are reused on later requests.
pub fn http_client() -> anyhow::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, sdch"));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .cookie_store(true)
        .build()?;

    Ok(client)
}

/// Real page source backed by reqwest. An optional session cookie
/// from the operator's browser is sent on every request; refreshed
/// tokens land in the client's cookie jar automatically.
pub struct HttpPageSource {
    client: reqwest::Client,
    session_cookie: Option<String>,
}

impl HttpPageSource {
    pub fn new(client: reqwest::Client, session_cookie: Option<String>) -> Self {
        HttpPageSource {
            client,
            session_cookie,
        }
    }
}

impl PageSource for HttpPageSource {
    async fn get_page(&self, url: &str) -> Result<TikTokPage, FetchError> {
        let mut request = self.client.get(url).timeout(REQUEST_TIMEOUT);
        if let Some(cookie) = &self.session_cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::TransientHttp(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::TransientHttp(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::TransientHttp(e.to_string()))?;

        Ok(TikTokPage::new(body))
    }
}

/// Fetches video metadata with a bounded retry loop per failure
/// category: transport errors, empty payloads and missing video
/// details each get their own budget within one call.
pub struct TikTokClient<P = HttpPageSource> {
    pages: P,
    retry: RetryPolicy,
}

impl TikTokClient<HttpPageSource> {
    pub fn new(client: reqwest::Client, session_cookie: Option<String>) -> Self {
        TikTokClient {
            pages: HttpPageSource::new(client, session_cookie),
            retry: RetryPolicy::default(),
        }
    }
}

impl<P: PageSource> TikTokClient<P> {
    pub fn with_page_source(pages: P, retry: RetryPolicy) -> Self {
        TikTokClient { pages, retry }
    }

    async fn attempt(&self, url: &str) -> Result<VideoMetadata, FetchError> {
        let page = self.pages.get_page(url).await?;
        let universal_data = page.universal_data().ok_or(FetchError::EmptyResponse)?;
        let details = item_struct(&universal_data).ok_or(FetchError::UnavailableVideo)?;

        Ok(VideoMetadata::new(url, details))
    }
}

impl<P: PageSource + Send + Sync> VideoFetcher for TikTokClient<P> {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<VideoMetadata, FetchError> {
        let mut http_budget = self.retry.attempts;
        let mut empty_budget = self.retry.attempts;
        let mut unavailable_budget = self.retry.attempts;

        loop {
            let error = match self.attempt(url).await {
                Ok(metadata) => return Ok(metadata),
                Err(error) => error,
            };

            let budget = match &error {
                FetchError::TransientHttp(_) => &mut http_budget,
                FetchError::EmptyResponse => &mut empty_budget,
                FetchError::UnavailableVideo => &mut unavailable_budget,
            };
            *budget = budget.saturating_sub(1);

            tracing::debug!(
                video_url = url,
                error = %error,
                retries_left = *budget,
                "Fetch attempt failed"
            );

            if *budget == 0 {
                return Err(error);
            }
            tokio::time::sleep(self.retry.backoff).await;
        }
    }
}
