//! HTTP collaborator seam.
//!
//! The search core only needs "GET this URL with these query pairs and give
//! me JSON back". Everything else about transport (pooling, TLS, cookies,
//! timeouts, retries) stays behind [`HttpGet`], so tests substitute a
//! scripted collaborator and never touch the network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::error::Result;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";
const REFERER: &str = "https://www.bilibili.com";
const HOME_URL: &str = "https://www.bilibili.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Narrow transport interface the search core calls through.
///
/// A cancelled or timed-out request must surface as
/// [`crate::SearchError::UpstreamUnavailable`]; the core never retries on
/// its own.
#[async_trait]
pub trait HttpGet: Send + Sync {
    /// Issue a GET with the given query pairs and parse the body as JSON.
    async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value>;
}

/// Production collaborator backed by `reqwest`.
///
/// Keeps a cookie store so the session cookies handed out by the home page
/// (and an optional `SESSDATA` credential) ride along on every search
/// request; without them the search endpoints answer with code `-412`,
/// which the core surfaces as data.
#[derive(Debug)]
pub struct ReqwestHttp {
    client: reqwest::Client,
    home_url: String,
    bootstrapped: tokio::sync::Mutex<bool>,
}

impl ReqwestHttp {
    /// Anonymous client; user-specific fields in results stay degraded.
    pub fn new() -> Result<Self> {
        Self::build(None)
    }

    /// Client with a `SESSDATA` credential for personalized results.
    pub fn with_sessdata(sessdata: &str) -> Result<Self> {
        Self::build(Some(sessdata))
    }

    fn build(sessdata: Option<&str>) -> Result<Self> {
        let jar = Arc::new(reqwest::cookie::Jar::default());
        if let Some(sessdata) = sessdata {
            if let Ok(home) = HOME_URL.parse::<reqwest::Url>() {
                jar.add_cookie_str(
                    &format!("SESSDATA={sessdata}; Domain=.bilibili.com; Path=/"),
                    &home,
                );
            }
        }
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(jar)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            home_url: HOME_URL.to_string(),
            bootstrapped: tokio::sync::Mutex::new(false),
        })
    }

    /// Override the page visited to pick up session cookies (tests).
    #[must_use]
    pub fn with_home_url(mut self, url: impl Into<String>) -> Self {
        self.home_url = url.into();
        self
    }

    // Visit the home page once so the cookie jar holds the session cookies
    // the search endpoints expect. Failure degrades (the next request may
    // come back -412) but is retried on the following call.
    async fn ensure_cookies(&self) {
        let mut done = self.bootstrapped.lock().await;
        if *done {
            return;
        }
        match self.client.get(&self.home_url).send().await {
            Ok(_) => *done = true,
            Err(err) => warn!("cookie bootstrap failed: {err}"),
        }
    }
}

#[async_trait]
impl HttpGet for ReqwestHttp {
    async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value> {
        self.ensure_cookies().await;
        let response = self
            .client
            .get(url)
            .header("Referer", REFERER)
            .query(query)
            .send()
            .await?;
        Ok(response.json::<Value>().await?)
    }
}
