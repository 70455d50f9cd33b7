//! WBI signing-key cache.

use async_singleflight::Group;
use bili_wbi::WbiKeys;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SearchError};
use crate::http::HttpGet;

/// Nav endpoint whose `wbi_img` URLs carry the signing keys.
pub const NAV_URL: &str = "https://api.bilibili.com/x/web-interface/nav";

/// Process-lifetime cache for the rotating `img_key` / `sub_key` pair.
///
/// The first caller fetches; callers arriving while that fetch is in flight
/// wait on it and share its outcome, success or failure (at most one fetch
/// is ever in flight). Failures are never cached, so the next call simply
/// retries. The upstream rotates the pair roughly daily but publishes no
/// expiry, so invalidation is explicit: a caller that keeps observing
/// authorization failures calls [`KeyCache::invalidate`].
pub struct KeyCache {
    url: String,
    keys: RwLock<Option<WbiKeys>>,
    flight: Group<String, WbiKeys, SearchError>,
}

impl KeyCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_url(NAV_URL)
    }

    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            keys: RwLock::new(None),
            flight: Group::new(),
        }
    }

    /// The cached key pair, fetching it on first use.
    pub async fn get(&self, http: &dyn HttpGet) -> Result<WbiKeys> {
        if let Some(keys) = self.keys.read().clone() {
            return Ok(keys);
        }
        let outcome = self
            .flight
            .work(&"wbi_keys".to_string(), async {
                let keys = fetch_keys(http, &self.url).await?;
                debug!(img_key = keys.img_key(), "fetched wbi keys");
                *self.keys.write() = Some(keys.clone());
                Ok(keys)
            })
            .await;
        outcome.map_err(|err| match err {
            Some(inner) => inner,
            None => SearchError::UpstreamUnavailable("key fetch leader dropped".to_string()),
        })
    }

    /// Drop the cached pair so the next call re-fetches.
    pub fn invalidate(&self) {
        *self.keys.write() = None;
    }
}

impl Default for KeyCache {
    fn default() -> Self {
        Self::new()
    }
}

async fn fetch_keys(http: &dyn HttpGet, url: &str) -> Result<WbiKeys> {
    let body = http.get_json(url, &[]).await?;
    let wbi_img = body
        .pointer("/data/wbi_img")
        .ok_or_else(|| SearchError::MalformedKeySource("missing data.wbi_img".to_string()))?;
    let img_key = key_from_url(wbi_img.get("img_url"))?;
    let sub_key = key_from_url(wbi_img.get("sub_url"))?;
    Ok(WbiKeys::new(img_key, sub_key)?)
}

// Final path segment with its extension dropped: `.../7cd0...077c.png`
// yields `7cd0...077c`.
fn key_from_url(value: Option<&Value>) -> Result<String> {
    let raw = value
        .and_then(Value::as_str)
        .ok_or_else(|| SearchError::MalformedKeySource("missing wbi_img url".to_string()))?;
    let parsed = url::Url::parse(raw)
        .map_err(|err| SearchError::MalformedKeySource(format!("bad wbi_img url {raw:?}: {err}")))?;
    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| {
            SearchError::MalformedKeySource(format!("no path segment in wbi_img url {raw:?}"))
        })?;
    let key = segment.split('.').next().unwrap_or(segment);
    Ok(key.to_string())
}
