//! Search client: parameter assembly, signing, dispatch, parsing.

use std::sync::Arc;

use bili_wbi::{sign_params, DmParams, SignedParams};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::error::Result;
use crate::http::{HttpGet, ReqwestHttp};
use crate::keys::{KeyCache, NAV_URL};
use crate::types::{
    SearchAllResult, SearchOrder, SearchType, SearchTypeResult, UserType, VideoDuration,
};

/// Comprehensive search endpoint.
pub const SEARCH_ALL_URL: &str = "https://api.bilibili.com/x/web-interface/wbi/search/all/v2";
/// Category search endpoint.
pub const SEARCH_TYPE_URL: &str = "https://api.bilibili.com/x/web-interface/wbi/search/type";

/// Client construction knobs. `Default` targets the public web endpoints.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub search_all_url: String,
    pub search_type_url: String,
    pub nav_url: String,
    /// Session credential for personalized result fields. Optional: without
    /// it user results lack following/subscription flags, which is a silent
    /// capability reduction rather than an error.
    pub sessdata: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_all_url: SEARCH_ALL_URL.to_string(),
            search_type_url: SEARCH_TYPE_URL.to_string(),
            nav_url: NAV_URL.to_string(),
            sessdata: None,
        }
    }
}

/// Category search filters. Only the fields that apply to the requested
/// category are transmitted; the rest are ignored.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub page: i64,
    pub order: Option<SearchOrder>,
    /// `video` only.
    pub duration: Option<VideoDuration>,
    /// Partition filter, `video` only.
    pub tids: Option<i64>,
    /// Ordering direction for `bili_user`: 0 descending, 1 ascending.
    pub order_sort: Option<i64>,
    /// `bili_user` only.
    pub user_type: Option<UserType>,
    /// Partition filter for `article` / `photo`.
    pub category_id: Option<i64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            page: 1,
            order: None,
            duration: None,
            tids: None,
            order_sort: None,
            user_type: None,
            category_id: None,
        }
    }
}

/// High-level Bilibili search client.
///
/// Owns the key cache and the anti-crawl generator; every call is stateless
/// beyond the cached signing keys, so pagination is plain repeated calls.
pub struct SearchClient {
    http: Arc<dyn HttpGet>,
    keys: KeyCache,
    dm: DmParams,
    config: SearchConfig,
}

impl SearchClient {
    /// Client over the production `reqwest` collaborator.
    pub fn new() -> Result<Self> {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Result<Self> {
        let http: Arc<dyn HttpGet> = match config.sessdata.as_deref() {
            Some(sessdata) => Arc::new(ReqwestHttp::with_sessdata(sessdata)?),
            None => Arc::new(ReqwestHttp::new()?),
        };
        Ok(Self::with_collaborator(http, config))
    }

    /// Client over a caller-supplied collaborator (tests, custom transports).
    #[must_use]
    pub fn with_collaborator(http: Arc<dyn HttpGet>, config: SearchConfig) -> Self {
        let keys = KeyCache::with_url(config.nav_url.clone());
        Self {
            http,
            keys,
            dm: DmParams::new(),
            config,
        }
    }

    /// Drop the cached signing keys so the next request re-fetches them.
    /// For callers that keep receiving code `-412` after the daily rotation.
    pub fn invalidate_keys(&self) {
        self.keys.invalidate();
    }

    async fn signed_query(&self, params: Map<String, Value>) -> Result<SignedParams> {
        let keys = self.keys.get(self.http.as_ref()).await?;
        let wts = chrono::Utc::now().timestamp();
        Ok(sign_params(&params, &keys, wts))
    }

    /// Comprehensive search across every category.
    pub async fn search_all(&self, keyword: &str) -> Result<SearchAllResult> {
        let mut params = Map::new();
        params.insert("keyword".to_string(), Value::String(keyword.to_string()));
        // Only the comprehensive endpoint demands the fingerprint bundle.
        for (key, value) in self.dm.generate() {
            params.insert(key, value);
        }
        let query = self.signed_query(params).await?;

        debug!(keyword, "search_all");
        let body = self.http.get_json(&self.config.search_all_url, &query).await?;
        let result = SearchAllResult::from_raw(body);
        if !result.ok() {
            warn!(
                code = result.code,
                message = %result.message,
                "search_all rejected by upstream"
            );
        }
        Ok(result)
    }

    /// Category search.
    pub async fn search_type(
        &self,
        keyword: &str,
        search_type: SearchType,
        options: &SearchOptions,
    ) -> Result<SearchTypeResult> {
        let mut params = Map::new();
        params.insert("keyword".to_string(), Value::String(keyword.to_string()));
        params.insert(
            "search_type".to_string(),
            Value::String(search_type.as_str().to_string()),
        );
        params.insert("page".to_string(), json!(options.page));
        if let Some(order) = options.order {
            params.insert("order".to_string(), Value::String(order.as_str().to_string()));
        }
        match search_type {
            SearchType::Video => {
                if let Some(duration) = options.duration {
                    params.insert("duration".to_string(), json!(duration.code()));
                }
                if let Some(tids) = options.tids {
                    params.insert("tids".to_string(), json!(tids));
                }
            }
            SearchType::BiliUser => {
                if let Some(order_sort) = options.order_sort {
                    params.insert("order_sort".to_string(), json!(order_sort));
                }
                if let Some(user_type) = options.user_type {
                    params.insert("user_type".to_string(), json!(user_type.code()));
                }
            }
            SearchType::Article | SearchType::Photo => {
                if let Some(category_id) = options.category_id {
                    params.insert("category_id".to_string(), json!(category_id));
                }
            }
            _ => {}
        }
        let query = self.signed_query(params).await?;

        debug!(
            keyword,
            search_type = search_type.as_str(),
            page = options.page,
            "search_type"
        );
        let body = self.http.get_json(&self.config.search_type_url, &query).await?;
        let result = SearchTypeResult::from_raw(body, search_type);
        if !result.ok() {
            warn!(
                code = result.code,
                message = %result.message,
                "search_type rejected by upstream"
            );
        }
        Ok(result)
    }

    /// Video search with the usual knobs.
    pub async fn search_videos(
        &self,
        keyword: &str,
        order: SearchOrder,
        page: i64,
    ) -> Result<SearchTypeResult> {
        self.search_type(
            keyword,
            SearchType::Video,
            &SearchOptions {
                page,
                order: Some(order),
                ..SearchOptions::default()
            },
        )
        .await
    }

    /// User search with the usual knobs.
    pub async fn search_users(
        &self,
        keyword: &str,
        user_type: UserType,
        page: i64,
    ) -> Result<SearchTypeResult> {
        self.search_type(
            keyword,
            SearchType::BiliUser,
            &SearchOptions {
                page,
                user_type: Some(user_type),
                ..SearchOptions::default()
            },
        )
        .await
    }

    pub async fn search_media_bangumi(&self, keyword: &str, page: i64) -> Result<SearchTypeResult> {
        self.search_type(
            keyword,
            SearchType::MediaBangumi,
            &SearchOptions {
                page,
                ..SearchOptions::default()
            },
        )
        .await
    }

    pub async fn search_media_ft(&self, keyword: &str, page: i64) -> Result<SearchTypeResult> {
        self.search_type(
            keyword,
            SearchType::MediaFt,
            &SearchOptions {
                page,
                ..SearchOptions::default()
            },
        )
        .await
    }

    pub async fn search_articles(&self, keyword: &str, page: i64) -> Result<SearchTypeResult> {
        self.search_type(
            keyword,
            SearchType::Article,
            &SearchOptions {
                page,
                ..SearchOptions::default()
            },
        )
        .await
    }
}
