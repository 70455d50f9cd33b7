//! Integration tests for the search client.
//!
//! A scripted collaborator stands in for the HTTP transport, so these tests
//! exercise the full key-fetch -> sign -> request -> parse pipeline without
//! touching the network. The last test drives the real `reqwest`
//! collaborator against a local wiremock server.
//!
//! Run with: cargo test --test integration_tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use bili_search::{
    HttpGet, ReqwestHttp, SearchClient, SearchConfig, SearchError, SearchOptions, SearchOrder,
    SearchType, UserType, VideoDuration,
};

const NAV_URL: &str = "https://fake.test/nav";
const SEARCH_ALL_URL: &str = "https://fake.test/search/all";
const SEARCH_TYPE_URL: &str = "https://fake.test/search/type";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("bili_search=debug")
        .with_test_writer()
        .try_init();
}

fn fake_config() -> SearchConfig {
    SearchConfig {
        search_all_url: SEARCH_ALL_URL.to_string(),
        search_type_url: SEARCH_TYPE_URL.to_string(),
        nav_url: NAV_URL.to_string(),
        sessdata: None,
    }
}

fn nav_body() -> Value {
    json!({
        "code": 0,
        "data": {
            "wbi_img": {
                "img_url": "https://i0.hdslb.com/bfs/wbi/7cd084941338484aae1ad9425b84077c.png",
                "sub_url": "https://i0.hdslb.com/bfs/wbi/4932caff0ff746eab6f01bf08b70ac45.png",
            },
        },
    })
}

fn search_all_body() -> Value {
    json!({
        "code": 0,
        "message": "0",
        "data": {
            "seid": "10086",
            "numResults": 2,
            "numPages": 1,
            "top_tlist": {"video": 1, "bili_user": 1},
            "result": [
                {"result_type": "video", "data": [
                    {"aid": 2, "bvid": "BV1xx411c7mD", "title": r#"<em class="keyword">字幕</em>君"#, "play": 100},
                ]},
                {"result_type": "bili_user", "data": [
                    {"mid": 36081, "uname": "某用户", "fans": 5},
                ]},
            ],
        },
    })
}

/// Scripted collaborator: serves a queue of nav bodies (last one repeats)
/// and a fixed search body, recording every request it sees.
struct FakeHttp {
    nav_bodies: Mutex<VecDeque<Value>>,
    nav_calls: AtomicU32,
    nav_delay: Option<Duration>,
    search_body: Value,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeHttp {
    fn new(search_body: Value) -> Self {
        Self::with_nav_bodies(vec![nav_body()], search_body)
    }

    fn with_nav_bodies(nav_bodies: Vec<Value>, search_body: Value) -> Self {
        Self {
            nav_bodies: Mutex::new(nav_bodies.into()),
            nav_calls: AtomicU32::new(0),
            nav_delay: None,
            search_body,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn with_nav_delay(mut self, delay: Duration) -> Self {
        self.nav_delay = Some(delay);
        self
    }

    async fn search_requests(&self) -> Vec<Vec<(String, String)>> {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|(url, _)| url != NAV_URL)
            .map(|(_, query)| query.clone())
            .collect()
    }
}

#[async_trait]
impl HttpGet for FakeHttp {
    async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value, SearchError> {
        self.requests
            .lock()
            .await
            .push((url.to_string(), query.to_vec()));
        if url == NAV_URL {
            self.nav_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.nav_delay {
                tokio::time::sleep(delay).await;
            }
            let mut bodies = self.nav_bodies.lock().await;
            let body = if bodies.len() > 1 {
                bodies.pop_front()
            } else {
                bodies.front().cloned()
            };
            return body.ok_or_else(|| {
                SearchError::UpstreamUnavailable("no scripted nav body".to_string())
            });
        }
        Ok(self.search_body.clone())
    }
}

/// Collaborator whose every request fails at the transport level.
struct DownHttp;

#[async_trait]
impl HttpGet for DownHttp {
    async fn get_json(&self, _url: &str, _query: &[(String, String)]) -> Result<Value, SearchError> {
        Err(SearchError::UpstreamUnavailable(
            "connection refused".to_string(),
        ))
    }
}

fn query_keys(query: &[(String, String)]) -> Vec<&str> {
    query.iter().map(|(k, _)| k.as_str()).collect()
}

fn query_get<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[tokio::test]
async fn test_search_all_end_to_end() {
    init_tracing();
    let http = Arc::new(FakeHttp::new(search_all_body()));
    let client = SearchClient::with_collaborator(http.clone(), fake_config());

    let result = client.search_all("字幕君").await.unwrap();
    assert!(result.ok());
    assert_eq!(result.num_results, 2);
    assert_eq!(result.seid, "10086");
    assert_eq!(result.videos().len(), 1);
    assert_eq!(result.videos()[0].title, "字幕君");
    assert_eq!(result.users().len(), 1);

    let searches = http.search_requests().await;
    assert_eq!(searches.len(), 1);
    let query = &searches[0];
    assert_eq!(query_get(query, "keyword"), Some("字幕君"));
    // Signature and anti-crawl bundle travel with the request.
    for key in ["wts", "w_rid", "dm_img_list", "dm_img_str", "dm_cover_img_str", "dm_img_inter"] {
        assert!(query_get(query, key).is_some(), "missing {key}");
    }
    assert_eq!(query_get(query, "w_rid").map(str::len), Some(32));
}

#[tokio::test]
async fn test_search_type_omits_anti_crawl_bundle() {
    let http = Arc::new(FakeHttp::new(json!({"code": 0, "message": "0", "data": {"result": []}})));
    let client = SearchClient::with_collaborator(http.clone(), fake_config());

    let result = client
        .search_type("教父", SearchType::Video, &SearchOptions::default())
        .await
        .unwrap();
    assert!(result.ok());

    let searches = http.search_requests().await;
    let keys = query_keys(&searches[0]);
    assert!(keys.contains(&"search_type"));
    assert!(keys.contains(&"wts") && keys.contains(&"w_rid"));
    assert!(!keys.iter().any(|k| k.starts_with("dm_")));
}

#[tokio::test]
async fn test_category_conditional_filters() {
    let body = json!({"code": 0, "message": "0", "data": {"result": []}});
    let http = Arc::new(FakeHttp::new(body));
    let client = SearchClient::with_collaborator(http.clone(), fake_config());

    // Video search transmits duration/tids but never the user filters.
    let video_options = SearchOptions {
        order: Some(SearchOrder::Click),
        duration: Some(VideoDuration::Under10Min),
        tids: Some(24),
        user_type: Some(UserType::Creator),
        order_sort: Some(1),
        category_id: Some(2),
        ..SearchOptions::default()
    };
    client
        .search_type("kw", SearchType::Video, &video_options)
        .await
        .unwrap();

    // User search transmits the user filters but not the video ones.
    client
        .search_type("kw", SearchType::BiliUser, &video_options)
        .await
        .unwrap();

    // Article search only picks up category_id.
    client
        .search_type("kw", SearchType::Article, &video_options)
        .await
        .unwrap();

    let searches = http.search_requests().await;
    let video_keys = query_keys(&searches[0]);
    assert!(video_keys.contains(&"duration") && video_keys.contains(&"tids"));
    assert!(!video_keys.contains(&"user_type") && !video_keys.contains(&"order_sort"));
    assert!(!video_keys.contains(&"category_id"));
    assert_eq!(query_get(&searches[0], "order"), Some("click"));

    let user_keys = query_keys(&searches[1]);
    assert!(user_keys.contains(&"user_type") && user_keys.contains(&"order_sort"));
    assert!(!user_keys.contains(&"duration") && !user_keys.contains(&"tids"));

    let article_keys = query_keys(&searches[2]);
    assert!(article_keys.contains(&"category_id"));
    assert!(!article_keys.contains(&"duration") && !article_keys.contains(&"user_type"));
}

#[tokio::test]
async fn test_concurrent_searches_share_one_key_fetch() {
    let http = Arc::new(
        FakeHttp::new(search_all_body()).with_nav_delay(Duration::from_millis(50)),
    );
    let client = Arc::new(SearchClient::with_collaborator(http.clone(), fake_config()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(
            async move { client.search_all("并发").await },
        ));
    }
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().ok());
    }

    assert_eq!(http.nav_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_key_cache_survives_across_calls_and_invalidation_refetches() {
    let http = Arc::new(FakeHttp::new(search_all_body()));
    let client = SearchClient::with_collaborator(http.clone(), fake_config());

    client.search_all("one").await.unwrap();
    client.search_all("two").await.unwrap();
    assert_eq!(http.nav_calls.load(Ordering::SeqCst), 1);

    client.invalidate_keys();
    client.search_all("three").await.unwrap();
    assert_eq!(http.nav_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_malformed_key_source_fails_without_poisoning_cache() {
    init_tracing();
    // First nav response lacks wbi_img, the second is healthy.
    let http = Arc::new(FakeHttp::with_nav_bodies(
        vec![json!({"code": 0, "data": {}}), nav_body()],
        search_all_body(),
    ));
    let client = SearchClient::with_collaborator(http.clone(), fake_config());

    let err = client.search_all("第一次").await.unwrap_err();
    assert!(matches!(err, SearchError::MalformedKeySource(_)), "{err}");

    // The failure was not cached: the next call re-fetches and succeeds.
    let result = client.search_all("第二次").await.unwrap();
    assert!(result.ok());
    assert_eq!(http.nav_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_transport_failure_surfaces_as_upstream_unavailable() {
    let client = SearchClient::with_collaborator(Arc::new(DownHttp), fake_config());
    let err = client.search_all("离线").await.unwrap_err();
    assert!(matches!(err, SearchError::UpstreamUnavailable(_)), "{err}");
}

#[tokio::test]
async fn test_protocol_rejection_is_returned_as_data() {
    let http = Arc::new(FakeHttp::new(json!({"code": -412, "message": "请求被拦截"})));
    let client = SearchClient::with_collaborator(http, fake_config());

    let all = client.search_all("被拦截").await.unwrap();
    assert!(!all.ok());
    assert_eq!(all.code, -412);
    assert!(all.entities.is_empty());

    let typed = client
        .search_type("被拦截", SearchType::Video, &SearchOptions::default())
        .await
        .unwrap();
    assert!(!typed.ok());
    assert_eq!(typed.code, -412);
    assert_eq!(typed.items().map(<[_]>::len), Some(0));
}

#[tokio::test]
async fn test_live_search_end_to_end() {
    let body = json!({
        "code": 0,
        "message": "0",
        "data": {
            "numResults": 2,
            "result": {
                "live_room": [{"roomid": 9, "title": "room"}],
                "live_user": [{"uid": 7, "uname": "anchor"}],
            },
        },
    });
    let http = Arc::new(FakeHttp::new(body));
    let client = SearchClient::with_collaborator(http, fake_config());

    let result = client
        .search_type("直播", SearchType::Live, &SearchOptions::default())
        .await
        .unwrap();
    let (rooms, users) = result.live().expect("live shape");
    assert_eq!(rooms.len(), 1);
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn test_reqwest_collaborator_against_wiremock() {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/x/web-interface/nav"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nav_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/x/web-interface/wbi/search/all/v2"))
        .and(query_param("keyword", "洛天依"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_all_body()))
        .mount(&server)
        .await;

    let config = SearchConfig {
        search_all_url: format!("{}/x/web-interface/wbi/search/all/v2", server.uri()),
        search_type_url: format!("{}/x/web-interface/wbi/search/type", server.uri()),
        nav_url: format!("{}/x/web-interface/nav", server.uri()),
        sessdata: None,
    };
    let http = ReqwestHttp::new().unwrap().with_home_url(server.uri());
    let client = SearchClient::with_collaborator(Arc::new(http), config);

    let result = client.search_all("洛天依").await.unwrap();
    assert!(result.ok());
    assert_eq!(result.videos().len(), 1);
}
