//! Typed Bilibili web search client.
//!
//! Every request is WBI-signed (via [`bili_wbi`]) and dispatched through a
//! narrow HTTP collaborator trait; the heterogeneous JSON payloads coming
//! back are normalized into typed, de-duplicated result collections.
//!
//! ```no_run
//! use bili_search::{SearchClient, SearchOptions, SearchOrder, SearchType};
//!
//! # async fn run() -> bili_search::Result<()> {
//! let client = SearchClient::new()?;
//!
//! let all = client.search_all("洛天依").await?;
//! if all.ok() {
//!     for video in all.videos() {
//!         println!("[{}] {} ({} plays)", video.bvid, video.title, video.play);
//!     }
//! }
//!
//! let videos = client
//!     .search_type(
//!         "洛天依",
//!         SearchType::Video,
//!         &SearchOptions {
//!             order: Some(SearchOrder::Click),
//!             ..SearchOptions::default()
//!         },
//!     )
//!     .await?;
//! println!("{} results over {} pages", videos.num_results, videos.num_pages);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod doc;
pub mod error;
pub mod http;
pub mod ids;
pub mod keys;
pub mod parse;
pub mod score;
pub mod types;

pub use client::{SearchClient, SearchConfig, SearchOptions};
pub use error::{Result, SearchError};
pub use http::{HttpGet, ReqwestHttp};
pub use ids::{av_to_bv, bv_to_av, extract_bvid, extract_epid, IdError};
pub use keys::KeyCache;
pub use score::{DocScorer, DocStats, ScoreDetail};
pub use types::{
    ArticleItem, CategoryItems, LiveRoomItem, LiveUserItem, MediaItem, MediaScore, PageInfo,
    PhotoItem, SearchAllResult, SearchItem, SearchOrder, SearchType, SearchTypeResult, TopicItem,
    UserItem, UserType, VideoDuration, VideoItem,
};
