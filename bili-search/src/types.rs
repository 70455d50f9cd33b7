//! Search data structures.
//!
//! Entity field sets mirror what the search endpoints actually return; every
//! entity keeps the full source object in `raw` so fields this client does
//! not model yet are never lost.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Content categories accepted by the category search endpoint.
///
/// `Live` is a pseudo-category: the endpoint answers it with two sequences
/// (rooms and broadcasters) instead of one, see [`CategoryItems`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    Video,
    MediaBangumi,
    MediaFt,
    Live,
    LiveRoom,
    LiveUser,
    Article,
    Topic,
    BiliUser,
    Photo,
}

impl SearchType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::MediaBangumi => "media_bangumi",
            Self::MediaFt => "media_ft",
            Self::Live => "live",
            Self::LiveRoom => "live_room",
            Self::LiveUser => "live_user",
            Self::Article => "article",
            Self::Topic => "topic",
            Self::BiliUser => "bili_user",
            Self::Photo => "photo",
        }
    }
}

/// Result ordering tokens. Which tokens a category accepts is part of the
/// upstream contract; the client transmits whatever the caller picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrder {
    /// Composite relevance (videos, articles, photos).
    TotalRank,
    Click,
    PubDate,
    /// Most danmaku.
    Danmaku,
    /// Most favorited.
    Stow,
    /// Most comments.
    Scores,
    /// Most likes (articles only).
    Attention,
    /// Live rooms by popularity.
    Online,
    /// Live rooms by start time.
    LiveTime,
    /// Default user ordering.
    Default,
    Fans,
    Level,
}

impl SearchOrder {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TotalRank => "totalrank",
            Self::Click => "click",
            Self::PubDate => "pubdate",
            Self::Danmaku => "dm",
            Self::Stow => "stow",
            Self::Scores => "scores",
            Self::Attention => "attention",
            Self::Online => "online",
            Self::LiveTime => "live_time",
            Self::Default => "0",
            Self::Fans => "fans",
            Self::Level => "level",
        }
    }
}

/// Video duration filter (`video` category only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoDuration {
    All,
    Under10Min,
    Min10To30,
    Min30To60,
    Over60Min,
}

impl VideoDuration {
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::All => 0,
            Self::Under10Min => 1,
            Self::Min10To30 => 2,
            Self::Min30To60 => 3,
            Self::Over60Min => 4,
        }
    }
}

/// User kind filter (`bili_user` category only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    All,
    Creator,
    Regular,
    Verified,
}

impl UserType {
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::All => 0,
            Self::Creator => 1,
            Self::Regular => 2,
            Self::Verified => 3,
        }
    }
}

/// Video search hit.
///
/// Course-like entries share this shape but carry a non-`"video"` `type`
/// tag and no `bvid`; check `item_type` before relying on the id.
#[derive(Debug, Clone, Serialize)]
pub struct VideoItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub aid: i64,
    pub bvid: String,
    pub title: String,
    /// Original title with the upstream `<em>` keyword markup intact.
    pub title_raw: String,
    pub description: String,
    pub author: String,
    pub mid: i64,
    pub typeid: String,
    pub typename: String,
    pub arcurl: String,
    pub pic: String,
    pub play: i64,
    /// Danmaku count.
    pub video_review: i64,
    pub favorites: i64,
    pub tag: String,
    /// Comment count.
    pub review: i64,
    pub pubdate: i64,
    pub senddate: i64,
    pub duration: String,
    pub hit_columns: Vec<String>,
    pub rank_score: i64,
    pub is_pay: i64,
    pub is_union_video: i64,
    pub like: i64,
    pub coin: i64,
    pub raw: Value,
}

/// Aggregated user rating of a media entry.
#[derive(Debug, Clone, Serialize)]
pub struct MediaScore {
    pub score: f64,
    pub user_count: i64,
}

/// Bangumi / film-television search hit (`media_bangumi` and `media_ft`
/// share one shape; `item_type` tells them apart).
#[derive(Debug, Clone, Serialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub media_id: i64,
    pub season_id: i64,
    pub title: String,
    pub title_raw: String,
    pub org_title: String,
    pub cover: String,
    pub media_type: i64,
    pub areas: String,
    pub styles: String,
    pub cv: String,
    pub staff: String,
    pub goto_url: String,
    pub desc: String,
    pub pubtime: i64,
    /// `None` when the hit carries no score object at all; distinct from a
    /// present score with zero raters.
    pub media_score: Option<MediaScore>,
    pub season_type_name: String,
    pub ep_size: i64,
    pub eps: Vec<Value>,
    pub hit_columns: Vec<String>,
    pub url: String,
    pub badges: Vec<Value>,
    pub raw: Value,
}

impl MediaItem {
    #[must_use]
    pub const fn media_type_name(&self) -> &'static str {
        match self.media_type {
            1 => "bangumi",
            2 => "movie",
            3 => "documentary",
            4 => "guochuang",
            5 => "tv",
            7 => "variety",
            _ => "unknown",
        }
    }

    /// Rating, or `None` when the upstream sent no score info.
    #[must_use]
    pub fn score(&self) -> Option<f64> {
        self.media_score.as_ref().map(|s| s.score)
    }

    #[must_use]
    pub fn score_count(&self) -> i64 {
        self.media_score.as_ref().map_or(0, |s| s.user_count)
    }
}

/// Live room search hit.
#[derive(Debug, Clone, Serialize)]
pub struct LiveRoomItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub roomid: i64,
    pub uid: i64,
    pub title: String,
    pub title_raw: String,
    pub uname: String,
    pub uface: String,
    pub cover: String,
    pub user_cover: String,
    pub online: i64,
    pub attentions: i64,
    pub cate_name: String,
    pub live_time: String,
    pub tags: String,
    pub hit_columns: Vec<String>,
    pub rank_score: i64,
    pub raw: Value,
}

/// Broadcaster search hit.
#[derive(Debug, Clone, Serialize)]
pub struct LiveUserItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub uid: i64,
    pub uname: String,
    pub uname_raw: String,
    pub uface: String,
    pub is_live: bool,
    pub live_status: i64,
    pub roomid: i64,
    pub attentions: i64,
    pub tags: String,
    pub live_time: String,
    pub hit_columns: Vec<String>,
    pub rank_score: i64,
    pub raw: Value,
}

/// Article (column) search hit.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub id: i64,
    pub title: String,
    pub title_raw: String,
    pub mid: i64,
    pub desc: String,
    pub image_urls: Vec<String>,
    pub view: i64,
    pub like: i64,
    pub reply: i64,
    pub pub_time: i64,
    pub category_name: String,
    pub category_id: i64,
    pub rank_score: i64,
    pub raw: Value,
}

/// Topic search hit.
#[derive(Debug, Clone, Serialize)]
pub struct TopicItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub tp_id: i64,
    pub title: String,
    pub title_raw: String,
    pub description: String,
    pub author: String,
    pub cover: String,
    pub arcurl: String,
    pub click: i64,
    pub pubdate: i64,
    pub update: i64,
    pub hit_columns: Vec<String>,
    pub rank_score: i64,
    pub raw: Value,
}

/// User search hit. The follower/verification fields are only populated
/// when the request carried a session credential.
#[derive(Debug, Clone, Serialize)]
pub struct UserItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub mid: i64,
    pub uname: String,
    pub usign: String,
    pub fans: i64,
    pub videos: i64,
    pub upic: String,
    pub level: i64,
    pub gender: i64,
    pub is_upuser: i64,
    pub is_live: i64,
    pub room_id: i64,
    pub official_verify: Option<Value>,
    /// Sample of the user's recent uploads, kept raw.
    pub res: Vec<Value>,
    pub hit_columns: Vec<String>,
    pub raw: Value,
}

impl UserItem {
    /// Verification description, empty when the account is unverified.
    #[must_use]
    pub fn verify_desc(&self) -> &str {
        self.official_verify
            .as_ref()
            .and_then(|v| v.get("desc"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

/// Photo album search hit.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub id: i64,
    pub title: String,
    pub title_raw: String,
    pub cover: String,
    pub count: i64,
    pub mid: i64,
    pub uname: String,
    pub view: i64,
    pub like: i64,
    pub hit_columns: Vec<String>,
    pub rank_score: i64,
    pub raw: Value,
}

/// A single typed search hit, tagged by the upstream `result_type`.
#[derive(Debug, Clone, Serialize)]
pub enum SearchItem {
    Video(VideoItem),
    Media(MediaItem),
    LiveRoom(LiveRoomItem),
    LiveUser(LiveUserItem),
    Article(ArticleItem),
    Topic(TopicItem),
    User(UserItem),
    Photo(PhotoItem),
    /// Result kinds this client does not model yet, kept verbatim.
    Other(Value),
}

impl SearchItem {
    /// Natural identity used for de-duplication within a category.
    #[must_use]
    pub fn identity(&self) -> Option<String> {
        match self {
            Self::Video(v) => {
                if !v.bvid.is_empty() {
                    Some(format!("bvid:{}", v.bvid))
                } else if v.aid != 0 {
                    Some(format!("aid:{}", v.aid))
                } else {
                    None
                }
            }
            Self::Media(m) => {
                if m.season_id != 0 {
                    Some(format!("ssid:{}", m.season_id))
                } else if m.media_id != 0 {
                    Some(format!("mdid:{}", m.media_id))
                } else {
                    None
                }
            }
            Self::LiveRoom(r) => (r.roomid != 0).then(|| format!("room:{}", r.roomid)),
            Self::LiveUser(u) => (u.uid != 0).then(|| format!("liveuid:{}", u.uid)),
            Self::Article(a) => (a.id != 0).then(|| format!("cv:{}", a.id)),
            Self::Topic(t) => (t.tp_id != 0).then(|| format!("tp:{}", t.tp_id)),
            Self::User(u) => (u.mid != 0).then(|| format!("mid:{}", u.mid)),
            Self::Photo(p) => (p.id != 0).then(|| format!("photo:{}", p.id)),
            Self::Other(_) => None,
        }
    }

    /// Sanitized display title (user name for user-shaped hits).
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Video(v) => &v.title,
            Self::Media(m) => &m.title,
            Self::LiveRoom(r) => &r.title,
            Self::LiveUser(u) => &u.uname,
            Self::Article(a) => &a.title,
            Self::Topic(t) => &t.title,
            Self::User(u) => &u.uname,
            Self::Photo(p) => &p.title,
            Self::Other(_) => "",
        }
    }
}

/// Per-category pagination block of the comprehensive search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub num_results: i64,
    pub total: i64,
    pub pages: i64,
}

/// Comprehensive search result across every category.
#[derive(Debug, Clone, Serialize)]
pub struct SearchAllResult {
    pub code: i64,
    pub message: String,
    pub seid: String,
    pub page: i64,
    pub page_size: i64,
    pub num_results: i64,
    pub num_pages: i64,
    pub suggest_keyword: String,
    /// Per-category totals as reported by the upstream.
    pub top_tlist: BTreeMap<String, i64>,
    /// Per-category pagination.
    pub pageinfo: BTreeMap<String, PageInfo>,
    /// Parsed hits grouped by `result_type`. Every category counted in
    /// `top_tlist` has an entry here, possibly empty.
    pub entities: BTreeMap<String, Vec<SearchItem>>,
    pub raw: Value,
}

impl SearchAllResult {
    /// Whether the upstream accepted the request (`code == 0`).
    #[must_use]
    pub fn ok(&self) -> bool {
        self.code == 0
    }

    /// Hits of one category, empty if the category is absent.
    #[must_use]
    pub fn items(&self, category: &str) -> &[SearchItem] {
        self.entities.get(category).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn videos(&self) -> Vec<&VideoItem> {
        self.items("video")
            .iter()
            .filter_map(|item| match item {
                SearchItem::Video(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn media_bangumi(&self) -> Vec<&MediaItem> {
        self.media_items("media_bangumi")
    }

    #[must_use]
    pub fn media_ft(&self) -> Vec<&MediaItem> {
        self.media_items("media_ft")
    }

    fn media_items(&self, category: &str) -> Vec<&MediaItem> {
        self.items(category)
            .iter()
            .filter_map(|item| match item {
                SearchItem::Media(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn live_rooms(&self) -> Vec<&LiveRoomItem> {
        self.items("live_room")
            .iter()
            .filter_map(|item| match item {
                SearchItem::LiveRoom(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn live_users(&self) -> Vec<&LiveUserItem> {
        self.items("live_user")
            .iter()
            .filter_map(|item| match item {
                SearchItem::LiveUser(u) => Some(u),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn articles(&self) -> Vec<&ArticleItem> {
        self.items("article")
            .iter()
            .filter_map(|item| match item {
                SearchItem::Article(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn topics(&self) -> Vec<&TopicItem> {
        self.items("topic")
            .iter()
            .filter_map(|item| match item {
                SearchItem::Topic(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn users(&self) -> Vec<&UserItem> {
        self.items("bili_user")
            .iter()
            .filter_map(|item| match item {
                SearchItem::User(u) => Some(u),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn photos(&self) -> Vec<&PhotoItem> {
        self.items("photo")
            .iter()
            .filter_map(|item| match item {
                SearchItem::Photo(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}

/// Parsed `result` payload of a category search.
///
/// The `live` pseudo-category answers with an object holding two sequences
/// instead of a flat array; that shape difference is kept at the type level
/// so callers never probe a `Value` at runtime.
#[derive(Debug, Clone, Serialize)]
pub enum CategoryItems {
    /// One homogeneous sequence; every category except `live`.
    Items(Vec<SearchItem>),
    /// Rooms and broadcasters, separately.
    Live {
        rooms: Vec<LiveRoomItem>,
        users: Vec<LiveUserItem>,
    },
}

impl CategoryItems {
    /// Number of hits across all sequences.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Items(items) => items.len(),
            Self::Live { rooms, users } => rooms.len() + users.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single-category search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchTypeResult {
    pub code: i64,
    pub message: String,
    pub search_type: SearchType,
    pub seid: String,
    pub page: i64,
    pub page_size: i64,
    pub num_results: i64,
    pub num_pages: i64,
    pub result: CategoryItems,
    pub raw: Value,
}

impl SearchTypeResult {
    /// Whether the upstream accepted the request (`code == 0`).
    #[must_use]
    pub fn ok(&self) -> bool {
        self.code == 0
    }

    /// The homogeneous hit sequence; `None` for the `live` pseudo-category.
    #[must_use]
    pub fn items(&self) -> Option<&[SearchItem]> {
        match &self.result {
            CategoryItems::Items(items) => Some(items),
            CategoryItems::Live { .. } => None,
        }
    }

    /// The two live sequences; `None` for every other category.
    #[must_use]
    pub fn live(&self) -> Option<(&[LiveRoomItem], &[LiveUserItem])> {
        match &self.result {
            CategoryItems::Live { rooms, users } => Some((rooms, users)),
            CategoryItems::Items(_) => None,
        }
    }
}
