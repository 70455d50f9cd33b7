//! Raw JSON to typed result normalization.
//!
//! Every field goes through a total coercion helper: absent, `null` or
//! unparseable values fall back to a declared default, so one malformed
//! field never invalidates a whole result set. Title-like text is exposed
//! both raw and with the upstream `<em>` keyword markup stripped.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use tracing::debug;

use crate::types::{
    ArticleItem, CategoryItems, LiveRoomItem, LiveUserItem, MediaItem, MediaScore, PageInfo,
    PhotoItem, SearchAllResult, SearchItem, SearchType, SearchTypeResult, TopicItem, UserItem,
    VideoItem,
};

// --- scalar coercion -------------------------------------------------------

/// Best-effort integer coercion: numbers truncate, numeric strings parse,
/// bools map to 0/1, everything else (including absence and `null`) yields
/// `default`. Never fails.
#[must_use]
pub fn coerce_int(value: Option<&Value>, default: i64) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(default),
        Some(Value::Bool(b)) => i64::from(*b),
        _ => default,
    }
}

/// Best-effort float coercion with the same totality rules as [`coerce_int`].
#[must_use]
pub fn coerce_f64(value: Option<&Value>, default: f64) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(default),
        _ => default,
    }
}

/// Strings pass through, numbers stringify, everything else is empty.
#[must_use]
pub fn coerce_str(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Truthiness in the upstream's loose sense: non-zero numbers and non-empty
/// strings count as `true`.
#[must_use]
pub fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        _ => false,
    }
}

fn coerce_str_list(value: Option<&Value>) -> Vec<String> {
    value.and_then(Value::as_array).map_or_else(Vec::new, |arr| {
        arr.iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

fn coerce_list(value: Option<&Value>) -> Vec<Value> {
    value.and_then(Value::as_array).cloned().unwrap_or_default()
}

// Upstream `type` tag, falling back to the category when absent.
fn type_tag(data: &Value, default: &str) -> String {
    match data.get("type").and_then(Value::as_str) {
        Some(tag) if !tag.is_empty() => tag.to_string(),
        _ => default.to_string(),
    }
}

// --- text sanitization -----------------------------------------------------

/// Remove angle-bracket tag pairs, keeping inner text.
///
/// Idempotent: the output never contains a complete tag (or a `<` at all),
/// so stripping twice equals stripping once.
#[must_use]
pub fn strip_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result
}

// --- entity constructors ---------------------------------------------------

impl VideoItem {
    /// Build from one entry of a `video` result group. Total: every missing
    /// or malformed field degrades to its default.
    #[must_use]
    pub fn from_raw(data: &Value) -> Self {
        let title_raw = coerce_str(data.get("title"));
        Self {
            item_type: type_tag(data, "video"),
            aid: coerce_int(data.get("aid").or_else(|| data.get("id")), 0),
            bvid: coerce_str(data.get("bvid")),
            title: strip_html(&title_raw),
            title_raw,
            description: coerce_str(data.get("description")),
            author: coerce_str(data.get("author")),
            mid: coerce_int(data.get("mid"), 0),
            typeid: coerce_str(data.get("typeid")),
            typename: coerce_str(data.get("typename")),
            arcurl: coerce_str(data.get("arcurl")),
            pic: coerce_str(data.get("pic")),
            play: coerce_int(data.get("play"), 0),
            video_review: coerce_int(data.get("video_review"), 0),
            favorites: coerce_int(data.get("favorites"), 0),
            tag: coerce_str(data.get("tag")),
            review: coerce_int(data.get("review"), 0),
            pubdate: coerce_int(data.get("pubdate"), 0),
            senddate: coerce_int(data.get("senddate"), 0),
            duration: coerce_str(data.get("duration")),
            hit_columns: coerce_str_list(data.get("hit_columns")),
            rank_score: coerce_int(data.get("rank_score"), 0),
            is_pay: coerce_int(data.get("is_pay"), 0),
            is_union_video: coerce_int(data.get("is_union_video"), 0),
            like: coerce_int(data.get("like"), 0),
            coin: coerce_int(data.get("coin"), 0),
            raw: data.clone(),
        }
    }
}

impl MediaItem {
    /// Build from one `media_bangumi` / `media_ft` entry; `category` names
    /// the group the entry arrived in.
    #[must_use]
    pub fn from_raw(data: &Value, category: &str) -> Self {
        let title_raw = coerce_str(data.get("title"));
        let media_score = data
            .get("media_score")
            .filter(|v| v.is_object())
            .map(|ms| MediaScore {
                score: coerce_f64(ms.get("score"), 0.0),
                user_count: coerce_int(ms.get("user_count"), 0),
            });
        Self {
            item_type: type_tag(data, category),
            media_id: coerce_int(data.get("media_id"), 0),
            season_id: coerce_int(data.get("season_id"), 0),
            title: strip_html(&title_raw),
            title_raw,
            org_title: strip_html(&coerce_str(data.get("org_title"))),
            cover: coerce_str(data.get("cover")),
            media_type: coerce_int(data.get("media_type"), 0),
            areas: coerce_str(data.get("areas")),
            styles: coerce_str(data.get("styles")),
            cv: coerce_str(data.get("cv")),
            staff: coerce_str(data.get("staff")),
            goto_url: coerce_str(data.get("goto_url")),
            desc: coerce_str(data.get("desc")),
            pubtime: coerce_int(data.get("pubtime"), 0),
            media_score,
            season_type_name: coerce_str(data.get("season_type_name")),
            ep_size: coerce_int(data.get("ep_size"), 0),
            eps: coerce_list(data.get("eps")),
            hit_columns: coerce_str_list(data.get("hit_columns")),
            url: coerce_str(data.get("url")),
            badges: coerce_list(data.get("badges")),
            raw: data.clone(),
        }
    }
}

impl LiveRoomItem {
    #[must_use]
    pub fn from_raw(data: &Value) -> Self {
        let title_raw = coerce_str(data.get("title"));
        Self {
            item_type: type_tag(data, "live_room"),
            roomid: coerce_int(data.get("roomid"), 0),
            uid: coerce_int(data.get("uid"), 0),
            title: strip_html(&title_raw),
            title_raw,
            uname: coerce_str(data.get("uname")),
            uface: coerce_str(data.get("uface")),
            cover: coerce_str(data.get("cover")),
            user_cover: coerce_str(data.get("user_cover")),
            online: coerce_int(data.get("online"), 0),
            attentions: coerce_int(data.get("attentions"), 0),
            cate_name: coerce_str(data.get("cate_name")),
            live_time: coerce_str(data.get("live_time")),
            tags: coerce_str(data.get("tags")),
            hit_columns: coerce_str_list(data.get("hit_columns")),
            rank_score: coerce_int(data.get("rank_score"), 0),
            raw: data.clone(),
        }
    }
}

impl LiveUserItem {
    #[must_use]
    pub fn from_raw(data: &Value) -> Self {
        let uname_raw = coerce_str(data.get("uname"));
        Self {
            item_type: type_tag(data, "live_user"),
            uid: coerce_int(data.get("uid"), 0),
            uname: strip_html(&uname_raw),
            uname_raw,
            uface: coerce_str(data.get("uface")),
            is_live: coerce_bool(data.get("is_live")),
            live_status: coerce_int(data.get("live_status"), 0),
            roomid: coerce_int(data.get("roomid"), 0),
            attentions: coerce_int(data.get("attentions"), 0),
            tags: coerce_str(data.get("tags")),
            live_time: coerce_str(data.get("live_time")),
            hit_columns: coerce_str_list(data.get("hit_columns")),
            rank_score: coerce_int(data.get("rank_score"), 0),
            raw: data.clone(),
        }
    }
}

impl ArticleItem {
    #[must_use]
    pub fn from_raw(data: &Value) -> Self {
        let title_raw = coerce_str(data.get("title"));
        Self {
            item_type: type_tag(data, "article"),
            id: coerce_int(data.get("id"), 0),
            title: strip_html(&title_raw),
            title_raw,
            mid: coerce_int(data.get("mid"), 0),
            desc: coerce_str(data.get("desc")),
            image_urls: coerce_str_list(data.get("image_urls")),
            view: coerce_int(data.get("view"), 0),
            like: coerce_int(data.get("like"), 0),
            reply: coerce_int(data.get("reply"), 0),
            pub_time: coerce_int(data.get("pub_time"), 0),
            category_name: coerce_str(data.get("category_name")),
            category_id: coerce_int(data.get("category_id"), 0),
            rank_score: coerce_int(data.get("rank_score"), 0),
            raw: data.clone(),
        }
    }
}

impl TopicItem {
    #[must_use]
    pub fn from_raw(data: &Value) -> Self {
        let title_raw = coerce_str(data.get("title"));
        Self {
            item_type: type_tag(data, "topic"),
            tp_id: coerce_int(data.get("tp_id"), 0),
            title: strip_html(&title_raw),
            title_raw,
            description: coerce_str(data.get("description")),
            author: coerce_str(data.get("author")),
            cover: coerce_str(data.get("cover")),
            arcurl: coerce_str(data.get("arcurl")),
            click: coerce_int(data.get("click"), 0),
            pubdate: coerce_int(data.get("pubdate"), 0),
            update: coerce_int(data.get("update"), 0),
            hit_columns: coerce_str_list(data.get("hit_columns")),
            rank_score: coerce_int(data.get("rank_score"), 0),
            raw: data.clone(),
        }
    }
}

impl UserItem {
    #[must_use]
    pub fn from_raw(data: &Value) -> Self {
        Self {
            item_type: type_tag(data, "bili_user"),
            mid: coerce_int(data.get("mid"), 0),
            uname: coerce_str(data.get("uname")),
            usign: coerce_str(data.get("usign")),
            fans: coerce_int(data.get("fans"), 0),
            videos: coerce_int(data.get("videos"), 0),
            upic: coerce_str(data.get("upic")),
            level: coerce_int(data.get("level"), 0),
            gender: coerce_int(data.get("gender"), 0),
            is_upuser: coerce_int(data.get("is_upuser"), 0),
            is_live: coerce_int(data.get("is_live"), 0),
            room_id: coerce_int(data.get("room_id"), 0),
            official_verify: data.get("official_verify").filter(|v| !v.is_null()).cloned(),
            res: coerce_list(data.get("res")),
            hit_columns: coerce_str_list(data.get("hit_columns")),
            raw: data.clone(),
        }
    }
}

impl PhotoItem {
    #[must_use]
    pub fn from_raw(data: &Value) -> Self {
        let title_raw = coerce_str(data.get("title"));
        Self {
            item_type: type_tag(data, "photo"),
            id: coerce_int(data.get("id"), 0),
            title: strip_html(&title_raw),
            title_raw,
            cover: coerce_str(data.get("cover")),
            count: coerce_int(data.get("count"), 0),
            mid: coerce_int(data.get("mid"), 0),
            uname: coerce_str(data.get("uname")),
            view: coerce_int(data.get("view"), 0),
            like: coerce_int(data.get("like"), 0),
            hit_columns: coerce_str_list(data.get("hit_columns")),
            rank_score: coerce_int(data.get("rank_score"), 0),
            raw: data.clone(),
        }
    }
}

impl PageInfo {
    #[must_use]
    pub fn from_raw(data: &Value) -> Self {
        Self {
            num_results: coerce_int(data.get("numResults"), 0),
            total: coerce_int(data.get("total"), 0),
            pages: coerce_int(data.get("pages"), 0),
        }
    }
}

// --- dispatch --------------------------------------------------------------

/// Parse one entry according to its category tag. Unknown tags are kept
/// verbatim under [`SearchItem::Other`].
#[must_use]
pub fn parse_item(result_type: &str, data: &Value) -> SearchItem {
    match result_type {
        "video" => SearchItem::Video(VideoItem::from_raw(data)),
        "media_bangumi" | "media_ft" => SearchItem::Media(MediaItem::from_raw(data, result_type)),
        "live_room" => SearchItem::LiveRoom(LiveRoomItem::from_raw(data)),
        "live_user" => SearchItem::LiveUser(LiveUserItem::from_raw(data)),
        "article" => SearchItem::Article(ArticleItem::from_raw(data)),
        "topic" => SearchItem::Topic(TopicItem::from_raw(data)),
        "bili_user" => SearchItem::User(UserItem::from_raw(data)),
        "photo" => SearchItem::Photo(PhotoItem::from_raw(data)),
        _ => SearchItem::Other(data.clone()),
    }
}

// Parse a result group, dropping duplicates already recorded in `seen`
// (first occurrence wins).
fn parse_items(result_type: &str, entries: &[Value], seen: &mut HashSet<String>) -> Vec<SearchItem> {
    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.is_null() {
            continue;
        }
        let item = parse_item(result_type, entry);
        if let Some(id) = item.identity() {
            if !seen.insert(id) {
                debug!(result_type, "dropping duplicate search hit");
                continue;
            }
        }
        items.push(item);
    }
    items
}

fn entries_of(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map_or(&[], Vec::as_slice)
}

// --- result containers -----------------------------------------------------

impl SearchAllResult {
    /// Parse a comprehensive-search payload. Total: protocol rejections and
    /// missing sections come back as data, never as a failure.
    #[must_use]
    pub fn from_raw(raw: Value) -> Self {
        let code = coerce_int(raw.get("code"), -1);
        let message = coerce_str(raw.get("message"));
        let data = raw.get("data").cloned().unwrap_or(Value::Null);

        let mut top_tlist = BTreeMap::new();
        if let Some(map) = data.get("top_tlist").and_then(Value::as_object) {
            for (category, total) in map {
                top_tlist.insert(category.clone(), coerce_int(Some(total), 0));
            }
        }

        let mut pageinfo = BTreeMap::new();
        if let Some(map) = data.get("pageinfo").and_then(Value::as_object) {
            for (category, info) in map {
                if info.is_object() {
                    pageinfo.insert(category.clone(), PageInfo::from_raw(info));
                }
            }
        }

        let mut entities: BTreeMap<String, Vec<SearchItem>> = BTreeMap::new();
        let mut seen: BTreeMap<String, HashSet<String>> = BTreeMap::new();
        for group in entries_of(data.get("result")) {
            let result_type = coerce_str(group.get("result_type"));
            if result_type.is_empty() {
                continue;
            }
            let group_seen = seen.entry(result_type.clone()).or_default();
            let items = parse_items(&result_type, entries_of(group.get("data")), group_seen);
            entities.entry(result_type).or_default().extend(items);
        }
        // Every counted category owns a sequence, even an empty one.
        for category in top_tlist.keys() {
            entities.entry(category.clone()).or_default();
        }

        let seid = coerce_str(data.get("seid"));
        let page = coerce_int(data.get("page"), 1);
        let page_size = coerce_int(data.get("pagesize"), 20);
        let num_results = coerce_int(data.get("numResults"), 0);
        let num_pages = coerce_int(data.get("numPages"), 0);
        let suggest_keyword = coerce_str(data.get("suggest_keyword"));

        Self {
            code,
            message,
            seid,
            page,
            page_size,
            num_results,
            num_pages,
            suggest_keyword,
            top_tlist,
            pageinfo,
            entities,
            raw,
        }
    }
}

impl SearchTypeResult {
    /// Parse a category-search payload for `search_type`. Total, like
    /// [`SearchAllResult::from_raw`].
    #[must_use]
    pub fn from_raw(raw: Value, search_type: SearchType) -> Self {
        let code = coerce_int(raw.get("code"), -1);
        let message = coerce_str(raw.get("message"));
        let data = raw.get("data").cloned().unwrap_or(Value::Null);

        // The live pseudo-category answers with an object of two sequences;
        // everything else with a flat array.
        let result = if search_type == SearchType::Live {
            let payload = data.get("result");
            let rooms = parse_items(
                "live_room",
                entries_of(payload.and_then(|r| r.get("live_room"))),
                &mut HashSet::new(),
            )
            .into_iter()
            .filter_map(|item| match item {
                SearchItem::LiveRoom(room) => Some(room),
                _ => None,
            })
            .collect();
            let users = parse_items(
                "live_user",
                entries_of(payload.and_then(|r| r.get("live_user"))),
                &mut HashSet::new(),
            )
            .into_iter()
            .filter_map(|item| match item {
                SearchItem::LiveUser(user) => Some(user),
                _ => None,
            })
            .collect();
            CategoryItems::Live { rooms, users }
        } else {
            let mut seen = HashSet::new();
            CategoryItems::Items(parse_items(
                search_type.as_str(),
                entries_of(data.get("result")),
                &mut seen,
            ))
        };

        Self {
            code,
            message,
            search_type,
            seid: coerce_str(data.get("seid")),
            page: coerce_int(data.get("page"), 1),
            page_size: coerce_int(data.get("pagesize"), 20),
            num_results: coerce_int(data.get("numResults"), 0),
            num_pages: coerce_int(data.get("numPages"), 0),
            result,
            raw,
        }
    }
}
