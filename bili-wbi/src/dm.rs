//! Anti-crawl `dm_*` fingerprint parameters.
//!
//! The comprehensive search endpoint expects a browser-fingerprint bundle
//! alongside the signed parameters. The upstream only checks that the bundle
//! is well-formed, so the values mimic a plausible window/pointer fingerprint
//! rather than a real one.

use serde_json::{json, Map, Value};

/// Placeholder WebGL fingerprint string; the recognizable all-placeholder
/// pattern the web client sends before the real fingerprint is computed.
const DM_IMG_STR: &str = "XXcXXXVXXX";

const WIN_WIDTH: i64 = 1920;
const WIN_HEIGHT: i64 = 1080;
const SCROLL_TOP: i64 = 10;
const SCROLL_LEFT: i64 = 10;

/// Generator for the fixed-shape `dm_img_*` parameter bundle.
#[derive(Debug, Clone)]
pub struct DmParams {
    dm_img_str: String,
}

impl DmParams {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dm_img_str: DM_IMG_STR.to_string(),
        }
    }

    // Window-size triple: [2w + 2h + 3r, 4w - h + r, r] with r in [0, 114).
    fn calc_wh() -> [i64; 3] {
        let (w, h) = (WIN_WIDTH, WIN_HEIGHT);
        let rnd = (114.0 * rand::random::<f64>()).floor() as i64;
        [2 * w + 2 * h + 3 * rnd, 4 * w - h + rnd, rnd]
    }

    // Scroll-offset triple: [3t + 2l + r, 4t - 4l + 2r, r] with r in [0, 514).
    fn calc_of() -> [i64; 3] {
        let (t, l) = (SCROLL_TOP, SCROLL_LEFT);
        let rnd = (514.0 * rand::random::<f64>()).floor() as i64;
        [3 * t + 2 * l + rnd, 4 * t - 4 * l + 2 * rnd, rnd]
    }

    /// One bundle: empty image list, placeholder fingerprint strings and a
    /// fake pointer-interaction record. Merged into the parameter set before
    /// signing, so the nested values travel as compact JSON.
    #[must_use]
    pub fn generate(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("dm_img_list".to_string(), json!([]));
        params.insert(
            "dm_img_str".to_string(),
            Value::String(self.dm_img_str.clone()),
        );
        params.insert(
            "dm_cover_img_str".to_string(),
            Value::String(self.dm_img_str.clone()),
        );
        params.insert(
            "dm_img_inter".to_string(),
            json!({"wh": Self::calc_wh(), "of": Self::calc_of()}),
        );
        params
    }
}

impl Default for DmParams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_shape() {
        let bundle = DmParams::new().generate();
        let keys: Vec<&str> = bundle.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["dm_img_list", "dm_img_str", "dm_cover_img_str", "dm_img_inter"]
        );
        assert_eq!(bundle["dm_img_list"], json!([]));
        assert_eq!(bundle["dm_img_str"], json!(DM_IMG_STR));
        assert_eq!(bundle["dm_cover_img_str"], json!(DM_IMG_STR));
        assert!(bundle["dm_img_inter"].get("wh").is_some());
        assert!(bundle["dm_img_inter"].get("of").is_some());
    }

    #[test]
    fn test_wh_triple_is_consistent() {
        let [a, b, rnd] = DmParams::calc_wh();
        assert!((0..114).contains(&rnd));
        assert_eq!(a, 2 * WIN_WIDTH + 2 * WIN_HEIGHT + 3 * rnd);
        assert_eq!(b, 4 * WIN_WIDTH - WIN_HEIGHT + rnd);
    }

    #[test]
    fn test_of_triple_is_consistent() {
        let [a, b, rnd] = DmParams::calc_of();
        assert!((0..514).contains(&rnd));
        assert_eq!(a, 3 * SCROLL_TOP + 2 * SCROLL_LEFT + rnd);
        assert_eq!(b, 4 * SCROLL_TOP - 4 * SCROLL_LEFT + 2 * rnd);
    }
}
