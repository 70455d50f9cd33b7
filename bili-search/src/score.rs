//! Engagement/freshness document scoring.
//!
//! Produces a positive quality score for a video document from its
//! engagement counters and age. Each counter passes through a log-saturation
//! curve (diminishing returns), the weighted mix is damped when one or two
//! counters are wildly out of line with the rest, and the result is scaled
//! by a piecewise log-linear freshness factor. Extreme inputs stay bounded.

use crate::types::VideoItem;

/// Engagement counters of one document. Field names follow the upstream
/// archive stat block, not the search payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocStats {
    pub view: i64,
    pub like: i64,
    pub coin: i64,
    pub favorite: i64,
    pub danmaku: i64,
    pub reply: i64,
}

impl DocStats {
    /// Map a video search hit's counters onto scoring fields.
    #[must_use]
    pub fn from_video(item: &VideoItem) -> Self {
        Self {
            view: item.play,
            like: item.like,
            coin: item.coin,
            favorite: item.favorites,
            danmaku: item.video_review,
            reply: item.review,
        }
    }
}

// Per-field (weight, alpha) where alpha sets the half-saturation point
// x_half = e^alpha - 1. Weight tiers: coin ~ favorite > reply ~ danmaku ~
// like > view.
const FIELD_CONFIGS: [(f64, f64); 6] = [
    (1.0, 8.0), // view,     x_half ~ 2980
    (2.0, 5.5), // like,     x_half ~ 244
    (3.0, 4.5), // coin,     x_half ~ 89
    (3.0, 4.5), // favorite, x_half ~ 89
    (2.0, 5.5), // danmaku,  x_half ~ 244
    (2.0, 5.0), // reply,    x_half ~ 147
];
const TOTAL_WEIGHT: f64 = 13.0;

// Piecewise anchors (age_secs, factor) in log-time space. Newer than the
// first anchor pins at 1.30, older than the last pins at 0.45.
const TIME_ANCHORS: [(f64, f64); 6] = [
    (3_600.0, 1.30),     // 1 hour
    (86_400.0, 1.10),    // 1 day
    (259_200.0, 0.90),   // 3 days
    (604_800.0, 0.70),   // 7 days
    (1_296_000.0, 0.55), // 15 days
    (2_592_000.0, 0.45), // 30 days
];

const ANOMALY_MIN_LOG_SCALE: f64 = 0.5;
const ANOMALY_CONSISTENCY_THRESHOLD: f64 = 0.5;
const ANOMALY_MIN_FACTOR: f64 = 0.3;

/// Keeps the total strictly positive.
pub const BASE_SCORE: f64 = 0.01;

/// Scoring breakdown for debugging and ranking analysis.
#[derive(Debug, Clone, Copy)]
pub struct ScoreDetail {
    pub score: f64,
    pub stat_score: f64,
    pub anomaly_factor: f64,
    pub time_factor: f64,
    /// Saturated per-field scores in `DocStats` field order.
    pub field_scores: [f64; 6],
}

/// Document scorer over engagement counters and age.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocScorer;

impl DocScorer {
    fn field_values(stats: &DocStats) -> [f64; 6] {
        [
            stats.view,
            stats.like,
            stats.coin,
            stats.favorite,
            stats.danmaku,
            stats.reply,
        ]
        .map(|v| v.max(0) as f64)
    }

    // f(x) = ln(1+x) / (ln(1+x) + alpha), mapping [0, inf) into [0, 1)
    // with f(e^alpha - 1) = 0.5.
    fn saturate(x: f64, alpha: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        let log_val = x.ln_1p();
        log_val / (log_val + alpha)
    }

    // Weighted mean of the saturated field scores, in [0, 1).
    fn stat_score(stats: &DocStats) -> f64 {
        let values = Self::field_values(stats);
        let weighted: f64 = values
            .iter()
            .zip(FIELD_CONFIGS)
            .map(|(&value, (weight, alpha))| weight * Self::saturate(value, alpha))
            .sum();
        weighted / TOTAL_WEIGHT
    }

    // Consistency-based anomaly damping. Each field's value is normalized
    // by its half-saturation point and taken to log scale; when the mean of
    // those scales falls far below the max, one or two fields dominate and
    // the score is damped toward ANOMALY_MIN_FACTOR along a sqrt curve.
    fn anomaly_factor(stats: &DocStats) -> f64 {
        let values = Self::field_values(stats);
        let log_scales: Vec<f64> = values
            .iter()
            .zip(FIELD_CONFIGS)
            .map(|(&value, (_, alpha))| (value / alpha.exp_m1()).ln_1p())
            .collect();

        let max_log = log_scales.iter().fold(0.0_f64, |acc, &v| acc.max(v));
        if max_log < ANOMALY_MIN_LOG_SCALE {
            // Too little data to judge.
            return 1.0;
        }

        let mean_log: f64 = log_scales.iter().sum::<f64>() / log_scales.len() as f64;
        let consistency = mean_log / max_log;
        if consistency >= ANOMALY_CONSISTENCY_THRESHOLD {
            return 1.0;
        }

        let t = consistency / ANOMALY_CONSISTENCY_THRESHOLD;
        ANOMALY_MIN_FACTOR + (1.0 - ANOMALY_MIN_FACTOR) * t.sqrt()
    }

    // Freshness factor: constant outside the anchor range, log-linear
    // interpolation between anchors inside it.
    fn time_factor(age_secs: i64) -> f64 {
        let t = age_secs.max(0) as f64;
        let (first, last) = (TIME_ANCHORS[0], TIME_ANCHORS[TIME_ANCHORS.len() - 1]);
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        let log_t = t.ln();
        for window in TIME_ANCHORS.windows(2) {
            let (t0, f0) = window[0];
            let (t1, f1) = window[1];
            if t <= t1 {
                let frac = (log_t - t0.ln()) / (t1.ln() - t0.ln());
                return frac.mul_add(f1 - f0, f0);
            }
        }
        last.1
    }

    /// Score a document that is `age_secs` old. Always strictly positive.
    #[must_use]
    pub fn score(stats: &DocStats, age_secs: i64) -> f64 {
        let stat = Self::stat_score(stats);
        let anomaly = Self::anomaly_factor(stats);
        (BASE_SCORE + stat * anomaly) * Self::time_factor(age_secs)
    }

    /// [`Self::score`] with the full breakdown.
    #[must_use]
    pub fn score_detail(stats: &DocStats, age_secs: i64) -> ScoreDetail {
        let values = Self::field_values(stats);
        let mut field_scores = [0.0; 6];
        for (slot, (&value, (_, alpha))) in
            field_scores.iter_mut().zip(values.iter().zip(FIELD_CONFIGS))
        {
            *slot = Self::saturate(value, alpha);
        }
        let stat_score = Self::stat_score(stats);
        let anomaly_factor = Self::anomaly_factor(stats);
        let time_factor = Self::time_factor(age_secs);
        ScoreDetail {
            score: (BASE_SCORE + stat_score * anomaly_factor) * time_factor,
            stat_score,
            anomaly_factor,
            time_factor,
            field_scores,
        }
    }

    /// Score a video search hit as of `now` (unix seconds).
    #[must_use]
    pub fn score_video(item: &VideoItem, now: i64) -> f64 {
        Self::score(&DocStats::from_video(item), now - item.pubdate)
    }
}
