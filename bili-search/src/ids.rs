//! `aid` / `bvid` codec and URL id extraction.
//!
//! The `BV` id is a base-58 rendition of the numeric `aid` behind an
//! XOR/mask obfuscation with two character-position swaps.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

const XOR_CODE: u64 = 23_442_827_791_579;
const MASK_CODE: u64 = 2_251_799_813_685_247;

const MIN_AID: u64 = 1;
const MAX_AID: u64 = 1 << 51;

const BASE: u64 = 58;
const BV_LEN: usize = 12;

const ALPHABET: &[u8; 58] = b"FcwAPNKTMug3GV5Lj7EJnHpWsx4tb8haYeviqBz6rkCy12mUSDQX9RdoZf";

static BVID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"BV[a-zA-Z0-9]+").expect("hardcoded regex compiles"));
static EPID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ep(\d+)").expect("hardcoded regex compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("aid {0} out of range [1, 2^51)")]
    AidOutOfRange(u64),

    #[error("invalid bvid {0:?}: {1}")]
    InvalidBvid(String, &'static str),
}

fn alphabet_index(ch: u8) -> Option<u64> {
    ALPHABET.iter().position(|&c| c == ch).map(|i| i as u64)
}

// The published id swaps characters 3<->9 and 4<->7 of the raw encoding.
fn swap_positions(bv: &mut [u8; BV_LEN]) {
    bv.swap(3, 9);
    bv.swap(4, 7);
}

/// Encode a numeric `aid` as its `BV1`-prefixed id.
pub fn av_to_bv(aid: u64) -> Result<String, IdError> {
    if !(MIN_AID..MAX_AID).contains(&aid) {
        return Err(IdError::AidOutOfRange(aid));
    }
    let mut bv = *b"BV1000000000";
    let mut idx = BV_LEN - 1;
    // Setting bit 51 pins the encoded width so every aid yields 12 chars.
    let mut tmp = (MAX_AID | aid) ^ XOR_CODE;
    while tmp != 0 {
        bv[idx] = ALPHABET[(tmp % BASE) as usize];
        tmp /= BASE;
        idx -= 1;
    }
    swap_positions(&mut bv);
    Ok(String::from_utf8_lossy(&bv).into_owned())
}

/// Decode a `BV1` id back to its numeric `aid`.
pub fn bv_to_av(bvid: &str) -> Result<u64, IdError> {
    let bytes = bvid.as_bytes();
    if bytes.len() != BV_LEN {
        return Err(IdError::InvalidBvid(
            bvid.to_string(),
            "must be 12 characters",
        ));
    }
    if &bytes[..3] != b"BV1" {
        return Err(IdError::InvalidBvid(
            bvid.to_string(),
            "must start with BV1",
        ));
    }
    let mut bv = [0u8; BV_LEN];
    bv.copy_from_slice(bytes);
    swap_positions(&mut bv);

    let mut acc: u64 = 0;
    for &ch in &bv[3..] {
        let digit = alphabet_index(ch).ok_or_else(|| {
            IdError::InvalidBvid(bvid.to_string(), "character outside the codec alphabet")
        })?;
        acc = acc * BASE + digit;
    }
    // A valid encoding always has bit 51 set, see av_to_bv.
    if acc.leading_zeros() != 12 {
        return Err(IdError::InvalidBvid(
            bvid.to_string(),
            "decoded value is not 52 bits",
        ));
    }
    let aid = (acc & MASK_CODE) ^ XOR_CODE;
    if !(MIN_AID..MAX_AID).contains(&aid) {
        return Err(IdError::InvalidBvid(
            bvid.to_string(),
            "decoded aid out of range",
        ));
    }
    Ok(aid)
}

/// First BV id found in `text` (typically a video URL), if any.
#[must_use]
pub fn extract_bvid(text: &str) -> Option<String> {
    BVID_RE.find(text).map(|m| m.as_str().to_string())
}

/// Episode id (`ep12345`) found in `text` (typically a bangumi URL), if any.
#[must_use]
pub fn extract_epid(text: &str) -> Option<String> {
    EPID_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| format!("ep{}", m.as_str()))
}
