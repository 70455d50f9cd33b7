//! Signing keys and mixin-key derivation.

use thiserror::Error;

/// Length both signing keys must have. The scramble table below indexes into
/// the 64-byte concatenation of the two keys, so anything else is unusable.
pub const WBI_KEY_LEN: usize = 32;

// Published by the web player bundle; indexes into `img_key + sub_key`.
#[rustfmt::skip]
const MIXIN_KEY_TABLE: [usize; 64] = [
    46, 47, 18, 2, 53, 8, 23, 32, 15, 50, 10, 31, 58, 3, 45, 35, 27, 43, 5, 49,
    33, 9, 42, 19, 29, 28, 14, 39, 12, 38, 41, 13, 37, 48, 7, 16, 24, 55, 40,
    61, 26, 17, 0, 1, 60, 51, 30, 4, 22, 25, 54, 21, 56, 59, 6, 63, 57, 62, 11,
    36, 20, 34, 44, 52,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WbiError {
    #[error("invalid signing key {0:?}: expected {WBI_KEY_LEN} ASCII characters")]
    InvalidKey(String),
}

/// The rotating `img_key` / `sub_key` pair extracted from the nav endpoint.
///
/// Construction validates both keys, so a held pair is always usable for
/// mixin-key derivation. The upstream rotates the pair roughly daily without
/// publishing an expiry; staleness is handled by the caller re-fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WbiKeys {
    img_key: String,
    sub_key: String,
}

impl WbiKeys {
    pub fn new(img_key: impl Into<String>, sub_key: impl Into<String>) -> Result<Self, WbiError> {
        let img_key = img_key.into();
        let sub_key = sub_key.into();
        for key in [&img_key, &sub_key] {
            if key.len() != WBI_KEY_LEN || !key.is_ascii() {
                return Err(WbiError::InvalidKey(key.clone()));
            }
        }
        Ok(Self { img_key, sub_key })
    }

    #[must_use]
    pub fn img_key(&self) -> &str {
        &self.img_key
    }

    #[must_use]
    pub fn sub_key(&self) -> &str {
        &self.sub_key
    }

    /// Derive the 32-character mixin key used to salt the request digest:
    /// scramble `img_key + sub_key` through the table, keep the first 32.
    #[must_use]
    pub fn mixin_key(&self) -> String {
        let concat: Vec<u8> = self.img_key.bytes().chain(self.sub_key.bytes()).collect();
        MIXIN_KEY_TABLE
            .iter()
            .take(WBI_KEY_LEN)
            .map(|&i| concat[i] as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference key pair from the public WBI documentation.
    const IMG_KEY: &str = "7cd084941338484aae1ad9425b84077c";
    const SUB_KEY: &str = "4932caff0ff746eab6f01bf08b70ac45";

    #[test]
    fn test_mixin_key_reference_vector() {
        let keys = WbiKeys::new(IMG_KEY, SUB_KEY).unwrap();
        assert_eq!(keys.mixin_key(), "ea1db124af3c7062474693fa704f4ff8");
    }

    #[test]
    fn test_mixin_key_is_32_chars() {
        let keys = WbiKeys::new("a".repeat(32), "b".repeat(32)).unwrap();
        assert_eq!(keys.mixin_key().len(), 32);
    }

    #[test]
    fn test_rejects_short_key() {
        let err = WbiKeys::new("too-short", SUB_KEY).unwrap_err();
        assert!(matches!(err, WbiError::InvalidKey(_)));
    }

    #[test]
    fn test_rejects_long_key() {
        assert!(WbiKeys::new(IMG_KEY, "x".repeat(33)).is_err());
    }

    #[test]
    fn test_rejects_non_ascii_key() {
        // 32 chars but not 32 bytes-worth of ASCII.
        let key = "猫".repeat(8) + "01234567";
        assert!(WbiKeys::new(key, SUB_KEY).is_err());
    }
}
