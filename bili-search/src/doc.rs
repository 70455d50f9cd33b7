//! Document sentences and fingerprints.
//!
//! A "sentence" is the one-line text form of a video document
//! (`【owner】 title (tags) desc`), used for display and embedding. The
//! fingerprint is an MD5 prefix over a frozen variant of that sentence and
//! is what cross-page de-duplication keys on.

use crate::types::VideoItem;

/// Fingerprint length in hex characters.
pub const FINGERPRINT_LEN: usize = 4;

fn join_fields(title: &str, tags: &str, desc: &str, owner_name: &str) -> String {
    let mut sentence = String::new();

    let owner_name = owner_name.trim();
    if !owner_name.is_empty() {
        sentence.push_str(&format!("【{owner_name}】"));
    }

    let title = title.trim();
    if !title.is_empty() {
        if !sentence.is_empty() {
            sentence.push(' ');
        }
        sentence.push_str(title);
    }

    let tags = tags.trim();
    if !tags.is_empty() {
        if !sentence.is_empty() {
            sentence.push(' ');
        }
        sentence.push_str(&format!("({tags})"));
    }

    let desc = desc.trim();
    if !desc.is_empty() && desc != "-" {
        if !sentence.is_empty() {
            sentence.push(' ');
        }
        sentence.push_str(desc);
    }

    sentence
}

/// One-line text form of a document, truncated to `max_len` characters when
/// given. Free to evolve for display purposes; fingerprints do not use it.
#[must_use]
pub fn build_sentence(
    title: &str,
    tags: &str,
    desc: &str,
    owner_name: &str,
    max_len: Option<usize>,
) -> String {
    let sentence = join_fields(title, tags, desc, owner_name);
    match max_len {
        Some(limit) if sentence.chars().count() > limit => {
            sentence.chars().take(limit).collect()
        }
        _ => sentence,
    }
}

// Frozen sentence format backing the fingerprint. Must never change, or
// stored fingerprints stop matching.
fn build_sentence_stable(title: &str, tags: &str, desc: &str, owner_name: &str) -> String {
    join_fields(title, tags, desc, owner_name)
}

/// Short hex fingerprint over the stable sentence form.
#[must_use]
pub fn fingerprint(title: &str, tags: &str, desc: &str, owner_name: &str) -> String {
    let text = build_sentence_stable(title, tags, desc, owner_name);
    let digest = format!("{:x}", md5::compute(text.as_bytes()));
    digest.chars().take(FINGERPRINT_LEN).collect()
}

/// Fingerprint of a video search hit.
#[must_use]
pub fn video_fingerprint(item: &VideoItem) -> String {
    fingerprint(&item.title, &item.tag, &item.description, &item.author)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_field_order_and_wrapping() {
        let sentence = build_sentence("标题", "tag1,tag2", "简介", "UP主", None);
        assert_eq!(sentence, "【UP主】 标题 (tag1,tag2) 简介");
    }

    #[test]
    fn test_sentence_skips_empty_and_dash_fields() {
        assert_eq!(build_sentence("标题", "", "-", "", None), "标题");
        assert_eq!(build_sentence("", "", "", "", None), "");
    }

    #[test]
    fn test_sentence_truncates_by_characters() {
        let sentence = build_sentence("猫和老鼠大电影", "", "", "", Some(4));
        assert_eq!(sentence, "猫和老鼠");
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let first = fingerprint("标题", "tags", "desc", "owner");
        let second = fingerprint("标题", "tags", "desc", "owner");
        assert_eq!(first, second);
        assert_eq!(first.len(), FINGERPRINT_LEN);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_distinguishes_documents() {
        assert_ne!(
            fingerprint("标题一", "", "", ""),
            fingerprint("标题二", "", "", "")
        );
    }
}
