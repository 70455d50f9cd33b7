//! Deterministic parameter signing.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};

use crate::keys::WbiKeys;

/// Escape everything outside the RFC 3986 unreserved set. The digest is
/// computed over this exact encoding, so it must not drift.
const QUERY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Stringified parameters in transmission order, ending with `wts` and `w_rid`.
pub type SignedParams = Vec<(String, String)>;

/// Render one parameter value: objects and arrays become compact JSON with
/// their member order preserved, scalars become bare text (no JSON quoting).
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn encoded_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, QUERY_ESCAPE),
                utf8_percent_encode(v, QUERY_ESCAPE)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Sign `params` with `keys` at timestamp `wts`.
///
/// Every value is stringified, `wts` is added, and `w_rid` is the
/// lowercase-hex MD5 of the key-sorted, URL-encoded parameter set salted
/// with the mixin key. Pure and deterministic: identical inputs always yield
/// an identical `w_rid`, and only the timestamp varies between otherwise
/// equal requests. An empty parameter set is legal and signs over `wts`
/// alone. Any `wts` / `w_rid` already present in `params` is discarded.
#[must_use]
pub fn sign_params(params: &Map<String, Value>, keys: &WbiKeys, wts: i64) -> SignedParams {
    let mut flat: SignedParams = params
        .iter()
        .filter(|(k, _)| k.as_str() != "wts" && k.as_str() != "w_rid")
        .map(|(k, v)| (k.clone(), stringify(v)))
        .collect();
    flat.push(("wts".to_string(), wts.to_string()));

    let mut sorted = flat.clone();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let salted = format!("{}{}", encoded_query(&sorted), keys.mixin_key());
    let w_rid = format!("{:x}", md5::compute(salted));

    flat.push(("w_rid".to_string(), w_rid));
    flat
}
