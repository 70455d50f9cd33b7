//! WBI parameter signing for the Bilibili web API.
//!
//! The web endpoints authenticate requests with a keyed digest: two rotating
//! keys published by the nav endpoint are scrambled into a 32-character mixin
//! key, and every request carries a `wts` timestamp plus `w_rid`, the MD5 of
//! its sorted, URL-encoded parameters salted with that mixin key.
//!
//! This crate is the pure half of the protocol: no I/O, no clock, no hidden
//! state. Key fetching and caching live in the client crate.

pub mod dm;
pub mod keys;
pub mod sign;

pub use dm::DmParams;
pub use keys::{WbiError, WbiKeys, WBI_KEY_LEN};
pub use sign::{sign_params, SignedParams};
