//! URL handling module for Linkwatch
//!
//! Links arrive from users in loose forms ("example.com/bio", "https://...").
//! This module turns them into absolute http(s) URLs before they are stored.

mod normalize;

pub use normalize::normalize_link_url;
