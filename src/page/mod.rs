//! The hosting page's URL surface: start parameters and overlay links.

pub mod overlay;
pub mod params;

pub use overlay::*;
pub use params::*;

/// Decode one parameter from a query string (with or without the leading
/// `?`). The first occurrence wins.
pub fn query_param(query: &str, key: &str) -> Option<String> {
    let query = query.trim_start_matches('?');
    let query = query.split('#').next().unwrap_or(query);

    for part in query.split('&') {
        let (k, v) = part.split_once('=').unwrap_or((part, ""));
        if k == key {
            let v = v.replace('+', " ");
            return urlencoding::decode(&v).ok().map(|d| d.into_owned());
        }
    }
    None
}
