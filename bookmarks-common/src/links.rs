//! URL display helpers for bookmark list rendering

use url::Url;

const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons";

/// Host portion of a bookmark URL, if it parses and has one
pub fn host(raw: &str) -> Option<String> {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Display name for a bookmark URL
///
/// The host with a leading `www.` removed; the raw URL when it has no host.
pub fn domain_name(raw: &str) -> String {
    match host(raw) {
        Some(host) => host.strip_prefix("www.").map(str::to_string).unwrap_or(host),
        None => raw.to_string(),
    }
}

/// 64px favicon URL for a bookmark, `None` when the URL has no host
pub fn favicon_url(raw: &str) -> Option<String> {
    let host = host(raw)?;
    let mut favicon = Url::parse(FAVICON_SERVICE).ok()?;
    favicon
        .query_pairs_mut()
        .append_pair("domain", &host)
        .append_pair("sz", "64");
    Some(favicon.into())
}
