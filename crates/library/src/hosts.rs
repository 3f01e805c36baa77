//! Allowed embed hosts.
//!
//! One process-wide, read-only host set gates both embed URLs on resources
//! and `iframe` sources inside staff-authored HTML. There is no mutation path.

use std::collections::HashSet;
use std::sync::LazyLock;

use url::Url;

use crate::error::{LibraryError, LibraryResult};

/// Hostnames trusted as iframe/embed sources.
pub const ALLOWED_EMBED_HOSTS: &[&str] = &[
    "www.youtube.com",
    "youtube.com",
    "www.youtube-nocookie.com",
    "youtube-nocookie.com",
    "player.vimeo.com",
    "vimeo.com",
    "docs.google.com",
    "drive.google.com",
];

static ALLOWED_HOST_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ALLOWED_EMBED_HOSTS.iter().copied().collect());

/// The shared allowed host set.
pub fn allowed_embed_hosts() -> &'static HashSet<&'static str> {
    &ALLOWED_HOST_SET
}

/// Check a bare hostname against the allowed set (case-insensitive).
pub fn is_allowed_embed_host(host: &str) -> bool {
    !host.is_empty() && ALLOWED_HOST_SET.contains(host.to_ascii_lowercase().as_str())
}

/// Extract the lower-cased hostname from a URL.
///
/// Malformed URLs and URLs without a host yield an empty string, which is
/// never a member of the allowed set.
pub fn url_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_default()
}

/// Whether `url` is an `https` URL on an allowed host.
pub fn is_allowed_embed_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if parsed.scheme() != "https" {
        return false;
    }
    parsed.host_str().is_some_and(is_allowed_embed_host)
}

/// Return `url` unchanged if allowed, otherwise fail naming `context`.
pub fn assert_allowed_embed_url<'a>(url: &'a str, context: &str) -> LibraryResult<&'a str> {
    if is_allowed_embed_url(url) {
        Ok(url)
    } else {
        Err(LibraryError::EmbedNotAllowed {
            context: context.to_string(),
            url: url.to_string(),
        })
    }
}
