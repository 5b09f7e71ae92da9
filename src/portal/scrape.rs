//! Screen-scraping of the portal's HTML pages.
//!
//! The portal exposes neither the CSRF token nor the meter identifier
//! through an API: both live inside inline `<script>` blocks. Every pattern
//! the client depends on is kept here so it can be swapped out when the
//! portal markup changes.

use crate::error::{Error, Result, TransportError};
use once_cell::sync::Lazy;
use regex::Regex;

// The token sits JSON-escaped inside a script block, e.g.
// `"csrfToken":"<token>","targetUrl`
// with literal backslashes in the page source.
static RE_CSRF_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"csrfToken\\u0022\\u003A\\u0022(.*)\\u0022,\\u0022targetUrl")
        .expect("csrf token pattern is valid")
});

// `'/mon-compte-en-ligne/statMData' + '/<counter id>'`
static RE_COUNTER_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"'/mon-compte-en-ligne/statMData'\s\+\s'/(\d+)'")
        .expect("counter id pattern is valid")
});

static RE_HEX_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\x([0-9a-fA-F]{2})").expect("hex escape pattern is valid"));

static RE_ORIGIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?)://([^/]+)/").expect("origin pattern is valid"));

/// Scheme and host (with port, if any) the portal answered from after the
/// login redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalOrigin {
    pub scheme: String,
    pub hostname: String,
}

impl PortalOrigin {
    /// Absolute URL of `path` on this origin.
    pub fn url(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme, self.hostname, path)
    }
}

/// Extracts the login form's CSRF token from the login page body.
///
/// The captured text is decoded with [`decode_unicode_escapes`].
pub fn extract_csrf_token(body: &str) -> Result<String> {
    let captures = RE_CSRF_TOKEN
        .captures(body)
        .ok_or_else(|| Error::data_not_found("CSRF token"))?;
    Ok(decode_unicode_escapes(&captures[1]))
}

/// Extracts the meter identifier from the consumption history page.
pub fn extract_counter_id(body: &str) -> Result<u64> {
    let captures = RE_COUNTER_ID
        .captures(body)
        .ok_or_else(|| Error::data_not_found("counter id"))?;
    captures[1]
        .parse::<u64>()
        .map_err(|_| Error::data_not_found("counter id"))
}

/// Resolves the origin from a response URL: scheme plus everything up to
/// the first `/` after it.
pub fn resolve_origin(url: &str) -> Result<PortalOrigin, TransportError> {
    let captures = RE_ORIGIN
        .captures(url)
        .ok_or_else(|| TransportError::UnexpectedUrl(url.to_string()))?;
    Ok(PortalOrigin {
        scheme: captures[1].to_string(),
        hostname: captures[2].to_string(),
    })
}

/// Looks up a cookie value in a `Cookie` header value (`a=1; b=2`).
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Decodes backslash escapes left in text scraped from a JSON string
/// literal.
///
/// `\xHH` is rewritten to `\u00HH`, then the text is decoded as a JSON
/// string. Text that does not decode (unknown or truncated escapes, bare
/// quotes) is returned unchanged.
pub fn decode_unicode_escapes(input: &str) -> String {
    let escaped = RE_HEX_ESCAPE.replace_all(input, r"\u00$1");
    serde_json::from_str::<String>(&format!("\"{}\"", escaped))
        .unwrap_or_else(|_| input.to_string())
}
