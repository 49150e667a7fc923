//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left as-is, like JavaScript's `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encode a value for use inside a query string
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Endpoint serving the batch that follows `cursor`
///
/// # Examples
/// ```ignore
/// load_more_url("https://x.cdn.prismic.io/api/v2/documents/search?page=2")
/// // -> "/api/posts?cursor=https%3A%2F%2Fx.cdn.prismic.io%2F..."
/// ```
pub fn load_more_url(cursor: &str) -> String {
    format!("/api/posts?cursor={}", encode_component(cursor))
}

/// Join the site url and a path without doubling slashes
pub fn full_url_for(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
