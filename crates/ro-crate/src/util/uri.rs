//! URI and URL format checks.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    // Unreserved and reserved characters of a relative reference, plus
    // percent-encoded octets. A bare `%` outside an escape is rejected.
    static ref RELATIVE_REF_RE: Regex =
        Regex::new(r"^(?:[A-Za-z0-9._~!$&'()*+,;=:@/?#\[\]\-]|%[0-9a-fA-F]{2})*$")
            .expect("relative reference pattern is valid");
}

/// Returns true when `s` is a valid URI.
///
/// With `absolute_only` set, only absolute URIs (those that parse with
/// a scheme) are accepted. Otherwise a relative reference made of the
/// allowed character classes also passes, which covers crate-local ids
/// like `#alice` or `data/table.csv`.
pub fn is_valid_uri(s: &str, absolute_only: bool) -> bool {
    if Url::parse(s).is_ok() {
        return true;
    }
    if absolute_only {
        return false;
    }
    RELATIVE_REF_RE.is_match(s)
}

/// Returns true when `s` parses as an absolute URL with a scheme.
pub fn is_valid_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => !url.scheme().is_empty(),
        Err(_) => false,
    }
}
