//! URL handling module for crawl-audit
//!
//! This module turns user-entered crawl targets into the canonical form sent to
//! the audit provider and derives website identifiers from them.

mod domain;
mod normalize;

use ::url::Url;

// Re-export main functions
pub use domain::extract_domain;
pub use normalize::normalize_target;

/// Derives the website identifier of a normalized target
///
/// The identifier is the lowercase host (with port, if any), which is stable
/// across `http://`, `https://` and path variations of the same site.
///
/// # Examples
///
/// ```
/// use crawl_audit::url::website_id_for;
///
/// assert_eq!(website_id_for("https://example.com"), Some("example.com".to_string()));
/// assert_eq!(website_id_for("not a url"), None);
/// ```
pub fn website_id_for(normalized_target: &str) -> Option<String> {
    let url = Url::parse(normalized_target).ok()?;
    let domain = extract_domain(&url)?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", domain, port),
        None => domain,
    })
}
