use url::Url;

/// Extracts the lowercase host of a URL
///
/// A trailing root dot (`example.com.`) is dropped so that fully-qualified and
/// relative spellings of the same site map to the same domain.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use crawl_audit::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.com./path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .map(|h| h.trim_end_matches('.').to_lowercase())
        .filter(|h| !h.is_empty())
}
