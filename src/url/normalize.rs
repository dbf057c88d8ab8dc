use crate::UrlError;
use url::{Host, Url};

/// Normalizes a crawl target into its canonical, scheme-qualified domain form
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. Assume `https://` when no scheme is given
/// 3. Parse the URL; reject if malformed or not HTTP(S)
/// 4. Enforce HTTPS
/// 5. Lowercase the host and drop a trailing dot
/// 6. Validate the host as a dotted domain name or an IP address
/// 7. Drop path, query, fragment and credentials; keep an explicit port
///
/// # Arguments
///
/// * `target` - A bare domain or URL as entered by a user
///
/// # Returns
///
/// * `Ok(String)` - Canonical target such as `https://example.com`
/// * `Err(UrlError)` - The target cannot be turned into a crawlable site
///
/// # Examples
///
/// ```
/// use crawl_audit::url::normalize_target;
///
/// assert_eq!(normalize_target("example.com").unwrap(), "https://example.com");
/// assert_eq!(normalize_target("http://WWW.Example.com/blog/").unwrap(), "https://www.example.com");
/// ```
pub fn normalize_target(target: &str) -> Result<String, UrlError> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("target is empty".to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS targets are supported, got: {}",
            url.scheme()
        )));
    }

    if url.scheme() == "http" {
        url.set_scheme("https")
            .map_err(|_| UrlError::Malformed("cannot switch scheme to https".to_string()))?;
    }

    let host = match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_lowercase();
            validate_domain(&domain)?;
            domain
        }
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => format!("[{}]", addr),
        None => return Err(UrlError::MissingDomain),
    };

    Ok(match url.port() {
        Some(port) => format!("https://{}:{}", host, port),
        None => format!("https://{}", host),
    })
}

/// Validates a domain name (lowercase, no wildcard)
fn validate_domain(domain: &str) -> Result<(), UrlError> {
    if domain.is_empty() {
        return Err(UrlError::MissingDomain);
    }

    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(UrlError::Malformed(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
        || domain.contains("..")
    {
        return Err(UrlError::Malformed(format!(
            "Domain '{}' has an empty or malformed label",
            domain
        )));
    }

    // Must contain at least one dot (e.g., example.com, not just "example")
    if !domain.contains('.') {
        return Err(UrlError::Malformed(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
