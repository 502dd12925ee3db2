use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the lowercase host of a URL, without port
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Derives the registrable domain of a parsed URL
///
/// The registrable domain is the host with a leading `www.` removed. Other
/// subdomains are kept as they are.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use keystone_crawler::url::domain_of;
///
/// let url = Url::parse("https://www.Example.com:8443/news").unwrap();
/// assert_eq!(domain_of(&url).unwrap(), "example.com");
/// ```
pub fn domain_of(url: &Url) -> UrlResult<String> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = extract_domain(url).ok_or(UrlError::MissingDomain)?;
    Ok(strip_www(&host).to_string())
}

/// Parses a raw URL string and derives its registrable domain
///
/// # Examples
///
/// ```
/// use keystone_crawler::url::registrable_domain;
///
/// assert_eq!(registrable_domain("https://www.inquirer.com/").unwrap(), "inquirer.com");
/// assert_eq!(registrable_domain("https://witf.org").unwrap(), "witf.org");
/// assert!(registrable_domain("not a url").is_err());
/// ```
pub fn registrable_domain(raw: &str) -> UrlResult<String> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;
    domain_of(&url)
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
