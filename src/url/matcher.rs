/// Checks whether a candidate domain falls under an allowed domain
///
/// An exact match always counts. With `include_subdomains`, any subdomain of
/// the allowed domain matches as well ("sports.example.com" under
/// "example.com"), but never a domain that merely ends with the same text
/// ("badexample.com").
///
/// # Examples
///
/// ```
/// use keystone_crawler::url::matches_domain;
///
/// assert!(matches_domain("example.com", "example.com", false));
/// assert!(!matches_domain("example.com", "blog.example.com", false));
/// assert!(matches_domain("example.com", "blog.example.com", true));
/// assert!(!matches_domain("example.com", "badexample.com", true));
/// ```
pub fn matches_domain(allowed: &str, candidate: &str, include_subdomains: bool) -> bool {
    if candidate == allowed {
        return true;
    }

    include_subdomains
        && candidate
            .strip_suffix(allowed)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
