/// Checks if a host may be visited during a crawl rooted at `root_host`
///
/// 1. Exact match: the candidate equals the root host
/// 2. Subdomain match (only when `include_subdomains` is set): the candidate
///    ends with `.` followed by the root host, at any nesting level
///
/// Hosts are expected to be normalized (lowercase, no `www.` prefix).
///
/// # Examples
///
/// ```
/// use siphon::url::is_visitable_host;
///
/// assert!(is_visitable_host("example.com", "example.com", false));
/// assert!(!is_visitable_host("blog.example.com", "example.com", false));
/// assert!(is_visitable_host("blog.example.com", "example.com", true));
/// assert!(!is_visitable_host("notexample.com", "example.com", true));
/// ```
pub fn is_visitable_host(candidate: &str, root_host: &str, include_subdomains: bool) -> bool {
    if candidate == root_host {
        return true;
    }

    include_subdomains
        && candidate.len() > root_host.len() + 1
        && candidate.ends_with(root_host)
        && candidate.as_bytes()[candidate.len() - root_host.len() - 1] == b'.'
}
