//! Domain membership matching.
//!
//! A URL is a target when its hostname equals one of the configured domains
//! or is a subdomain of one. Everything that cannot be parsed fails closed.

use url::Url;

/// Check whether a bare hostname falls under `domain`.
///
/// Both sides are compared case-insensitively and a trailing root dot is
/// ignored, so `WWW.Example.com.` matches `example.com`.
pub fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();

    if host.is_empty() || domain.is_empty() {
        return false;
    }

    host == domain || host.ends_with(&format!(".{domain}"))
}

/// Decide whether `url` belongs to any of `domains`.
///
/// Returns `false` for an empty domain set, an unparseable URL, or a URL
/// without a host.
pub fn is_target(url: &str, domains: &[String]) -> bool {
    if domains.is_empty() {
        return false;
    }

    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(url, error = %e, "invalid URL");
            return false;
        }
    };

    let Some(host) = parsed.host_str() else {
        return false;
    };

    tracing::debug!(hostname = host, "checking hostname");

    domains.iter().any(|domain| host_matches(host, domain))
}
