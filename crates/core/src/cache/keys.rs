//! Namespace prefix derivation and key composition.
//!
//! Every key written through the facade lives under a short prefix derived
//! from the configured domain, so several sites can share one database
//! without stepping on each other's keys.

/// Prefix used when no domain is configured.
pub const GLOBAL_PREFIX: &str = "global";

/// Number of hex characters of the domain digest kept as prefix.
pub const PREFIX_LEN: usize = 6;

/// Derives the namespace prefix for a domain.
///
/// The domain is normalized with [`normalize_domain`] and the first
/// [`PREFIX_LEN`] hex characters of its MD5 digest are returned. A missing or
/// blank domain maps to [`GLOBAL_PREFIX`].
///
/// The prefix is only meant to separate namespaces: 24 bits leave room for
/// accidental collisions and offer no protection against deliberate ones.
///
/// # Examples
///
/// ```
/// use domaincache_core::cache::namespace_prefix;
///
/// assert_eq!(namespace_prefix(None), "global");
/// assert_eq!(
///     namespace_prefix(Some("https://www.Example.com")),
///     namespace_prefix(Some("example.com/path")),
/// );
/// ```
pub fn namespace_prefix(domain: Option<&str>) -> String {
    let domain = domain.map(str::trim).unwrap_or_default();
    if domain.is_empty() {
        return GLOBAL_PREFIX.to_string();
    }

    let mut prefix = format!("{:x}", md5::compute(normalize_domain(domain)));
    prefix.truncate(PREFIX_LEN);
    prefix
}

/// Reduces a domain to the string that gets hashed into the prefix.
///
/// Scheme, `www.`, port, path, query, and case are dropped and only ASCII
/// alphanumerics of the host are kept, so `https://www.Example.com/shop` and
/// `example.com` normalize to the same `examplecom`.
pub fn normalize_domain(domain: &str) -> String {
    let host = extract_host(domain.trim());
    let host = host.strip_prefix("www.").unwrap_or(&host);
    host.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Returns the store key for a caller key under `prefix`.
pub fn namespaced_key(prefix: &str, key: &str) -> String {
    format!("{}:{}", prefix, key)
}

/// Returns the caller key for a store key, if it belongs to `prefix`.
pub fn strip_namespace<'a>(prefix: &str, key: &'a str) -> Option<&'a str> {
    key.strip_prefix(prefix)?.strip_prefix(':')
}

/// Slices the host out of a domain or URL without any IDNA or IPv4
/// normalization, so the hashed text is exactly what was configured.
fn extract_host(domain: &str) -> String {
    let lower = domain.to_ascii_lowercase();
    let rest = if lower.starts_with("http://") || lower.starts_with("https://") {
        domain.split_once("://").map_or(domain, |(_, rest)| rest)
    } else {
        domain.trim_start_matches('/')
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = match host.strip_prefix('[') {
        Some(ipv6) => ipv6.split(']').next().unwrap_or_default(),
        None => host.split(':').next().unwrap_or_default(),
    };
    host.to_ascii_lowercase()
}
