//! SSRF protection for outbound fetches.
//!
//! Every URL the pipeline fetches is attacker-influenced: saved URLs come
//! straight from users and `og:image` targets come from third-party pages.
//! The validator decides whether a URL may be fetched at all, and the
//! bounded fetcher re-invokes it for every redirect target before any bytes
//! of that hop are requested.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv6Addr};

use tokio::net::lookup_host;
use url::{Host, Url};

/// Outcome of validating a single URL. Ephemeral: a result must never be
/// reused for a different URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsrfValidationResult {
    pub is_allowed: bool,
    pub error_message: Option<String>,
}

impl SsrfValidationResult {
    fn allowed() -> Self {
        Self {
            is_allowed: true,
            error_message: None,
        }
    }

    fn blocked(message: impl Into<String>) -> Self {
        Self {
            is_allowed: false,
            error_message: Some(message.into()),
        }
    }
}

/// Decides whether a URL is safe for the server to fetch.
///
/// Blocks non-HTTP(S) schemes, hosts that fail DNS resolution (fails
/// closed), and any host resolving to a private, loopback, or link-local
/// address. IPv4-mapped IPv6 addresses are normalized to IPv4 before the
/// range checks so `::ffff:10.0.0.1` cannot slip through.
#[derive(Debug, Clone, Default)]
pub struct SsrfValidator {
    allowed_hosts: HashSet<String>,
}

impl SsrfValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exempt a host from address checks. Intended for test fixtures and
    /// local development against loopback servers.
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_hosts.insert(host.into());
        self
    }

    /// Validate a URL. Pure decision: no bytes are fetched.
    pub async fn validate(&self, raw_url: &str) -> SsrfValidationResult {
        let parsed = match Url::parse(raw_url) {
            Ok(url) => url,
            Err(_) => return SsrfValidationResult::blocked("Invalid URL"),
        };

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return SsrfValidationResult::blocked(format!("Scheme '{}' is not allowed", other))
            }
        }

        let host = match parsed.host() {
            Some(host) => host,
            None => return SsrfValidationResult::blocked("URL has no host"),
        };

        if self.allowed_hosts.contains(&host.to_string()) {
            return SsrfValidationResult::allowed();
        }

        let port = parsed.port_or_known_default().unwrap_or(80);

        let addrs: Vec<IpAddr> = match host {
            Host::Ipv4(ip) => vec![IpAddr::V4(ip)],
            Host::Ipv6(ip) => vec![IpAddr::V6(ip)],
            Host::Domain(domain) => match lookup_host((domain, port)).await {
                Ok(addrs) => addrs.map(|addr| addr.ip()).collect(),
                Err(_) => return SsrfValidationResult::blocked("DNS resolution failed"),
            },
        };

        if addrs.is_empty() {
            return SsrfValidationResult::blocked("DNS resolution failed");
        }

        for ip in addrs {
            if is_blocked_addr(ip) {
                return SsrfValidationResult::blocked(format!("Address {} is not allowed", ip));
            }
        }

        SsrfValidationResult::allowed()
    }
}

fn is_blocked_addr(ip: IpAddr) -> bool {
    // Normalize IPv4-mapped IPv6 so the IPv4 range checks apply.
    let ip = match ip {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(IpAddr::V4)
            .unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    };

    match ip {
        IpAddr::V4(v4) => {
            v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || is_unique_local(&v6)
                || is_unicast_link_local(&v6)
        }
    }
}

// fc00::/7
fn is_unique_local(ip: &Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xfe00) == 0xfc00
}

// fe80::/10
fn is_unicast_link_local(ip: &Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xffc0) == 0xfe80
}
