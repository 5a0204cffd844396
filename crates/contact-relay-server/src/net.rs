//! Actor address resolution.
//!
//! Best-effort original client address: forwarded-for-style headers are
//! preferred, but a forwarded value is only trusted when it parses as a
//! public (non-private, non-reserved) address. Otherwise anyone could
//! spoof their way out of the rate limit with `X-Forwarded-For: 10.0.0.1`.
//! Falls back to the direct connection address.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// Header names checked for the original client address, in trust order.
const FORWARDED_HEADERS: &[&str] = &["x-forwarded-for", "x-real-ip", "client-ip"];

/// Resolve the actor key for rate limiting and auditing.
#[must_use]
pub fn resolve_actor_addr(headers: &[(String, String)], peer_addr: Option<SocketAddr>) -> String {
    for header in FORWARDED_HEADERS {
        let Some(value) = header_value(headers, header) else {
            continue;
        };
        // Proxies append to the chain; the first entry is the origin.
        let first = value.split(',').next().unwrap_or("").trim();
        if let Ok(ip) = first.parse::<IpAddr>() {
            if is_public_ip(ip) {
                return ip.to_string();
            }
        }
    }

    peer_addr.map_or_else(|| "0.0.0.0".to_string(), |addr| addr.ip().to_string())
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Whether an address is routable enough to trust as a forwarded origin.
#[must_use]
pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => is_public_v6(v6),
    }
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    !(ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
        // Carrier-grade NAT (100.64.0.0/10)
        || (ip.octets()[0] == 100 && (ip.octets()[1] & 0xC0) == 64))
}

fn is_public_v6(ip: Ipv6Addr) -> bool {
    let seg0 = ip.segments()[0];
    !(ip.is_unspecified()
        || ip.is_loopback()
        // Unique local (fc00::/7)
        || (seg0 & 0xfe00) == 0xfc00
        // Link local (fe80::/10)
        || (seg0 & 0xffc0) == 0xfe80)
}
