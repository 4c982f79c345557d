//! Country derivation from a fixed prefix table.
//!
//! Real IP geolocation is out of scope for this service; redirects only need
//! a coarse country bucket for the top-countries summary, so lookups go
//! through a small static table instead of a GeoIP database.

use std::net::IpAddr;

const LOCAL: &str = "Local";
const UNKNOWN: &str = "Unknown";

/// Address-prefix to country table, checked in order.
const COUNTRY_PREFIXES: &[(&str, &str)] = &[
    ("8.", "United States"),
    ("24.", "United States"),
    ("64.", "United States"),
    ("81.", "Germany"),
    ("90.", "France"),
    ("101.", "Australia"),
    ("103.", "India"),
    ("121.", "China"),
    ("133.", "Japan"),
    ("196.", "South Africa"),
    ("200.", "Brazil"),
    ("212.", "United Kingdom"),
];

pub fn country_for_ip(ip: &str) -> String {
    let Ok(addr) = ip.parse::<IpAddr>() else {
        return UNKNOWN.to_string();
    };

    if is_local(&addr) {
        return LOCAL.to_string();
    }

    COUNTRY_PREFIXES
        .iter()
        .find(|(prefix, _)| ip.starts_with(prefix))
        .map(|(_, country)| country.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn is_local(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_private() || v4.is_link_local(),
        IpAddr::V6(v6) => v6.is_loopback(),
    }
}
