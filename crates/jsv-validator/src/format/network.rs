//! Host, address and URI formats.

use std::net::{Ipv4Addr, Ipv6Addr};

use url::Url;

use super::FormatAttribute;

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

fn is_hostname(value: &str) -> bool {
    if value.is_empty() || value.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    value.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    })
}

/// RFC 1034 host name.
#[derive(Debug, Clone, Copy)]
pub struct HostnameAttribute;

impl FormatAttribute for HostnameAttribute {
    fn description(&self) -> &str {
        "hostname"
    }

    fn is_valid(&self, value: &str) -> bool {
        is_hostname(value)
    }
}

/// `local@domain`, with a host-name domain.
#[derive(Debug, Clone, Copy)]
pub struct EmailAttribute;

impl FormatAttribute for EmailAttribute {
    fn description(&self) -> &str {
        "email address"
    }

    fn is_valid(&self, value: &str) -> bool {
        let Some((local, domain)) = value.rsplit_once('@') else {
            return false;
        };
        !local.is_empty()
            && local.len() <= 64
            && !local.contains('@')
            && !local.chars().any(|c| c.is_whitespace() || c.is_control())
            && is_hostname(domain)
    }
}

/// Dotted-quad IPv4 address.
#[derive(Debug, Clone, Copy)]
pub struct Ipv4Attribute;

impl FormatAttribute for Ipv4Attribute {
    fn description(&self) -> &str {
        "IPv4 address"
    }

    fn is_valid(&self, value: &str) -> bool {
        value.parse::<Ipv4Addr>().is_ok()
    }
}

/// RFC 4291 IPv6 address.
#[derive(Debug, Clone, Copy)]
pub struct Ipv6Attribute;

impl FormatAttribute for Ipv6Attribute {
    fn description(&self) -> &str {
        "IPv6 address"
    }

    fn is_valid(&self, value: &str) -> bool {
        value.parse::<Ipv6Addr>().is_ok()
    }
}

/// Absolute URI.
#[derive(Debug, Clone, Copy)]
pub struct UriAttribute;

impl FormatAttribute for UriAttribute {
    fn description(&self) -> &str {
        "URI"
    }

    fn is_valid(&self, value: &str) -> bool {
        !value.chars().any(char::is_whitespace) && Url::parse(value).is_ok()
    }
}
