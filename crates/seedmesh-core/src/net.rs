//! Address helpers

use std::net::IpAddr;

/// Normalize an advertised IP for use in a `host:port` dial address.
///
/// IPv4 (and IPv4-mapped IPv6) addresses are returned in dotted form, other
/// IPv6 addresses are bracketed. Returns `None` for anything that does not
/// parse as an IP address.
pub fn format_ip(ip: &str) -> Option<String> {
    match ip.parse::<IpAddr>().ok()? {
        IpAddr::V4(v4) => Some(v4.to_string()),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => Some(v4.to_string()),
            None => Some(format!("[{v6}]")),
        },
    }
}

/// Join a normalized IP and a port into a dial address.
pub fn dial_addr(ip: &str, port: i32) -> Option<String> {
    format_ip(ip).map(|ip| format!("{ip}:{port}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ipv4() {
        assert_eq!(format_ip("10.0.0.1").as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_format_ipv6_is_bracketed() {
        assert_eq!(format_ip("fe80::1").as_deref(), Some("[fe80::1]"));
        assert_eq!(format_ip("0:0:0:0:0:0:0:1").as_deref(), Some("[::1]"));
    }

    #[test]
    fn test_format_ipv4_mapped() {
        assert_eq!(format_ip("::ffff:192.168.1.9").as_deref(), Some("192.168.1.9"));
    }

    #[test]
    fn test_malformed_ip_rejected() {
        assert!(format_ip("").is_none());
        assert!(format_ip("seed-peer-1").is_none());
        assert!(format_ip("10.0.0.256").is_none());
        assert!(format_ip(" 10.0.0.1").is_none());
    }

    #[test]
    fn test_dial_addr() {
        assert_eq!(dial_addr("10.0.0.1", 65001).as_deref(), Some("10.0.0.1:65001"));
        assert_eq!(dial_addr("::2", 80).as_deref(), Some("[::2]:80"));
        assert!(dial_addr("bogus", 80).is_none());
    }
}
