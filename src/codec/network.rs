use std::net::IpAddr;

use crate::core::{InetAddr, Result, TypeError, Value};

/// `inet` and `cidr` text. A cidr value may not have bits set past its prefix.
pub fn decode_inet(text: &str, cidr: bool) -> Result<Value> {
    let type_name = if cidr { "cidr" } else { "inet" };
    let malformed = || TypeError::malformed(type_name, text);

    let trimmed = text.trim();
    let (address, prefix) = match trimmed.split_once('/') {
        Some((address, prefix)) => (address, Some(prefix)),
        None => (trimmed, None),
    };
    let addr: IpAddr = address.parse().map_err(|_| malformed())?;
    let max = InetAddr::max_prefix(&addr);
    let prefix = match prefix {
        Some(digits) => digits.parse::<u8>().ok().filter(|p| *p <= max).ok_or_else(malformed)?,
        None => max,
    };

    if cidr && has_host_bits(&addr, prefix) {
        return Err(malformed());
    }
    Ok(Value::Inet(InetAddr { addr, prefix }))
}

fn has_host_bits(addr: &IpAddr, prefix: u8) -> bool {
    match addr {
        IpAddr::V4(v4) => {
            let bits = u32::from(*v4);
            prefix < 32 && bits & (u32::MAX >> prefix) != 0
        }
        IpAddr::V6(v6) => {
            let bits = u128::from(*v6);
            prefix < 128 && bits & (u128::MAX >> prefix) != 0
        }
    }
}

/// inet drops the prefix of a single host; cidr always shows it.
#[must_use]
pub fn format_inet(value: &InetAddr, cidr: bool) -> String {
    if !cidr && value.is_host() {
        value.addr.to_string()
    } else {
        value.to_string()
    }
}

/// Normalise `08-00-2B-01-02-03`, `0800.2b01.0203` and friends to
/// `08:00:2b:01:02:03`. Both 6 and 8 byte addresses are accepted.
pub fn decode_macaddr(text: &str) -> Result<Value> {
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .collect();
    if !(digits.len() == 12 || digits.len() == 16) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(TypeError::malformed("macaddr", text));
    }
    let lower = digits.to_ascii_lowercase();
    let octets: Vec<&str> = (0..lower.len()).step_by(2).map(|i| &lower[i..i + 2]).collect();
    Ok(Value::String(octets.join(":")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_decode_inet() {
        let host = decode_inet("192.168.0.1", false).unwrap();
        assert_eq!(host, Value::Inet(InetAddr::host(IpAddr::V4(Ipv4Addr::new(192, 168, 0, 1)))));

        let subnet = decode_inet("192.168.0.1/24", false).unwrap();
        assert_eq!(subnet, Value::Inet(InetAddr { addr: IpAddr::V4(Ipv4Addr::new(192, 168, 0, 1)), prefix: 24 }));

        assert!(decode_inet("192.168.0.1/33", false).is_err());
        assert!(decode_inet("not-an-ip", false).is_err());
    }

    #[test]
    fn test_cidr_rejects_host_bits() {
        assert!(decode_inet("10.1.0.0/16", true).is_ok());
        assert!(decode_inet("10.1.2.0/16", true).is_err());
        assert!(decode_inet("2001:db8::/32", true).is_ok());
        assert!(decode_inet("2001:db8::1/32", true).is_err());
    }

    #[test]
    fn test_format_inet() {
        let host = InetAddr::host(IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(format_inet(&host, false), "::1");
        assert_eq!(format_inet(&host, true), "::1/128");
        let net = InetAddr { addr: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 0)), prefix: 8 };
        assert_eq!(format_inet(&net, false), "10.0.0.0/8");
    }

    #[test]
    fn test_decode_macaddr() {
        assert_eq!(decode_macaddr("08-00-2B-01-02-03").unwrap(), Value::String("08:00:2b:01:02:03".into()));
        assert_eq!(decode_macaddr("0800.2b01.0203").unwrap(), Value::String("08:00:2b:01:02:03".into()));
        assert_eq!(
            decode_macaddr("08:00:2b:01:02:03:04:05").unwrap(),
            Value::String("08:00:2b:01:02:03:04:05".into())
        );
        assert!(decode_macaddr("08:00:2b").is_err());
    }
}
