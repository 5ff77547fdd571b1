//! AMS addressing.
//!
//! Every ADS request is routed to an AMS Net Id (six octets, written in dotted
//! form such as `5.1.204.160.1.1`) and an ADS port on that router. The web
//! service forwards the request to that address on the caller's behalf.
//!
//! # Example
//!
//! ```
//! use ads_webservice::AmsNetId;
//!
//! let net_id: AmsNetId = "5.1.204.160.1.1".parse().unwrap();
//! assert_eq!(net_id.octets(), [5, 1, 204, 160, 1, 1]);
//! assert_eq!(net_id.to_string(), "5.1.204.160.1.1");
//! ```

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::{AdsError, Result};

/// ADS port of the first TwinCAT 3 PLC runtime.
pub const DEFAULT_ADS_PORT: u16 = 851;

/// ADS port of the first TwinCAT 2 PLC runtime.
pub const TC2_ADS_PORT: u16 = 801;

/// Six-octet AMS router address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmsNetId([u8; 6]);

impl AmsNetId {
    /// Creates a net id from its six octets.
    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Derives the conventional net id of a host: its IPv4 address followed by `.1.1`.
    ///
    /// # Example
    ///
    /// ```
    /// use ads_webservice::AmsNetId;
    /// use std::net::Ipv4Addr;
    ///
    /// let net_id = AmsNetId::from_ip(Ipv4Addr::new(192, 168, 1, 10));
    /// assert_eq!(net_id.to_string(), "192.168.1.10.1.1");
    /// ```
    pub fn from_ip(ip: Ipv4Addr) -> Self {
        let [a, b, c, d] = ip.octets();
        Self([a, b, c, d, 1, 1])
    }

    /// Returns the six octets.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for AmsNetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a}.{b}.{c}.{d}.{e}.{g}")
    }
}

impl FromStr for AmsNetId {
    type Err = AdsError;

    fn from_str(s: &str) -> Result<Self> {
        let mut octets = [0u8; 6];
        let mut parts = s.trim().split('.');

        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(|| {
                AdsError::invalid_parameter("net_id", format!("'{s}' has fewer than 6 octets"))
            })?;
            *octet = part.parse().map_err(|_| {
                AdsError::invalid_parameter("net_id", format!("'{part}' is not an octet"))
            })?;
        }

        if parts.next().is_some() {
            return Err(AdsError::invalid_parameter(
                "net_id",
                format!("'{s}' has more than 6 octets"),
            ));
        }

        Ok(Self(octets))
    }
}

/// Full ADS target: router address and runtime port.
///
/// # Example
///
/// ```
/// use ads_webservice::{AmsAddr, AmsNetId};
///
/// let addr = AmsAddr::new("5.1.204.160.1.1".parse::<AmsNetId>().unwrap(), 851);
/// assert_eq!(addr.to_string(), "5.1.204.160.1.1:851");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmsAddr {
    /// Router address.
    pub net_id: AmsNetId,
    /// ADS port of the runtime.
    pub port: u16,
}

impl AmsAddr {
    /// Creates a target address.
    pub fn new(net_id: AmsNetId, port: u16) -> Self {
        Self { net_id, port }
    }
}

impl fmt::Display for AmsAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.net_id, self.port)
    }
}

impl From<[u8; 6]> for AmsNetId {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let net_id: AmsNetId = "10.0.0.5.1.1".parse().unwrap();
        assert_eq!(net_id, AmsNetId::new([10, 0, 0, 5, 1, 1]));
        assert_eq!(net_id.to_string(), "10.0.0.5.1.1");
    }

    #[test]
    fn test_parse_too_few_octets() {
        assert!("10.0.0.5.1".parse::<AmsNetId>().is_err());
    }

    #[test]
    fn test_parse_too_many_octets() {
        assert!("10.0.0.5.1.1.1".parse::<AmsNetId>().is_err());
    }

    #[test]
    fn test_parse_octet_out_of_range() {
        let err = "10.0.0.256.1.1".parse::<AmsNetId>().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_from_ip() {
        let net_id = AmsNetId::from_ip(Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(net_id.octets(), [127, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_ams_addr_display() {
        let addr = AmsAddr::new(AmsNetId::new([1, 2, 3, 4, 1, 1]), DEFAULT_ADS_PORT);
        assert_eq!(addr.to_string(), "1.2.3.4.1.1:851");
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(DEFAULT_ADS_PORT, 851);
        assert_eq!(TC2_ADS_PORT, 801);
    }
}
