//! ADS status codes and the faults built from them.
//!
//! The controller reports failures as numeric status codes drawn from two
//! disjoint ranges:
//!
//! | Range | Class | Origin |
//! |-------|-------|--------|
//! | 1–27 | [`StatusClass::Router`] | AMS router (transport inside the controller) |
//! | 1792–1827 | [`StatusClass::Device`] | ADS device / service |
//! | 1856–1877 | [`StatusClass::Client`] | ADS client side of the web service |
//!
//! The table is closed. Codes outside it are still reported as a [`Fault`],
//! with the category `"unknown code N"`, because nothing on the wire bounds the
//! code space.
//!
//! # Example
//!
//! ```
//! use ads_webservice::{Fault, StatusClass};
//!
//! let fault = Fault::new(1808);
//! assert_eq!(fault.category(), "symbol not found");
//! assert_eq!(fault.class(), StatusClass::Device);
//!
//! let unknown = Fault::new(4242);
//! assert_eq!(unknown.category(), "unknown code 4242");
//! ```

use std::borrow::Cow;
use std::fmt;

/// Range a status code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// AMS router error (1–27).
    Router,
    /// ADS device or service error (1792–1827).
    Device,
    /// ADS client error (1856–1877).
    Client,
    /// Not covered by the table.
    Unknown,
}

impl StatusClass {
    /// Classifies a raw status code.
    pub fn of(code: u32) -> Self {
        match status_description(code) {
            None => StatusClass::Unknown,
            Some(_) => match code {
                1..=27 => StatusClass::Router,
                1792..=1827 => StatusClass::Device,
                _ => StatusClass::Client,
            },
        }
    }
}

/// Returns the controller's description of a status code.
///
/// Returns `None` for codes the table does not list, including `0` (success).
///
/// # Example
///
/// ```
/// use ads_webservice::status_description;
///
/// assert_eq!(status_description(6), Some("target port not found"));
/// assert_eq!(status_description(1795), Some("invalid index offset"));
/// assert_eq!(status_description(0), None);
/// ```
pub fn status_description(code: u32) -> Option<&'static str> {
    let text = match code {
        1 => "Internal error",
        2 => "No Rtime",
        3 => "Allocation locked memory error",
        4 => "Insert mailbox error",
        5 => "Wrong receive HMSG",
        6 => "target port not found",
        7 => "target machine not found",
        8 => "Unknown command ID",
        9 => "Bad task ID",
        10 => "No IO",
        11 => "Unknown AMS command",
        12 => "Win 32 error",
        13 => "Port not connected",
        14 => "Invalid AMS length",
        15 => "Invalid AMS Net ID",
        16 => "Low Installation level",
        17 => "No debug available",
        18 => "Port disabled",
        19 => "Port already connected",
        20 => "AMS Sync Win32 error",
        21 => "AMS Sync Timeout",
        22 => "AMS Sync AMS error",
        23 => "AMS Sync no index map",
        24 => "Invalid AMS port",
        25 => "No memory",
        26 => "TCP send error",
        27 => "Host unreachable",

        1792 => "error class <device error>",
        1793 => "Service is not supported by server",
        1794 => "invalid index group",
        1795 => "invalid index offset",
        1796 => "reading/writing not permitted",
        1797 => "parameter size not correct",
        1798 => "invalid parameter value(s)",
        1799 => "device is not in a ready state",
        1800 => "device is busy",
        1801 => "invalid context (must be in Windows)",
        1802 => "out of memory",
        1803 => "invalid parameter value(s)",
        1804 => "not found (files, ...)",
        1805 => "syntax error in command or file",
        1806 => "objects do not match",
        1807 => "object already exists",
        1808 => "symbol not found",
        1809 => "symbol version invalid",
        1810 => "server is in invalid state",
        1811 => "AdsTransMode not supported",
        1812 => "Notification handle is invalid",
        1813 => "Notification client not registered",
        1814 => "no more notification handles",
        1815 => "size for watch too big",
        1816 => "device not initialized",
        1817 => "device has a timeout",
        1818 => "query interface failed",
        1819 => "wrong interface required",
        1820 => "class ID is invalid",
        1821 => "object ID is invalid",
        1822 => "request is pending",
        1823 => "request is aborted",
        1824 => "signal warning",
        1825 => "invalid array index",
        1826 => "symbol not active -> release handle and try again",
        1827 => "access denied",

        1856 => "Error class <client error>",
        1857 => "invalid parameter at service",
        1858 => "polling list is empty",
        1859 => "var connection already in use",
        1860 => "invoke ID in use",
        1861 => "timeout elapsed",
        1862 => "error in win32 subsystem",
        1863 => "Invalid client timeout value",
        1864 => "ads-port not opened",
        1872 => "internal error in ads sync",
        1873 => "hash table overflow",
        1874 => "key not found in hash",
        1875 => "no more symbols in cache",
        1876 => "invalid response received",
        1877 => "sync port is locked",

        _ => return None,
    };
    Some(text)
}

/// A non-zero status reported by the controller.
///
/// Faults are plain values: they are handed to the caller inside
/// [`AdsError::Protocol`](crate::AdsError::Protocol) and never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fault {
    code: u32,
}

impl Fault {
    /// Creates a fault for a raw status code.
    pub fn new(code: u32) -> Self {
        Self { code }
    }

    /// Returns the raw status code.
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Returns the range the code belongs to.
    pub fn class(&self) -> StatusClass {
        StatusClass::of(self.code)
    }

    /// Returns whether the code is listed in the status table.
    pub fn is_known(&self) -> bool {
        status_description(self.code).is_some()
    }

    /// Returns the human-readable category, or `"unknown code N"`.
    pub fn category(&self) -> Cow<'static, str> {
        match status_description(self.code) {
            Some(text) => Cow::Borrowed(text),
            None => Cow::Owned(format!("unknown code {}", self.code)),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ADS error {} ({})", self.code, self.category())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_codes() {
        assert_eq!(status_description(1), Some("Internal error"));
        assert_eq!(status_description(27), Some("Host unreachable"));
        assert_eq!(StatusClass::of(7), StatusClass::Router);
    }

    #[test]
    fn test_device_codes() {
        assert_eq!(status_description(1792), Some("error class <device error>"));
        assert_eq!(status_description(1827), Some("access denied"));
        assert_eq!(StatusClass::of(1808), StatusClass::Device);
    }

    #[test]
    fn test_client_codes() {
        assert_eq!(status_description(1861), Some("timeout elapsed"));
        assert_eq!(status_description(1877), Some("sync port is locked"));
        assert_eq!(StatusClass::of(1864), StatusClass::Client);
        assert_eq!(StatusClass::of(1872), StatusClass::Client);
    }

    #[test]
    fn test_gaps_are_unknown() {
        for code in [0, 28, 1791, 1828, 1855, 1865, 1871, 1878, u32::MAX] {
            assert_eq!(status_description(code), None, "code {code}");
            assert_eq!(StatusClass::of(code), StatusClass::Unknown);
        }
    }

    #[test]
    fn test_fault_display() {
        let fault = Fault::new(1808);
        assert_eq!(fault.to_string(), "ADS error 1808 (symbol not found)");
        assert!(fault.is_known());
    }

    #[test]
    fn test_unknown_fault_category() {
        let fault = Fault::new(9999);
        assert!(!fault.is_known());
        assert_eq!(fault.category(), "unknown code 9999");
        assert_eq!(fault.to_string(), "ADS error 9999 (unknown code 9999)");
    }
}
