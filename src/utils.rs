//! Utility functions for formatting payloads and parsing textual requests.
//!
//! Requests can be written as short strings, which is handy for
//! configuration files and command-line tools:
//!
//! - read: `NAME:TYPE`, e.g. `MAIN.counter:DINT`
//! - write: `NAME:TYPE=VALUE`, e.g. `MAIN.setpoint:REAL=21.5`
//!
//! # Example
//!
//! ```
//! use ads_webservice::utils::{format_bytes, parse_read_request, parse_write_request};
//! use ads_webservice::{PlcValue, TypeTag};
//!
//! let read = parse_read_request("MAIN.counter:DINT").unwrap();
//! assert_eq!(read.name, "MAIN.counter");
//! assert_eq!(read.tag, TypeTag::Int32);
//!
//! let write = parse_write_request("MAIN.enable:BOOL=true").unwrap();
//! assert_eq!(write.value, PlcValue::Bool(true));
//!
//! assert_eq!(format_bytes(&[0x2A, 0x00]), "2A 00");
//! ```

use crate::command::{validate_name, ReadRequest, WriteRequest};
use crate::datatype::{PlcValue, TypeTag};
use crate::error::{AdsError, Result};

/// Formats bytes as space-separated uppercase hex pairs.
///
/// # Example
///
/// ```
/// use ads_webservice::utils::format_bytes;
///
/// assert_eq!(format_bytes(&[0x03, 0xF0, 0x00, 0x00]), "03 F0 00 00");
/// assert_eq!(format_bytes(&[]), "");
/// ```
pub fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses the textual form of a value of the given type.
///
/// Integers accept decimal or `0x`-prefixed hex. Booleans accept
/// `true`/`false`/`1`/`0` in any case. Strings are taken verbatim.
///
/// # Errors
///
/// Returns `AdsError::InvalidParameter` if the text is not a valid value.
///
/// # Example
///
/// ```
/// use ads_webservice::utils::parse_value;
/// use ads_webservice::{PlcValue, TypeTag};
///
/// assert_eq!(parse_value("0x2A", TypeTag::Int16).unwrap(), PlcValue::Int16(42));
/// assert_eq!(parse_value("1", TypeTag::Bool).unwrap(), PlcValue::Bool(true));
/// assert!(parse_value("70000", TypeTag::Int16).is_err());
/// ```
pub fn parse_value(text: &str, tag: TypeTag) -> Result<PlcValue> {
    let invalid = || AdsError::invalid_parameter("value", format!("'{text}' is not a valid {tag}"));
    let trimmed = text.trim();

    let value = match tag {
        TypeTag::Int16 => PlcValue::Int16(
            parse_unsigned(trimmed)
                .and_then(|v| u16::try_from(v).ok())
                .ok_or_else(invalid)?,
        ),
        TypeTag::Int32 => PlcValue::Int32(
            parse_unsigned(trimmed)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(invalid)?,
        ),
        TypeTag::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "1" => PlcValue::Bool(true),
            "false" | "0" => PlcValue::Bool(false),
            _ => return Err(invalid()),
        },
        TypeTag::Float32 => PlcValue::Float32(trimmed.parse().map_err(|_| invalid())?),
        TypeTag::Float64 => PlcValue::Float64(trimmed.parse().map_err(|_| invalid())?),
        TypeTag::FixedString => PlcValue::String(text.to_string()),
    };
    Ok(value)
}

fn parse_unsigned(text: &str) -> Option<u64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn split_name_and_type(text: &str) -> Result<(&str, TypeTag)> {
    let (name, tag) = text.rsplit_once(':').ok_or_else(|| {
        AdsError::invalid_parameter("request", format!("'{text}' is not NAME:TYPE"))
    })?;
    let name = name.trim();
    validate_name(name)?;
    Ok((name, tag.trim().parse()?))
}

/// Parses a read request written as `NAME:TYPE`.
///
/// The type is split at the last colon, so names may contain colons.
///
/// # Errors
///
/// Returns an error if the separator is missing, the name is invalid or the
/// type is unknown.
pub fn parse_read_request(text: &str) -> Result<ReadRequest> {
    let (name, tag) = split_name_and_type(text)?;
    Ok(ReadRequest::new(name, tag))
}

/// Parses a write request written as `NAME:TYPE=VALUE`.
///
/// The value is everything after the first `=`, kept verbatim for strings.
///
/// # Errors
///
/// Returns an error if a separator is missing, the name is invalid, the type
/// is unknown or the value does not parse.
pub fn parse_write_request(text: &str) -> Result<WriteRequest> {
    let (target, value) = text.split_once('=').ok_or_else(|| {
        AdsError::invalid_parameter("request", format!("'{text}' is not NAME:TYPE=VALUE"))
    })?;
    let (name, tag) = split_name_and_type(target)?;
    Ok(WriteRequest::new(name, parse_value(value, tag)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(&[0xAB]), "AB");
        assert_eq!(format_bytes(&[5, 240, 0, 0]), "05 F0 00 00");
        assert_eq!(format_bytes(&[0x00, 0x0F, 0xF0]), "00 0F F0");
    }

    #[test]
    fn test_parse_value_integers() {
        assert_eq!(parse_value("65535", TypeTag::Int16).unwrap(), PlcValue::Int16(65535));
        assert_eq!(
            parse_value("0xDEADBEEF", TypeTag::Int32).unwrap(),
            PlcValue::Int32(0xDEAD_BEEF)
        );
        assert!(parse_value("-1", TypeTag::Int16).is_err());
        assert!(parse_value("abc", TypeTag::Int32).is_err());
    }

    #[test]
    fn test_parse_value_bool() {
        assert_eq!(parse_value("TRUE", TypeTag::Bool).unwrap(), PlcValue::Bool(true));
        assert_eq!(parse_value("0", TypeTag::Bool).unwrap(), PlcValue::Bool(false));
        assert!(parse_value("yes", TypeTag::Bool).is_err());
    }

    #[test]
    fn test_parse_value_floats() {
        assert_eq!(parse_value("1.5", TypeTag::Float32).unwrap(), PlcValue::Float32(1.5));
        assert_eq!(parse_value("-2e3", TypeTag::Float64).unwrap(), PlcValue::Float64(-2000.0));
    }

    #[test]
    fn test_parse_value_string_is_verbatim() {
        assert_eq!(
            parse_value(" a b ", TypeTag::FixedString).unwrap(),
            PlcValue::String(" a b ".into())
        );
    }

    #[test]
    fn test_parse_read_request() {
        let request = parse_read_request("GVL.motor:speed:LREAL").unwrap();
        assert_eq!(request.name, "GVL.motor:speed");
        assert_eq!(request.tag, TypeTag::Float64);
    }

    #[test]
    fn test_parse_read_request_errors() {
        assert!(parse_read_request("MAIN.x").is_err());
        assert!(parse_read_request(":INT").is_err());
        assert!(matches!(
            parse_read_request("MAIN.x:WORD").unwrap_err(),
            AdsError::UnknownType { .. }
        ));
    }

    #[test]
    fn test_parse_write_request() {
        let request = parse_write_request("MAIN.msg:STRING=a=b").unwrap();
        assert_eq!(request.name, "MAIN.msg");
        assert_eq!(request.value, PlcValue::String("a=b".into()));

        assert!(parse_write_request("MAIN.x:INT").is_err());
        assert!(parse_write_request("MAIN.x:INT=big").is_err());
    }
}
