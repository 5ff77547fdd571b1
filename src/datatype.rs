//! PLC data types and their wire encoding.
//!
//! This module defines [`TypeTag`], the closed set of PLC types the client can
//! exchange, and [`PlcValue`], a typed value of one of those types.
//!
//! # Type Table
//!
//! | Tag | PLC name | Width | Rust value |
//! |-----|----------|------:|------------|
//! | [`TypeTag::Int16`] | `INT` | 2 | `u16` |
//! | [`TypeTag::Int32`] | `DINT` | 4 | `u32` |
//! | [`TypeTag::Bool`] | `BOOL` | 1 | `bool` |
//! | [`TypeTag::Float32`] | `REAL` | 4 | `f32` |
//! | [`TypeTag::Float64`] | `LREAL` | 8 | `f64` |
//! | [`TypeTag::FixedString`] | `STRING` | 80 | `String` |
//!
//! # Byte Order
//!
//! Each value span on the wire is the byte-reversed form of its big-endian
//! encoding. Decoding reverses the span and then reads it big-endian; encoding
//! does the opposite.
//!
//! # Example
//!
//! ```
//! use ads_webservice::{PlcValue, TypeTag};
//!
//! let bytes = PlcValue::Int16(42).encode().unwrap();
//! assert_eq!(bytes, vec![0x2A, 0x00]);
//!
//! let value = PlcValue::decode(&bytes, TypeTag::Int16).unwrap();
//! assert_eq!(value, PlcValue::Int16(42));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{AdsError, Result};

/// Size of a `STRING` slot in bytes.
pub const STRING_SLOT_SIZE: usize = 80;

/// PLC data types supported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeTag {
    /// 16-bit integer (`INT`), decoded unsigned.
    Int16,
    /// 32-bit integer (`DINT`), decoded unsigned.
    Int32,
    /// Single-byte boolean (`BOOL`).
    Bool,
    /// IEEE-754 single precision (`REAL`).
    Float32,
    /// IEEE-754 double precision (`LREAL`).
    Float64,
    /// Fixed 80-byte ASCII string (`STRING`).
    FixedString,
}

impl TypeTag {
    /// All tags, in table order.
    pub const ALL: [TypeTag; 6] = [
        TypeTag::Int16,
        TypeTag::Int32,
        TypeTag::Bool,
        TypeTag::Float32,
        TypeTag::Float64,
        TypeTag::FixedString,
    ];

    /// Returns the number of bytes a value of this type occupies on the wire.
    ///
    /// # Example
    ///
    /// ```
    /// use ads_webservice::TypeTag;
    ///
    /// assert_eq!(TypeTag::Float64.width(), 8);
    /// assert_eq!(TypeTag::FixedString.width(), 80);
    /// ```
    pub fn width(self) -> usize {
        match self {
            TypeTag::Int16 => 2,
            TypeTag::Int32 => 4,
            TypeTag::Bool => 1,
            TypeTag::Float32 => 4,
            TypeTag::Float64 => 8,
            TypeTag::FixedString => STRING_SLOT_SIZE,
        }
    }

    /// Returns the IEC 61131-3 name used on the PLC side.
    pub fn plc_name(self) -> &'static str {
        match self {
            TypeTag::Int16 => "INT",
            TypeTag::Int32 => "DINT",
            TypeTag::Bool => "BOOL",
            TypeTag::Float32 => "REAL",
            TypeTag::Float64 => "LREAL",
            TypeTag::FixedString => "STRING",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plc_name())
    }
}

impl FromStr for TypeTag {
    type Err = AdsError;

    /// Parses a PLC type name (`INT`, `DINT`, `BOOL`, `REAL`, `LREAL`, `STRING`)
    /// or a symbolic tag name (`INT16`, `INT32`, `FLOAT32`, `FLOAT64`,
    /// `FIXED_STRING`). Matching is case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INT" | "INT16" => Ok(TypeTag::Int16),
            "DINT" | "INT32" => Ok(TypeTag::Int32),
            "BOOL" => Ok(TypeTag::Bool),
            "REAL" | "FLOAT32" => Ok(TypeTag::Float32),
            "LREAL" | "FLOAT64" => Ok(TypeTag::Float64),
            "STRING" | "FIXED_STRING" => Ok(TypeTag::FixedString),
            _ => Err(AdsError::unknown_type(s)),
        }
    }
}

/// A typed PLC value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlcValue {
    /// `INT` value.
    Int16(u16),
    /// `DINT` value.
    Int32(u32),
    /// `BOOL` value.
    Bool(bool),
    /// `REAL` value.
    Float32(f32),
    /// `LREAL` value.
    Float64(f64),
    /// `STRING` value (ASCII, at most 80 bytes).
    String(String),
}

impl PlcValue {
    /// Returns the type tag of this value.
    pub fn tag(&self) -> TypeTag {
        match self {
            PlcValue::Int16(_) => TypeTag::Int16,
            PlcValue::Int32(_) => TypeTag::Int32,
            PlcValue::Bool(_) => TypeTag::Bool,
            PlcValue::Float32(_) => TypeTag::Float32,
            PlcValue::Float64(_) => TypeTag::Float64,
            PlcValue::String(_) => TypeTag::FixedString,
        }
    }

    /// Encodes the value into its wire representation.
    ///
    /// The result is always exactly `self.tag().width()` bytes long.
    ///
    /// # Errors
    ///
    /// Returns `AdsError::InvalidParameter` if a string value is not ASCII or
    /// does not fit the 80-byte slot.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let bytes = match self {
            PlcValue::Int16(v) => reverse_span(&v.to_be_bytes()),
            PlcValue::Int32(v) => reverse_span(&v.to_be_bytes()),
            PlcValue::Bool(v) => vec![u8::from(*v)],
            PlcValue::Float32(v) => reverse_span(&v.to_be_bytes()),
            PlcValue::Float64(v) => reverse_span(&v.to_be_bytes()),
            PlcValue::String(s) => encode_string(s)?,
        };
        Ok(bytes)
    }

    /// Decodes a wire span into a value of the given type.
    ///
    /// # Errors
    ///
    /// Returns `AdsError::InvalidResponse` if `bytes` is not exactly
    /// `tag.width()` long.
    ///
    /// # Example
    ///
    /// ```
    /// use ads_webservice::{PlcValue, TypeTag};
    ///
    /// let value = PlcValue::decode(&[0x00, 0x00, 0x80, 0x3F], TypeTag::Float32).unwrap();
    /// assert_eq!(value, PlcValue::Float32(1.0));
    /// ```
    pub fn decode(bytes: &[u8], tag: TypeTag) -> Result<Self> {
        if bytes.len() != tag.width() {
            return Err(AdsError::invalid_response(format!(
                "{} value needs {} bytes, got {}",
                tag,
                tag.width(),
                bytes.len()
            )));
        }

        let be = reverse_span(bytes);
        let value = match tag {
            TypeTag::Int16 => PlcValue::Int16(u16::from_be_bytes([be[0], be[1]])),
            TypeTag::Int32 => PlcValue::Int32(u32::from_be_bytes([be[0], be[1], be[2], be[3]])),
            TypeTag::Bool => PlcValue::Bool(be[0] == 1),
            TypeTag::Float32 => {
                PlcValue::Float32(f32::from_be_bytes([be[0], be[1], be[2], be[3]]))
            }
            TypeTag::Float64 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&be);
                PlcValue::Float64(f64::from_be_bytes(raw))
            }
            TypeTag::FixedString => PlcValue::String(decode_string(&be)),
        };
        Ok(value)
    }

    /// Returns the value as `u16` if it is an `INT`.
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            PlcValue::Int16(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `u32` if it is a `DINT`.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            PlcValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `bool` if it is a `BOOL`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PlcValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `f32` if it is a `REAL`.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            PlcValue::Float32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `f64` if it is an `LREAL`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PlcValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `&str` if it is a `STRING`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PlcValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PlcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlcValue::Int16(v) => write!(f, "{v}"),
            PlcValue::Int32(v) => write!(f, "{v}"),
            PlcValue::Bool(v) => write!(f, "{v}"),
            PlcValue::Float32(v) => write!(f, "{v}"),
            PlcValue::Float64(v) => write!(f, "{v}"),
            PlcValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<u16> for PlcValue {
    fn from(v: u16) -> Self {
        PlcValue::Int16(v)
    }
}

impl From<u32> for PlcValue {
    fn from(v: u32) -> Self {
        PlcValue::Int32(v)
    }
}

impl From<bool> for PlcValue {
    fn from(v: bool) -> Self {
        PlcValue::Bool(v)
    }
}

impl From<f32> for PlcValue {
    fn from(v: f32) -> Self {
        PlcValue::Float32(v)
    }
}

impl From<f64> for PlcValue {
    fn from(v: f64) -> Self {
        PlcValue::Float64(v)
    }
}

impl From<&str> for PlcValue {
    fn from(v: &str) -> Self {
        PlcValue::String(v.to_string())
    }
}

impl From<String> for PlcValue {
    fn from(v: String) -> Self {
        PlcValue::String(v)
    }
}

/// Reverses a value span, converting between wire order and big-endian order.
pub(crate) fn reverse_span(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().rev().copied().collect()
}

/// Packs a string into its 80-byte slot: ASCII bytes, zero-padded.
fn encode_string(value: &str) -> Result<Vec<u8>> {
    if !value.is_ascii() {
        return Err(AdsError::invalid_parameter(
            "value",
            "STRING values must be ASCII",
        ));
    }
    if value.len() > STRING_SLOT_SIZE {
        return Err(AdsError::invalid_parameter(
            "value",
            format!(
                "STRING value is {} bytes, slot holds {}",
                value.len(),
                STRING_SLOT_SIZE
            ),
        ));
    }

    let mut slot = Vec::with_capacity(STRING_SLOT_SIZE);
    slot.extend_from_slice(value.as_bytes());
    slot.resize(STRING_SLOT_SIZE, 0);
    Ok(slot)
}

/// Recovers text from an already reversed slot.
///
/// The reversed slot holds the characters back to front, so the text is read
/// from the end of the slot and stops at the first zero byte.
fn decode_string(reversed: &[u8]) -> String {
    let text: Vec<u8> = reversed
        .iter()
        .rev()
        .copied()
        .take_while(|&b| b != 0)
        .collect();
    String::from_utf8_lossy(&text).into_owned()
}
