//! ADS command structures and serialization.
//!
//! Every operation the client performs is a single ADS *sum command*: one
//! request that carries a fixed-size sub-request per variable, followed by a
//! tail region. Each command serializes itself into an [`AdsRequest`], the
//! addressing and payload handed to the envelope channel.
//!
//! # Command Types
//!
//! | Command | Index group | Per-variable header | Tail |
//! |---------|-------------|---------------------|------|
//! | [`HandleCommand`] | `0xF082` (61570) | 16 bytes | symbol names |
//! | [`ReadCommand`] | `0xF080` (61568) | 12 bytes | none |
//! | [`WriteCommand`] | `0xF081` (61569) | 12 bytes | encoded values |
//!
//! In all three the index offset is the number of variables in the batch.
//!
//! # Example
//!
//! ```
//! use ads_webservice::{HandleCommand, INDEX_GROUP_SUMUP_READWRITE};
//!
//! let cmd = HandleCommand::new(&["Main.a"]).unwrap();
//! let request = cmd.to_request().unwrap();
//!
//! assert_eq!(request.index_group, INDEX_GROUP_SUMUP_READWRITE);
//! assert_eq!(request.index_offset, 1);
//! assert_eq!(request.read_length, 12);
//! assert_eq!(&request.payload[..4], &[3, 240, 0, 0]);
//! assert_eq!(&request.payload[16..], b"Main.a");
//! ```

use std::fmt;

use crate::datatype::{PlcValue, TypeTag};
use crate::error::{AdsError, Result};

/// Sum command: several reads in one request.
pub const INDEX_GROUP_SUMUP_READ: u32 = 0xF080;
/// Sum command: several writes in one request.
pub const INDEX_GROUP_SUMUP_WRITE: u32 = 0xF081;
/// Sum command: several write-then-read transactions in one request.
pub const INDEX_GROUP_SUMUP_READWRITE: u32 = 0xF082;

/// Sub-request index group: get a symbol handle by name.
pub(crate) const INDEX_GROUP_GET_SYMHANDLE_BYNAME: u32 = 0xF003;
/// Sub-request index group: read/write a symbol value by handle.
pub(crate) const INDEX_GROUP_RW_SYMVAL_BYHANDLE: u32 = 0xF005;

/// Size of a symbol handle in bytes.
pub const HANDLE_SIZE: usize = 4;
/// Reply bytes reserved per symbol when resolving handles (status record + handle).
pub const HANDLE_RECORD_SIZE: usize = 12;
/// Size of one sub-request header when resolving handles.
pub const HANDLE_HEADER_SIZE: usize = 16;
/// Size of one sub-request header when reading or writing by handle.
pub const VALUE_HEADER_SIZE: usize = 12;
/// Reply bytes reserved per variable for its status when reading or writing.
pub const VALUE_STATUS_SIZE: usize = 4;

/// Opaque 4-byte symbol handle returned by the controller.
///
/// The bytes are used verbatim as the index offset of the by-handle
/// sub-requests. A handle is only meaningful within the call that resolved it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle([u8; HANDLE_SIZE]);

impl Handle {
    /// Creates a handle from its wire bytes.
    pub fn new(bytes: [u8; HANDLE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the wire bytes.
    pub fn bytes(&self) -> [u8; HANDLE_SIZE] {
        self.0
    }

    /// Returns the handle as the little-endian integer the controller uses.
    pub fn value(&self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

impl From<u32> for Handle {
    fn from(value: u32) -> Self {
        Self(value.to_le_bytes())
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.value())
    }
}

/// Addressing and payload of one ADS read/write transaction.
///
/// This is everything the envelope channel needs besides the target address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdsRequest {
    /// Index group (operation class).
    pub index_group: u32,
    /// Index offset (here always the variable count).
    pub index_offset: u32,
    /// Number of bytes requested back.
    pub read_length: u32,
    /// Binary command written to the controller.
    pub payload: Vec<u8>,
}

/// One variable to read: its symbol name and type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    /// Symbol name, e.g. `MAIN.counter`.
    pub name: String,
    /// Expected type.
    pub tag: TypeTag,
}

impl ReadRequest {
    /// Creates a read request.
    ///
    /// # Example
    ///
    /// ```
    /// use ads_webservice::{ReadRequest, TypeTag};
    ///
    /// let req = ReadRequest::new("MAIN.speed", TypeTag::Float32);
    /// ```
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            tag,
        }
    }
}

/// One variable to write: its symbol name and the new value.
///
/// The type written is the value's own [`PlcValue::tag`].
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    /// Symbol name, e.g. `MAIN.setpoint`.
    pub name: String,
    /// Value to write.
    pub value: PlcValue,
}

impl WriteRequest {
    /// Creates a write request.
    ///
    /// # Example
    ///
    /// ```
    /// use ads_webservice::WriteRequest;
    ///
    /// let req = WriteRequest::new("MAIN.setpoint", 42u16);
    /// ```
    pub fn new(name: impl Into<String>, value: impl Into<PlcValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the type that will be written.
    pub fn tag(&self) -> TypeTag {
        self.value.tag()
    }
}

/// Checks a symbol name before it goes on the wire.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AdsError::invalid_parameter("name", "must not be empty"));
    }
    if !name.is_ascii() {
        return Err(AdsError::invalid_parameter(
            "name",
            format!("'{name}' must be ASCII"),
        ));
    }
    Ok(())
}

/// Converts a byte or item count to the 32-bit field that carries it.
fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| AdsError::invalid_parameter(what, format!("{value} does not fit in 32 bits")))
}

fn ensure_not_empty(len: usize) -> Result<()> {
    if len == 0 {
        return Err(AdsError::invalid_parameter(
            "requests",
            "batch must contain at least one variable",
        ));
    }
    Ok(())
}

/// Command resolving symbol names into handles.
///
/// Layout per name: `[0xF003 LE, 0 LE, 4 LE, name length LE]` (four u32 fields),
/// then all names concatenated.
#[derive(Debug, Clone)]
pub struct HandleCommand {
    names: Vec<String>,
}

impl HandleCommand {
    /// Creates a handle resolution command.
    ///
    /// Duplicate names are allowed; each one is resolved independently.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch is empty or a name is empty or not ASCII.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        ensure_not_empty(names.len())?;
        for name in names {
            validate_name(name.as_ref())?;
        }

        Ok(Self {
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
        })
    }

    /// Returns the number of names in the batch.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns whether the batch is empty (never true for a constructed command).
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Serializes the command.
    pub fn to_request(&self) -> Result<AdsRequest> {
        let count = self.names.len();
        let names_len: usize = self.names.iter().map(String::len).sum();

        let mut payload = Vec::with_capacity(count * HANDLE_HEADER_SIZE + names_len);
        for name in &self.names {
            payload.extend_from_slice(&INDEX_GROUP_GET_SYMHANDLE_BYNAME.to_le_bytes());
            payload.extend_from_slice(&0u32.to_le_bytes());
            payload.extend_from_slice(&(HANDLE_SIZE as u32).to_le_bytes());
            payload.extend_from_slice(&to_u32(name.len(), "name")?.to_le_bytes());
        }
        for name in &self.names {
            payload.extend_from_slice(name.as_bytes());
        }

        Ok(AdsRequest {
            index_group: INDEX_GROUP_SUMUP_READWRITE,
            index_offset: to_u32(count, "requests")?,
            read_length: to_u32(count * HANDLE_RECORD_SIZE, "read_length")?,
            payload,
        })
    }
}

/// Writes the by-handle sub-request header shared by reads and writes.
fn push_value_header(payload: &mut Vec<u8>, handle: Handle, tag: TypeTag) {
    payload.extend_from_slice(&INDEX_GROUP_RW_SYMVAL_BYHANDLE.to_le_bytes());
    payload.extend_from_slice(&handle.bytes());
    payload.extend_from_slice(&(tag.width() as u32).to_le_bytes());
}

fn value_read_length(tags: impl Iterator<Item = TypeTag>, count: usize) -> Result<u32> {
    let widths: usize = tags.map(TypeTag::width).sum();
    to_u32(count * VALUE_STATUS_SIZE + widths, "read_length")
}

fn ensure_same_len(handles: usize, other: usize, what: &str) -> Result<()> {
    if handles != other {
        return Err(AdsError::invalid_parameter(
            what,
            format!("{other} entries for {handles} handles"),
        ));
    }
    Ok(())
}

/// Command reading several variables by handle.
///
/// Layout per variable: `[0xF005 LE, handle, width LE]`. No tail.
#[derive(Debug, Clone)]
pub struct ReadCommand {
    entries: Vec<(Handle, TypeTag)>,
}

impl ReadCommand {
    /// Creates a read command.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch is empty or the slices differ in length.
    ///
    /// # Example
    ///
    /// ```
    /// use ads_webservice::{Handle, ReadCommand, TypeTag};
    ///
    /// let cmd = ReadCommand::new(&[Handle::from(1)], &[TypeTag::Int16]).unwrap();
    /// let request = cmd.to_request().unwrap();
    /// assert_eq!(request.payload, vec![5, 240, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]);
    /// assert_eq!(request.read_length, 4 + 2);
    /// ```
    pub fn new(handles: &[Handle], tags: &[TypeTag]) -> Result<Self> {
        ensure_not_empty(handles.len())?;
        ensure_same_len(handles.len(), tags.len(), "tags")?;

        Ok(Self {
            entries: handles.iter().copied().zip(tags.iter().copied()).collect(),
        })
    }

    /// Returns the tags in request order.
    pub fn tags(&self) -> Vec<TypeTag> {
        self.entries.iter().map(|(_, tag)| *tag).collect()
    }

    /// Serializes the command.
    pub fn to_request(&self) -> Result<AdsRequest> {
        let count = self.entries.len();
        let mut payload = Vec::with_capacity(count * VALUE_HEADER_SIZE);
        for (handle, tag) in &self.entries {
            push_value_header(&mut payload, *handle, *tag);
        }

        Ok(AdsRequest {
            index_group: INDEX_GROUP_SUMUP_READ,
            index_offset: to_u32(count, "requests")?,
            read_length: value_read_length(self.entries.iter().map(|(_, t)| *t), count)?,
            payload,
        })
    }
}

/// Command writing several variables by handle.
///
/// Layout per variable: `[0xF005 LE, handle, width LE]`, then every encoded
/// value concatenated in request order.
#[derive(Debug, Clone)]
pub struct WriteCommand {
    entries: Vec<(Handle, TypeTag, Vec<u8>)>,
}

impl WriteCommand {
    /// Creates a write command, encoding each value.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch is empty, the slices differ in length,
    /// or a value cannot be encoded.
    pub fn new(handles: &[Handle], values: &[PlcValue]) -> Result<Self> {
        let encoded = values
            .iter()
            .map(|v| v.encode().map(|bytes| (v.tag(), bytes)))
            .collect::<Result<Vec<_>>>()?;
        Self::from_encoded(handles, encoded)
    }

    /// Creates a write command from values that are already encoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch is empty, the lengths differ, or a span
    /// does not match the width of its tag.
    pub fn from_encoded(handles: &[Handle], values: Vec<(TypeTag, Vec<u8>)>) -> Result<Self> {
        ensure_not_empty(handles.len())?;
        ensure_same_len(handles.len(), values.len(), "values")?;
        for (tag, bytes) in &values {
            if bytes.len() != tag.width() {
                return Err(AdsError::invalid_parameter(
                    "values",
                    format!("{} span is {} bytes, expected {}", tag, bytes.len(), tag.width()),
                ));
            }
        }

        Ok(Self {
            entries: handles
                .iter()
                .copied()
                .zip(values)
                .map(|(handle, (tag, bytes))| (handle, tag, bytes))
                .collect(),
        })
    }

    /// Serializes the command.
    pub fn to_request(&self) -> Result<AdsRequest> {
        let count = self.entries.len();
        let values_len: usize = self.entries.iter().map(|(_, t, _)| t.width()).sum();

        let mut payload = Vec::with_capacity(count * VALUE_HEADER_SIZE + values_len);
        for (handle, tag, _) in &self.entries {
            push_value_header(&mut payload, *handle, *tag);
        }
        for (_, _, bytes) in &self.entries {
            payload.extend_from_slice(bytes);
        }

        Ok(AdsRequest {
            index_group: INDEX_GROUP_SUMUP_WRITE,
            index_offset: to_u32(count, "requests")?,
            read_length: value_read_length(self.entries.iter().map(|(_, t, _)| *t), count)?,
            payload,
        })
    }
}
