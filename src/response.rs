//! ADS response unpacking.
//!
//! The controller answers a sum command with one undifferentiated byte buffer.
//! It is partitioned purely from the request batch: never from content markers.
//!
//! # Handle Resolution Reply
//!
//! | Region | Size | Content |
//! |--------|------|---------|
//! | Status records | 8 bytes × N | status code (LE u16 at record start), padding |
//! | Handles | 4 bytes × N | one handle per name, request order (trailing) |
//!
//! # Read Reply
//!
//! | Region | Size | Content |
//! |--------|------|---------|
//! | Status words | 4 bytes × N | not inspected |
//! | Values | Σ widths | one span per variable, request order (trailing) |
//!
//! # Example
//!
//! ```
//! use ads_webservice::{AdsResponse, Handle};
//!
//! // One successful record (status 0, length 4) followed by handle 7
//! let data = vec![0, 0, 0, 0, 4, 0, 0, 0, 7, 0, 0, 0];
//! let response = AdsResponse::new(data);
//!
//! let handles = response.handles(1).unwrap();
//! assert_eq!(handles, vec![Handle::from(7)]);
//! ```

use crate::command::{Handle, HANDLE_SIZE};
use crate::datatype::{PlcValue, TypeTag};
use crate::error::{AdsError, Result};

/// Size of one status record in a handle resolution reply.
pub const STATUS_RECORD_SIZE: usize = 8;

/// Raw binary reply of one sum command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdsResponse {
    /// Bytes returned by the controller.
    pub data: Vec<u8>,
}

impl AdsResponse {
    /// Wraps a raw reply buffer.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Returns the number of bytes in the reply.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether the reply carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn ensure_len(&self, needed: usize, what: &str) -> Result<()> {
        if self.data.len() < needed {
            return Err(AdsError::invalid_response(format!(
                "{what}: expected at least {needed} bytes, got {}",
                self.data.len()
            )));
        }
        Ok(())
    }

    /// Returns the per-name status codes of a handle resolution reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the reply is shorter than the status region.
    pub fn handle_statuses(&self, count: usize) -> Result<Vec<u16>> {
        self.ensure_len(count * STATUS_RECORD_SIZE, "handle status records")?;

        Ok(self.data[..count * STATUS_RECORD_SIZE]
            .chunks_exact(STATUS_RECORD_SIZE)
            .map(|record| u16::from_le_bytes([record[0], record[1]]))
            .collect())
    }

    /// Checks the status records of a handle resolution reply.
    ///
    /// The batch is all or nothing: the first non-zero status in request
    /// order fails the whole call.
    ///
    /// # Errors
    ///
    /// Returns `AdsError::Protocol` for the first non-zero status, or
    /// `AdsError::InvalidResponse` if the reply is too short.
    pub fn check_handle_statuses(&self, count: usize) -> Result<()> {
        match self.handle_statuses(count)?.into_iter().find(|&code| code != 0) {
            Some(code) => Err(AdsError::protocol(u32::from(code))),
            None => Ok(()),
        }
    }

    /// Unpacks the handles of a handle resolution reply.
    ///
    /// Statuses are checked first; the handles are the trailing `4 × count` bytes.
    ///
    /// # Errors
    ///
    /// Returns `AdsError::Protocol` if any status is non-zero, or
    /// `AdsError::InvalidResponse` if the reply is too short.
    pub fn handles(&self, count: usize) -> Result<Vec<Handle>> {
        self.check_handle_statuses(count)?;

        let needed = count * HANDLE_SIZE;
        self.ensure_len(needed, "handles")?;

        Ok(self.data[self.data.len() - needed..]
            .chunks_exact(HANDLE_SIZE)
            .map(|chunk| Handle::new([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }

    /// Decodes the trailing value spans of a read reply.
    ///
    /// # Errors
    ///
    /// Returns `AdsError::InvalidResponse` if the reply is shorter than the sum
    /// of the widths.
    ///
    /// # Example
    ///
    /// ```
    /// use ads_webservice::{AdsResponse, PlcValue, TypeTag};
    ///
    /// let data = vec![0, 0, 0, 0, 0x2A, 0x00];
    /// let values = AdsResponse::new(data).values(&[TypeTag::Int16]).unwrap();
    /// assert_eq!(values, vec![PlcValue::Int16(42)]);
    /// ```
    pub fn values(&self, tags: &[TypeTag]) -> Result<Vec<PlcValue>> {
        let total: usize = tags.iter().map(|t| t.width()).sum();
        self.ensure_len(total, "values")?;

        let mut offset = self.data.len() - total;
        let mut values = Vec::with_capacity(tags.len());
        for tag in tags {
            let end = offset + tag.width();
            values.push(PlcValue::decode(&self.data[offset..end], *tag)?);
            offset = end;
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_reply(statuses: &[u16], handles: &[u32]) -> AdsResponse {
        let mut data = Vec::new();
        for status in statuses {
            data.extend_from_slice(&u32::from(*status).to_le_bytes());
            data.extend_from_slice(&4u32.to_le_bytes());
        }
        for handle in handles {
            data.extend_from_slice(&handle.to_le_bytes());
        }
        AdsResponse::new(data)
    }

    #[test]
    fn test_handles_in_request_order() {
        let reply = handle_reply(&[0, 0, 0], &[0x10, 0x20, 0x30]);
        let handles = reply.handles(3).unwrap();
        assert_eq!(
            handles,
            vec![Handle::from(0x10), Handle::from(0x20), Handle::from(0x30)]
        );
    }

    #[test]
    fn test_handles_are_trailing_bytes() {
        let mut reply = handle_reply(&[0], &[]);
        reply.data.extend_from_slice(&[0xEE; 6]);
        reply.data.extend_from_slice(&[9, 0, 0, 0]);
        assert_eq!(reply.handles(1).unwrap(), vec![Handle::from(9)]);
    }

    #[test]
    fn test_first_nonzero_status_wins() {
        let reply = handle_reply(&[0, 1808, 1794], &[1, 2, 3]);
        let err = reply.handles(3).unwrap_err();
        assert_eq!(err.fault().map(|f| f.code()), Some(1808));
    }

    #[test]
    fn test_status_on_first_variable() {
        let reply = handle_reply(&[1808], &[0]);
        let fault = reply.handles(1).unwrap_err().fault().unwrap();
        assert_eq!(fault.category(), "symbol not found");
    }

    #[test]
    fn test_status_is_two_bytes_little_endian() {
        let mut data = vec![0u8; 8];
        data[0] = 0x10;
        data[1] = 0x07;
        // upper bytes of the record are ignored
        data[2] = 0xFF;
        data.extend_from_slice(&[0, 0, 0, 0]);
        let reply = AdsResponse::new(data);
        assert_eq!(reply.handle_statuses(1).unwrap(), vec![0x0710]);
    }

    #[test]
    fn test_handles_short_reply() {
        let reply = AdsResponse::new(vec![0; 7]);
        let err = reply.handles(1).unwrap_err();
        assert!(matches!(err, AdsError::InvalidResponse { .. }));
    }

    #[test]
    fn test_values_decoding() {
        let mut data = vec![0u8; 8];
        data.extend_from_slice(&[0x00, 0x2A]);
        data.extend_from_slice(&[0x00, 0x00, 0x80, 0x3F]);
        let reply = AdsResponse::new(data);

        let values = reply.values(&[TypeTag::Int16, TypeTag::Float32]).unwrap();
        assert_eq!(values, vec![PlcValue::Int16(0x2A00), PlcValue::Float32(1.0)]);
    }

    #[test]
    fn test_values_with_string() {
        let mut data = vec![0u8; 8];
        data.push(1);
        let mut slot = [0u8; 80];
        slot[..2].copy_from_slice(b"OK");
        data.extend_from_slice(&slot);

        let values = AdsResponse::new(data)
            .values(&[TypeTag::Bool, TypeTag::FixedString])
            .unwrap();
        assert_eq!(values, vec![PlcValue::Bool(true), PlcValue::String("OK".into())]);
    }

    #[test]
    fn test_values_short_reply() {
        let reply = AdsResponse::new(vec![0, 0, 0]);
        assert!(reply.values(&[TypeTag::Int32]).is_err());
    }
}
