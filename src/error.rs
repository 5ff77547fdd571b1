//! Error types for the ADS web service client.

use std::io;
use thiserror::Error;

use crate::status::Fault;

/// Result type alias for ADS operations.
pub type Result<T> = std::result::Result<T, AdsError>;

/// Errors that can occur while talking to the controller.
///
/// Variants fall into three groups:
///
/// - **Transport**: [`Io`](AdsError::Io), [`Timeout`](AdsError::Timeout),
///   [`Http`](AdsError::Http), [`InvalidResponse`](AdsError::InvalidResponse)
/// - **Protocol**: [`Protocol`](AdsError::Protocol), a non-zero status from the controller
/// - **Configuration**: [`InvalidParameter`](AdsError::InvalidParameter),
///   [`UnknownType`](AdsError::UnknownType), raised before any I/O
#[derive(Debug, Error)]
pub enum AdsError {
    /// Non-zero status reported by the controller.
    #[error("PLC fault: {0}")]
    Protocol(Fault),

    /// Invalid parameter provided by the caller.
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// Type name that does not map to a [`TypeTag`](crate::TypeTag).
    #[error("Unknown type '{name}'")]
    UnknownType {
        /// The unrecognized name.
        name: String,
    },

    /// Reply that could not be parsed or does not fit the request.
    #[error("Invalid response: {reason}")]
    InvalidResponse {
        /// Description of the response error.
        reason: String,
    },

    /// Web service answered with a non-success HTTP status and no fault code.
    #[error("HTTP error: status {status}")]
    Http {
        /// HTTP status code.
        status: u16,
    },

    /// Communication timeout.
    #[error("Communication timeout")]
    Timeout,

    /// I/O error during communication.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl AdsError {
    /// Creates a new `Protocol` error from a raw status code.
    ///
    /// # Example
    ///
    /// ```
    /// use ads_webservice::AdsError;
    ///
    /// let err = AdsError::protocol(1808);
    /// assert_eq!(err.to_string(), "PLC fault: ADS error 1808 (symbol not found)");
    /// ```
    pub fn protocol(code: u32) -> Self {
        Self::Protocol(Fault::new(code))
    }

    /// Creates a new `InvalidParameter` error.
    ///
    /// # Example
    ///
    /// ```
    /// use ads_webservice::AdsError;
    ///
    /// let err = AdsError::invalid_parameter("name", "must not be empty");
    /// ```
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `UnknownType` error.
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType { name: name.into() }
    }

    /// Creates a new `InvalidResponse` error.
    ///
    /// # Example
    ///
    /// ```
    /// use ads_webservice::AdsError;
    ///
    /// let err = AdsError::invalid_response("response too short");
    /// ```
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// Returns the controller fault if this is a protocol error.
    pub fn fault(&self) -> Option<Fault> {
        match self {
            Self::Protocol(fault) => Some(*fault),
            _ => None,
        }
    }

    /// Returns whether this error was raised from caller input, before any I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. } | Self::UnknownType { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_display() {
        let err = AdsError::protocol(1794);
        assert_eq!(
            err.to_string(),
            "PLC fault: ADS error 1794 (invalid index group)"
        );
        assert_eq!(err.fault().map(|f| f.code()), Some(1794));
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = AdsError::invalid_parameter("requests", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'requests': must not be empty"
        );
        assert!(err.is_configuration());
        assert!(err.fault().is_none());
    }

    #[test]
    fn test_unknown_type_display() {
        let err = AdsError::unknown_type("WSTRING");
        assert_eq!(err.to_string(), "Unknown type 'WSTRING'");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_timeout_display() {
        let err = AdsError::Timeout;
        assert_eq!(err.to_string(), "Communication timeout");
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_http_display() {
        let err = AdsError::Http { status: 404 };
        assert_eq!(err.to_string(), "HTTP error: status 404");
    }
}
