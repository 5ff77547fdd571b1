//! High-level client for reading and writing PLC variables by name.
//!
//! This module provides the [`Client`] struct, the primary interface of the
//! crate.
//!
//! # Overview
//!
//! Every public operation is self-contained:
//!
//! 1. Validate the batch (names, types, values); nothing is sent if this fails
//! 2. Resolve every name into a handle (one round trip)
//! 3. Read or write by handle (one round trip)
//! 4. Decode the reply, or surface the fault
//!
//! Handles are never cached between calls; each call resolves them again.
//!
//! # Example
//!
//! ```no_run
//! use ads_webservice::{AmsNetId, Client, ClientConfig, ReadRequest, TypeTag, WriteRequest};
//!
//! let config = ClientConfig::new("192.168.1.10", "192.168.1.10.1.1".parse::<AmsNetId>()?);
//! let client = Client::new(config)?;
//!
//! let values = client.read(&[
//!     ReadRequest::new("MAIN.counter", TypeTag::Int32),
//!     ReadRequest::new("MAIN.temperature", TypeTag::Float32),
//! ])?;
//!
//! client.write(&[WriteRequest::new("MAIN.setpoint", 42u16)])?;
//! # Ok::<(), ads_webservice::AdsError>(())
//! ```
//!
//! # Thread Safety
//!
//! The client holds no mutable state. It is `Send + Sync` whenever its
//! channel is, and independent calls may run concurrently; each one blocks
//! for its own round trips.

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::address::{AmsAddr, AmsNetId, DEFAULT_ADS_PORT};
use crate::command::{
    AdsRequest, Handle, HandleCommand, ReadCommand, ReadRequest, WriteCommand, WriteRequest,
};
use crate::datatype::{PlcValue, TypeTag};
use crate::error::{AdsError, Result};
use crate::response::AdsResponse;
use crate::transport::{
    EnvelopeChannel, HttpTransport, DEFAULT_HTTP_PORT, DEFAULT_SERVICE_PATH, DEFAULT_TIMEOUT,
};
use crate::utils::format_bytes;

/// Configuration for creating a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Host name or IP address of the web service.
    pub host: String,
    /// HTTP port of the web service.
    pub http_port: u16,
    /// Endpoint path of the web service.
    pub path: String,
    /// ADS target behind the web service.
    pub target: AmsAddr,
    /// Time allowed for each round trip (connect, send and receive).
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration with default ports, path and timeout.
    ///
    /// # Arguments
    ///
    /// * `host` - Web service host (the path defaults to `/TcAdsWebService/TcAdsWebService.dll`)
    /// * `net_id` - AMS Net Id of the PLC runtime
    ///
    /// # Example
    ///
    /// ```
    /// use ads_webservice::{AmsNetId, ClientConfig};
    ///
    /// let config = ClientConfig::new("192.168.1.10", AmsNetId::new([192, 168, 1, 10, 1, 1]));
    /// assert_eq!(config.http_port, 80);
    /// assert_eq!(config.target.port, 851);
    /// ```
    pub fn new(host: impl Into<String>, net_id: AmsNetId) -> Self {
        Self {
            host: host.into(),
            http_port: DEFAULT_HTTP_PORT,
            path: DEFAULT_SERVICE_PATH.to_string(),
            target: AmsAddr::new(net_id, DEFAULT_ADS_PORT),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom HTTP port (default is 80).
    pub fn with_http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    /// Sets a custom ADS port (default is 851).
    ///
    /// # Example
    ///
    /// ```
    /// use ads_webservice::{AmsNetId, ClientConfig, TC2_ADS_PORT};
    ///
    /// let config = ClientConfig::new("plc", AmsNetId::new([5, 1, 2, 3, 1, 1]))
    ///     .with_ads_port(TC2_ADS_PORT);
    /// assert_eq!(config.target.port, 801);
    /// ```
    pub fn with_ads_port(mut self, port: u16) -> Self {
        self.target.port = port;
        self
    }

    /// Sets a custom endpoint path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets a custom timeout (default is 2 seconds).
    ///
    /// # Example
    ///
    /// ```
    /// use ads_webservice::{AmsNetId, ClientConfig};
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new("plc", AmsNetId::new([5, 1, 2, 3, 1, 1]))
    ///     .with_timeout(Duration::from_secs(5));
    /// ```
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client reading and writing PLC variables through the ADS web service.
///
/// Each operation resolves handles in one round trip and then reads or
/// writes in a second one. No automatic retries, caching, or reconnection.
pub struct Client<C = HttpTransport> {
    channel: C,
    target: AmsAddr,
}

impl Client<HttpTransport> {
    /// Creates a client talking HTTP to the configured web service.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is empty or the timeout is zero.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.host.trim().is_empty() {
            return Err(AdsError::invalid_parameter("host", "must not be empty"));
        }
        if config.timeout.is_zero() {
            return Err(AdsError::invalid_parameter("timeout", "must be greater than 0"));
        }

        let transport = HttpTransport::new(config.host, config.http_port, config.timeout)
            .with_path(config.path);
        Ok(Self::with_channel(config.target, transport))
    }
}

impl<C: EnvelopeChannel> Client<C> {
    /// Creates a client on top of any envelope channel.
    pub fn with_channel(target: AmsAddr, channel: C) -> Self {
        Self { channel, target }
    }

    /// Returns the ADS target.
    pub fn target(&self) -> AmsAddr {
        self.target
    }

    /// Returns the underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    fn exchange(&self, request: &AdsRequest) -> Result<AdsResponse> {
        trace!(payload = %format_bytes(&request.payload), "ADS command");
        match self.channel.round_trip(&self.target, request) {
            Ok(response) => {
                debug!(
                    index_group = request.index_group,
                    bytes = response.len(),
                    "ADS reply"
                );
                Ok(response)
            }
            Err(AdsError::Protocol(fault)) => {
                warn!(
                    code = fault.code(),
                    category = %fault.category(),
                    index_group = request.index_group,
                    "controller rejected request"
                );
                Err(AdsError::Protocol(fault))
            }
            Err(e) => Err(e),
        }
    }

    fn resolve(&self, command: &HandleCommand) -> Result<Vec<Handle>> {
        let response = self.exchange(&command.to_request()?)?;
        response.handles(command.len()).inspect_err(|e| {
            if let Some(fault) = e.fault() {
                warn!(
                    code = fault.code(),
                    category = %fault.category(),
                    "handle resolution failed"
                );
            }
        })
    }

    /// Resolves symbol names into handles.
    ///
    /// Returns exactly one handle per name, in request order. Duplicate names
    /// are resolved independently.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The batch is empty, or a name is empty or not ASCII (before any I/O)
    /// - Communication fails
    /// - Any name fails to resolve; the first failing status aborts the batch
    ///   and no handles are returned
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ads_webservice::{AmsNetId, Client, ClientConfig};
    ///
    /// let client = Client::new(ClientConfig::new("plc", "5.1.2.3.1.1".parse::<AmsNetId>()?))?;
    /// let handles = client.resolve_handles(&["MAIN.a", "MAIN.b"])?;
    /// assert_eq!(handles.len(), 2);
    /// # Ok::<(), ads_webservice::AdsError>(())
    /// ```
    pub fn resolve_handles<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Handle>> {
        let command = HandleCommand::new(names)?;
        self.resolve(&command)
    }

    /// Reads a batch of typed variables.
    ///
    /// Returns one value per request, in request order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The batch is invalid (before any I/O)
    /// - Communication fails
    /// - Handle resolution reports a fault, or the read envelope carries one
    /// - The reply is too short for the requested types
    pub fn read(&self, requests: &[ReadRequest]) -> Result<Vec<PlcValue>> {
        let names: Vec<&str> = requests.iter().map(|r| r.name.as_str()).collect();
        let tags: Vec<TypeTag> = requests.iter().map(|r| r.tag).collect();
        let resolve = HandleCommand::new(&names)?;

        let handles = self.resolve(&resolve)?;
        let command = ReadCommand::new(&handles, &tags)?;
        let response = self.exchange(&command.to_request()?)?;
        response.values(&tags)
    }

    /// Writes a batch of typed variables.
    ///
    /// On success the written values are echoed back in request order. This
    /// is an acknowledgement, not a read-back.
    ///
    /// The write is reported all or nothing, but the controller may have
    /// applied some of the values before rejecting the batch. After a fault
    /// the state of every variable in the batch is unknown; read them back if
    /// it matters.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The batch is invalid or a value cannot be encoded (before any I/O)
    /// - Communication fails
    /// - Handle resolution reports a fault, or the write envelope carries one
    pub fn write(&self, requests: &[WriteRequest]) -> Result<Vec<PlcValue>> {
        let names: Vec<&str> = requests.iter().map(|r| r.name.as_str()).collect();
        let encoded = requests
            .iter()
            .map(|r| r.value.encode().map(|bytes| (r.tag(), bytes)))
            .collect::<Result<Vec<_>>>()?;
        let resolve = HandleCommand::new(&names)?;

        let handles = self.resolve(&resolve)?;
        let command = WriteCommand::from_encoded(&handles, encoded)?;
        self.exchange(&command.to_request()?)?;

        Ok(requests.iter().map(|r| r.value.clone()).collect())
    }

    /// Reads a single variable.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ads_webservice::{AmsNetId, Client, ClientConfig, TypeTag};
    ///
    /// let client = Client::new(ClientConfig::new("plc", "5.1.2.3.1.1".parse::<AmsNetId>()?))?;
    /// let speed = client.read_value("MAIN.speed", TypeTag::Float64)?;
    /// println!("speed = {speed}");
    /// # Ok::<(), ads_webservice::AdsError>(())
    /// ```
    pub fn read_value(&self, name: &str, tag: TypeTag) -> Result<PlcValue> {
        self.read(&[ReadRequest::new(name, tag)])?
            .pop()
            .ok_or_else(|| AdsError::invalid_response("no value returned"))
    }

    /// Writes a single variable.
    pub fn write_value(&self, name: &str, value: impl Into<PlcValue>) -> Result<()> {
        self.write(&[WriteRequest::new(name, value)])?;
        Ok(())
    }
}

impl<C: std::fmt::Debug> std::fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("channel", &self.channel)
            .field("target", &self.target)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Channel replaying canned replies and recording every request.
    struct ScriptedChannel {
        replies: RefCell<Vec<Result<AdsResponse>>>,
        requests: RefCell<Vec<AdsRequest>>,
    }

    impl ScriptedChannel {
        fn new(replies: Vec<Result<AdsResponse>>) -> Self {
            Self {
                replies: RefCell::new(replies),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl EnvelopeChannel for ScriptedChannel {
        fn round_trip(&self, _target: &AmsAddr, request: &AdsRequest) -> Result<AdsResponse> {
            self.requests.borrow_mut().push(request.clone());
            self.replies.borrow_mut().remove(0)
        }
    }

    fn target() -> AmsAddr {
        AmsAddr::new(AmsNetId::new([5, 1, 2, 3, 1, 1]), DEFAULT_ADS_PORT)
    }

    fn handle_reply(handles: &[u32]) -> Result<AdsResponse> {
        let mut data = Vec::new();
        for _ in handles {
            data.extend_from_slice(&[0, 0, 0, 0, 4, 0, 0, 0]);
        }
        for h in handles {
            data.extend_from_slice(&h.to_le_bytes());
        }
        Ok(AdsResponse::new(data))
    }

    #[test]
    fn test_client_config_new() {
        let config = ClientConfig::new("10.0.0.1", AmsNetId::new([10, 0, 0, 1, 1, 1]));

        assert_eq!(config.host, "10.0.0.1");
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
        assert_eq!(config.path, DEFAULT_SERVICE_PATH);
        assert_eq!(config.target.port, DEFAULT_ADS_PORT);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_client_config_builders() {
        let config = ClientConfig::new("10.0.0.1", AmsNetId::new([10, 0, 0, 1, 1, 1]))
            .with_http_port(8080)
            .with_ads_port(801)
            .with_path("/ads")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.http_port, 8080);
        assert_eq!(config.target.port, 801);
        assert_eq!(config.path, "/ads");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_client_creation() {
        let config = ClientConfig::new("127.0.0.1", AmsNetId::new([127, 0, 0, 1, 1, 1]));
        let client = Client::new(config).unwrap();
        assert_eq!(client.channel().path(), DEFAULT_SERVICE_PATH);
        assert!(format!("{client:?}").contains("Client"));
    }

    #[test]
    fn test_client_rejects_empty_host() {
        let config = ClientConfig::new(" ", AmsNetId::new([127, 0, 0, 1, 1, 1]));
        assert!(Client::new(config).is_err());
    }

    #[test]
    fn test_client_rejects_zero_timeout() {
        let config = ClientConfig::new("127.0.0.1", AmsNetId::new([127, 0, 0, 1, 1, 1]))
            .with_timeout(Duration::ZERO);
        assert!(Client::new(config).is_err());
    }

    #[test]
    fn test_resolve_handles() {
        let channel = ScriptedChannel::new(vec![handle_reply(&[0x11, 0x22])]);
        let client = Client::with_channel(target(), channel);

        let handles = client.resolve_handles(&["Main.a", "Main.b"]).unwrap();
        assert_eq!(handles, vec![Handle::from(0x11), Handle::from(0x22)]);

        let requests = client.channel().requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].index_group, 61570);
        assert_eq!(requests[0].index_offset, 2);
        assert_eq!(requests[0].read_length, 24);
    }

    #[test]
    fn test_read_uses_resolved_handles() {
        let mut values = vec![0u8; 8];
        values.extend_from_slice(&[0x2A, 0x00, 0x01]);
        let channel = ScriptedChannel::new(vec![
            handle_reply(&[7, 9]),
            Ok(AdsResponse::new(values)),
        ]);
        let client = Client::with_channel(target(), channel);

        let result = client
            .read(&[
                ReadRequest::new("Main.a", TypeTag::Int16),
                ReadRequest::new("Main.b", TypeTag::Bool),
            ])
            .unwrap();
        assert_eq!(result, vec![PlcValue::Int16(42), PlcValue::Bool(true)]);

        let requests = client.channel().requests.borrow();
        assert_eq!(requests[1].index_group, 61568);
        assert_eq!(requests[1].read_length, 4 * 2 + 3);
        assert_eq!(&requests[1].payload[4..8], &[7, 0, 0, 0]);
        assert_eq!(&requests[1].payload[16..20], &[9, 0, 0, 0]);
    }

    #[test]
    fn test_read_empty_batch_sends_nothing() {
        let client = Client::with_channel(target(), ScriptedChannel::new(vec![]));
        let err = client.read(&[]).unwrap_err();
        assert!(err.is_configuration());
        assert!(client.channel().requests.borrow().is_empty());
    }

    #[test]
    fn test_write_bad_value_sends_nothing() {
        let client = Client::with_channel(target(), ScriptedChannel::new(vec![]));
        let err = client
            .write(&[WriteRequest::new("Main.s", "x".repeat(81))])
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(client.channel().requests.borrow().is_empty());
    }

    #[test]
    fn test_write_echoes_values() {
        let channel = ScriptedChannel::new(vec![
            handle_reply(&[3]),
            Ok(AdsResponse::new(vec![0, 0, 0, 0])),
        ]);
        let client = Client::with_channel(target(), channel);

        let written = client.write(&[WriteRequest::new("Main.a", 42u16)]).unwrap();
        assert_eq!(written, vec![PlcValue::Int16(42)]);

        let requests = client.channel().requests.borrow();
        assert_eq!(requests[1].index_group, 61569);
        assert_eq!(&requests[1].payload[12..], &[0x2A, 0x00]);
    }

    #[test]
    fn test_write_fault_aborts() {
        let channel = ScriptedChannel::new(vec![handle_reply(&[3]), Err(AdsError::protocol(1796))]);
        let client = Client::with_channel(target(), channel);

        let err = client.write_value("Main.a", 42u16).unwrap_err();
        assert_eq!(err.fault().map(|f| f.code()), Some(1796));
    }

    #[test]
    fn test_resolution_fault_skips_read() {
        let mut data = vec![0u8; 16];
        data[8] = 0x10;
        data[9] = 0x07; // 1808 on the second name
        data.extend_from_slice(&[0u8; 8]);
        let channel = ScriptedChannel::new(vec![Ok(AdsResponse::new(data))]);
        let client = Client::with_channel(target(), channel);

        let err = client
            .read(&[
                ReadRequest::new("Main.a", TypeTag::Int16),
                ReadRequest::new("Main.missing", TypeTag::Int16),
            ])
            .unwrap_err();
        assert_eq!(err.fault().map(|f| f.code()), Some(1808));
        assert_eq!(client.channel().requests.borrow().len(), 1);
    }

    #[test]
    fn test_read_value_bad_name_sends_nothing() {
        let client = Client::with_channel(target(), ScriptedChannel::new(vec![]));
        let err = client.read_value("", TypeTag::Int16).unwrap_err();
        assert!(matches!(err, AdsError::InvalidParameter { ref parameter, .. } if parameter == "name"));
        assert!(client.channel().requests.borrow().is_empty());
    }

    #[test]
    fn test_read_value_single() {
        let mut values = vec![0u8; 4];
        values.extend_from_slice(&1.5f64.to_le_bytes());
        let channel = ScriptedChannel::new(vec![handle_reply(&[1]), Ok(AdsResponse::new(values))]);
        let client = Client::with_channel(target(), channel);

        let value = client.read_value("Main.x", TypeTag::Float64).unwrap();
        assert_eq!(value, PlcValue::Float64(1.5));
    }
}
