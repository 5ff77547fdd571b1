//! Envelope channel: carries one ADS transaction to the web service.
//!
//! The protocol layer only sees the [`EnvelopeChannel`] trait: hand it a
//! target and an [`AdsRequest`], get back the controller's [`AdsResponse`].
//! [`HttpTransport`] is the production implementation, a SOAP POST over a
//! plain TCP connection; tests substitute their own channel.
//!
//! # Design
//!
//! - **Protocol agnostic** - Knows envelopes and HTTP, not what the payload means
//! - **Synchronous** - One blocking round trip per call, bounded by one deadline
//! - **Simple** - A fresh connection per request, no pooling, no retries
//!
//! # Constants
//!
//! - [`DEFAULT_HTTP_PORT`] - Default web service port (80)
//! - [`DEFAULT_SERVICE_PATH`] - Path of the web service DLL
//! - [`DEFAULT_TIMEOUT`] - Default timeout (2 seconds)
//! - [`MAX_REPLY_SIZE`] - Largest reply accepted (1 MiB)
//!
//! # Example
//!
//! ```no_run
//! use ads_webservice::{AdsRequest, AmsAddr, AmsNetId, EnvelopeChannel, HttpTransport};
//! use std::time::Duration;
//!
//! let transport = HttpTransport::new("192.168.1.10", 80, Duration::from_secs(2));
//! let target = AmsAddr::new(AmsNetId::new([192, 168, 1, 10, 1, 1]), 851);
//! let request = AdsRequest {
//!     index_group: 0xF080,
//!     index_offset: 0,
//!     read_length: 0,
//!     payload: vec![],
//! };
//! let response = transport.round_trip(&target, &request);
//! ```

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::address::AmsAddr;
use crate::command::AdsRequest;
use crate::envelope::{decode_reply, encode_request};
use crate::error::{AdsError, Result};
use crate::response::AdsResponse;

/// Default HTTP port of the web service.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Path of the web service endpoint.
pub const DEFAULT_SERVICE_PATH: &str = "/TcAdsWebService/TcAdsWebService.dll";

/// Default timeout for connect, send and receive.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Maximum reply size accepted from the web service.
pub const MAX_REPLY_SIZE: usize = 1024 * 1024;

/// A channel able to carry one ADS transaction to a target and back.
///
/// Implementations must perform exactly one exchange per call. Sharing a
/// channel between threads is safe whenever the implementation is `Sync`.
pub trait EnvelopeChannel {
    /// Sends `request` to `target` and returns the raw binary reply.
    ///
    /// # Errors
    ///
    /// Transport failures, and `AdsError::Protocol` when the envelope reply
    /// carries a fault code.
    fn round_trip(&self, target: &AmsAddr, request: &AdsRequest) -> Result<AdsResponse>;
}

impl<T: EnvelopeChannel + ?Sized> EnvelopeChannel for &T {
    fn round_trip(&self, target: &AmsAddr, request: &AdsRequest) -> Result<AdsResponse> {
        (**self).round_trip(target, request)
    }
}

impl<T: EnvelopeChannel + ?Sized> EnvelopeChannel for Box<T> {
    fn round_trip(&self, target: &AmsAddr, request: &AdsRequest) -> Result<AdsResponse> {
        (**self).round_trip(target, request)
    }
}

/// SOAP-over-HTTP transport to the TcAdsWebService.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    host: String,
    port: u16,
    path: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport for the web service on `host:port`, using the default path.
    ///
    /// No connection is opened until the first request.
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            path: DEFAULT_SERVICE_PATH.to_string(),
            timeout,
        }
    }

    /// Creates a transport on port 80 with the default timeout.
    pub fn with_defaults(host: impl Into<String>) -> Self {
        Self::new(host, DEFAULT_HTTP_PORT, DEFAULT_TIMEOUT)
    }

    /// Sets a custom endpoint path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Returns the web service host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the web service port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the endpoint path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the time allowed for one round trip.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn connect(&self, deadline: Instant) -> Result<TcpStream> {
        let mut last_err = None;
        for addr in (self.host.as_str(), self.port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, remaining(deadline)?) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => map_io_error(e),
            None => AdsError::invalid_parameter(
                "host",
                format!("'{}' did not resolve to any address", self.host),
            ),
        })
    }

    /// Posts a SOAP body and returns the HTTP status and reply body.
    ///
    /// The whole exchange (connect, send, receive) must finish before the
    /// transport timeout elapses. Name resolution is not covered.
    fn post(&self, body: &str) -> Result<(u16, Vec<u8>)> {
        let deadline = Instant::now() + self.timeout;
        let mut stream = self.connect(deadline)?;

        let head = format!(
            "POST {} HTTP/1.1\r\nHost: {}:{}\r\nContent-Type: text/xml; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.path,
            self.host,
            self.port,
            body.len()
        );
        stream.set_write_timeout(Some(remaining(deadline)?))?;
        stream.write_all(head.as_bytes()).map_err(map_io_error)?;
        stream.write_all(body.as_bytes()).map_err(map_io_error)?;
        stream.flush().map_err(map_io_error)?;

        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            stream.set_read_timeout(Some(remaining(deadline)?))?;
            let n = match stream.read(&mut chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_io_error(e)),
            };
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
            if raw.len() > MAX_REPLY_SIZE {
                return Err(AdsError::invalid_response(format!(
                    "reply exceeds {MAX_REPLY_SIZE} bytes"
                )));
            }
        }

        parse_http_reply(&raw)
    }
}

impl EnvelopeChannel for HttpTransport {
    fn round_trip(&self, target: &AmsAddr, request: &AdsRequest) -> Result<AdsResponse> {
        debug!(
            host = %self.host,
            target = %target,
            index_group = request.index_group,
            index_offset = request.index_offset,
            read_length = request.read_length,
            "sending ADS request"
        );

        let body = encode_request(target, request);
        let (status, reply) = self.post(&body)?;
        let text = String::from_utf8_lossy(&reply);
        trace!(status, bytes = reply.len(), "received web service reply");

        if (200..300).contains(&status) {
            return decode_reply(&text);
        }

        // SOAP faults arrive with HTTP 500; keep the controller's code when present.
        match decode_reply(&text) {
            Err(err @ AdsError::Protocol(_)) => Err(err),
            _ => Err(AdsError::Http { status }),
        }
    }
}

/// Time left before `deadline`, or `Timeout` once it has passed.
fn remaining(deadline: Instant) -> Result<Duration> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|left| !left.is_zero())
        .ok_or(AdsError::Timeout)
}

fn map_io_error(e: io::Error) -> AdsError {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => AdsError::Timeout,
        _ => AdsError::Io(e),
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Splits a raw HTTP/1.x reply into status code and body.
///
/// Interim `1xx` heads (such as `100 Continue`) are skipped.
fn parse_http_reply(mut raw: &[u8]) -> Result<(u16, Vec<u8>)> {
    loop {
        let split = find_subslice(raw, b"\r\n\r\n")
            .ok_or_else(|| AdsError::invalid_response("HTTP reply has no header terminator"))?;
        let head = String::from_utf8_lossy(&raw[..split]);
        let body = &raw[split + 4..];

        let mut lines = head.split("\r\n");
        let status = parse_status_line(lines.next().unwrap_or_default())?;
        if (100..200).contains(&status) {
            raw = body;
            continue;
        }
        return Ok((status, read_body(lines, body)?));
    }
}

fn parse_status_line(status_line: &str) -> Result<u16> {
    let bad = || AdsError::invalid_response(format!("bad HTTP status line '{status_line}'"));
    let mut parts = status_line.split_whitespace();
    if !parts.next().unwrap_or_default().starts_with("HTTP/") {
        return Err(bad());
    }
    parts
        .next()
        .and_then(|code| code.parse().ok())
        .ok_or_else(bad)
}

/// Extracts the body using the framing announced by the header lines.
fn read_body<'a>(lines: impl Iterator<Item = &'a str>, body: &[u8]) -> Result<Vec<u8>> {
    let mut content_length = None;
    let mut chunked = false;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().ok();
        } else if name.eq_ignore_ascii_case("transfer-encoding")
            && value.to_ascii_lowercase().contains("chunked")
        {
            chunked = true;
        }
    }

    if chunked {
        dechunk(body)
    } else if let Some(len) = content_length {
        if body.len() < len {
            return Err(AdsError::invalid_response(format!(
                "HTTP body truncated: expected {len} bytes, got {}",
                body.len()
            )));
        }
        Ok(body[..len].to_vec())
    } else {
        Ok(body.to_vec())
    }
}

/// Decodes a `Transfer-Encoding: chunked` body.
fn dechunk(mut body: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len());
    loop {
        let line_end = find_subslice(body, b"\r\n")
            .ok_or_else(|| AdsError::invalid_response("chunk size line not terminated"))?;
        let size_line = String::from_utf8_lossy(&body[..line_end]);
        let size_hex = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| AdsError::invalid_response(format!("bad chunk size '{size_hex}'")))?;
        body = &body[line_end + 2..];

        if size == 0 {
            return Ok(out);
        }
        if body.len() < size {
            return Err(AdsError::invalid_response("chunk truncated"));
        }
        out.extend_from_slice(&body[..size]);
        body = body.get(size + 2..).unwrap_or_default();
    }
}
