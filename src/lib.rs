//! # ADS Web Service Client
//!
//! A Rust library for reading and writing Beckhoff TwinCAT PLC variables by
//! symbol name through the TcAdsWebService SOAP endpoint.
//!
//! This is a **protocol-only** library: no polling, schedulers, or symbol
//! browsing. Each operation resolves handles in one round trip and reads or
//! writes in a second one. No automatic retries, caching, or reconnection.
//!
//! ## Features
//!
//! - **Batched**: any number of variables per call, via ADS sum commands
//! - **All or nothing**: the first failing variable fails the whole batch
//! - **Type-safe**: PLC types as enums, values as a tagged union
//! - **No panics**: all errors returned as `Result<T, AdsError>`
//! - **Pluggable transport**: HTTP by default, any [`EnvelopeChannel`] for tests
//!
//! ## Quick Start
//!
//! ```no_run
//! use ads_webservice::{AmsNetId, Client, ClientConfig, ReadRequest, TypeTag, WriteRequest};
//!
//! fn main() -> ads_webservice::Result<()> {
//!     let config = ClientConfig::new("192.168.1.10", "192.168.1.10.1.1".parse::<AmsNetId>()?);
//!     let client = Client::new(config)?;
//!
//!     // Read two variables in one batch
//!     let values = client.read(&[
//!         ReadRequest::new("MAIN.counter", TypeTag::Int16),
//!         ReadRequest::new("MAIN.temperature", TypeTag::Float32),
//!     ])?;
//!     println!("counter = {}, temperature = {}", values[0], values[1]);
//!
//!     // Write a value
//!     client.write(&[WriteRequest::new("MAIN.setpoint", 21.5f32)])?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Types
//!
//! | [`TypeTag`] | PLC type | Width | Rust value |
//! |-------------|----------|------:|------------|
//! | `Int16` | INT | 2 | `u16` |
//! | `Int32` | DINT | 4 | `u32` |
//! | `Bool` | BOOL | 1 | `bool` |
//! | `Float32` | REAL | 4 | `f32` |
//! | `Float64` | LREAL | 8 | `f64` |
//! | `FixedString` | STRING | 80 | `String` (ASCII) |
//!
//! Integers are decoded unsigned: a PLC `INT` holding `-1` reads as `65535`.
//!
//! ## Error Handling
//!
//! ```no_run
//! use ads_webservice::{AdsError, AmsNetId, Client, ClientConfig, TypeTag};
//!
//! let client = Client::new(ClientConfig::new("plc", "5.1.2.3.1.1".parse::<AmsNetId>()?))?;
//!
//! match client.read_value("MAIN.missing", TypeTag::Int16) {
//!     Ok(value) => println!("value = {value}"),
//!     Err(AdsError::Protocol(fault)) => {
//!         println!("PLC fault {}: {}", fault.code(), fault.category());
//!     }
//!     Err(AdsError::Timeout) => println!("Communication timeout"),
//!     Err(e) => println!("Error: {e}"),
//! }
//! # Ok::<(), AdsError>(())
//! ```
//!
//! ## Configuration
//!
//! ```no_run
//! use ads_webservice::{AmsNetId, ClientConfig};
//! use std::time::Duration;
//!
//! let config = ClientConfig::new("192.168.1.10", AmsNetId::new([192, 168, 1, 10, 1, 1]))
//!     .with_http_port(8080)                   // Custom HTTP port (default: 80)
//!     .with_ads_port(801)                     // TwinCAT 2 runtime (default: 851)
//!     .with_timeout(Duration::from_secs(5));  // Custom timeout (default: 2s)
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `debug` per round trip, `trace` with
//! payload hex dumps, and `warn` when the controller reports a fault. Install
//! any subscriber to see them.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod address;
mod client;
mod command;
mod datatype;
pub mod envelope;
mod error;
mod response;
mod status;
mod transport;
pub mod utils;

// Public re-exports
pub use address::{AmsAddr, AmsNetId, DEFAULT_ADS_PORT, TC2_ADS_PORT};
pub use client::{Client, ClientConfig};
pub use command::{
    AdsRequest, Handle, HandleCommand, ReadCommand, ReadRequest, WriteCommand, WriteRequest,
    HANDLE_HEADER_SIZE, HANDLE_RECORD_SIZE, HANDLE_SIZE, INDEX_GROUP_SUMUP_READ,
    INDEX_GROUP_SUMUP_READWRITE, INDEX_GROUP_SUMUP_WRITE, VALUE_HEADER_SIZE, VALUE_STATUS_SIZE,
};
pub use datatype::{PlcValue, TypeTag, STRING_SLOT_SIZE};
pub use error::{AdsError, Result};
pub use response::{AdsResponse, STATUS_RECORD_SIZE};
pub use status::{status_description, Fault, StatusClass};
pub use transport::{
    EnvelopeChannel, HttpTransport, DEFAULT_HTTP_PORT, DEFAULT_SERVICE_PATH, DEFAULT_TIMEOUT,
    MAX_REPLY_SIZE,
};
