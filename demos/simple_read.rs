//! Example: Reading PLC variables by name
//!
//! Run with: cargo run --example simple_read -- <host> <net-id> [NAME:TYPE ...]
//!
//! This example demonstrates:
//! - Building a client from a host and AMS Net Id
//! - Reading a batch of typed variables in one call
//! - Handling PLC faults

use ads_webservice::utils::parse_read_request;
use ads_webservice::{AdsError, AmsNetId, Client, ClientConfig, ReadRequest, TypeTag};
use std::env;

fn main() -> ads_webservice::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::level_filters::LevelFilter::DEBUG)
        .with_target(false)
        .init();

    let mut args = env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "192.168.1.10".to_string());
    let net_id = args
        .next()
        .unwrap_or_else(|| format!("{host}.1.1"))
        .parse::<AmsNetId>()?;

    let mut requests = args
        .map(|arg| parse_read_request(&arg))
        .collect::<ads_webservice::Result<Vec<_>>>()?;
    if requests.is_empty() {
        requests = vec![
            ReadRequest::new("MAIN.counter", TypeTag::Int16),
            ReadRequest::new("MAIN.temperature", TypeTag::Float32),
            ReadRequest::new("MAIN.running", TypeTag::Bool),
            ReadRequest::new("MAIN.recipe", TypeTag::FixedString),
        ];
    }

    let client = Client::new(ClientConfig::new(host, net_id))?;

    println!("=== Reading {} variables ===\n", requests.len());

    match client.read(&requests) {
        Ok(values) => {
            for (request, value) in requests.iter().zip(&values) {
                println!("{:<24} {:<6} = {}", request.name, request.tag, value);
            }
        }
        Err(AdsError::Protocol(fault)) => {
            println!("PLC rejected the batch: {} ({})", fault.code(), fault.category());
        }
        Err(e) => return Err(e),
    }

    Ok(())
}
