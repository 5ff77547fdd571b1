//! Example: Writing PLC variables by name
//!
//! Run with: cargo run --example simple_write -- <host> <net-id> [NAME:TYPE=VALUE ...]
//!
//! This example demonstrates:
//! - Writing a batch of typed values in one call
//! - Reading the values back to confirm them

use ads_webservice::utils::parse_write_request;
use ads_webservice::{AmsNetId, Client, ClientConfig, ReadRequest, WriteRequest};
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
        .map(|arg| parse_write_request(&arg))
        .collect::<ads_webservice::Result<Vec<_>>>()?;
    if requests.is_empty() {
        requests = vec![
            WriteRequest::new("MAIN.setpoint", 21.5f32),
            WriteRequest::new("MAIN.enable", true),
            WriteRequest::new("MAIN.recipe", "PRODUCT-001"),
        ];
    }

    let client = Client::new(ClientConfig::new(host, net_id))?;

    println!("=== Writing {} variables ===\n", requests.len());
    let written = client.write(&requests)?;
    for (request, value) in requests.iter().zip(&written) {
        println!("{:<24} <- {}", request.name, value);
    }

    println!("\n=== Reading back ===\n");
    let reads: Vec<ReadRequest> = requests
        .iter()
        .map(|r| ReadRequest::new(r.name.clone(), r.tag()))
        .collect();
    for (request, value) in reads.iter().zip(client.read(&reads)?) {
        println!("{:<24} = {}", request.name, value);
    }

    Ok(())
}
