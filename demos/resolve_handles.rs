//! Example: Resolving symbol handles
//!
//! Run with: cargo run --example resolve_handles -- <host> <net-id> [NAME ...]
//!
//! Handles are only valid until the PLC program is reloaded; the client
//! resolves them again on every read and write.

use ads_webservice::{AmsNetId, Client, ClientConfig};
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

    let mut names: Vec<String> = args.collect();
    if names.is_empty() {
        names = vec!["MAIN.counter".into(), "MAIN.temperature".into()];
    }

    let client = Client::new(ClientConfig::new(host, net_id))?;
    println!("Target: {}\n", client.target());

    for (name, handle) in names.iter().zip(client.resolve_handles(&names)?) {
        println!("{name:<24} {handle}");
    }

    Ok(())
}
