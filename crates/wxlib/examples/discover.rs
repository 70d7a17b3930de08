//! Weather station LAN discovery example.
//!
//! Broadcasts the search command on every local broadcast address and
//! prints whatever answers. WS980-class stations reply with their MAC,
//! IP address, TCP data port, and configured name.
//!
//! # Requirements
//!
//! - A WS980-class station on the same LAN
//! - UDP port 46000 not blocked by a firewall
//!
//! # Usage
//!
//! ```sh
//! cargo run -p wxlib --example discover
//! ```

use std::net::SocketAddr;

use wxlib::station::discovery;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let broadcasts = discovery::broadcast_addresses();
    if broadcasts.is_empty() {
        println!("No broadcast-capable network interfaces found.");
        return Ok(());
    }

    println!("Probing {} broadcast address(es)...\n", broadcasts.len());

    let mut found_any = false;
    for broadcast in broadcasts {
        let target = SocketAddr::from((broadcast, discovery::DEFAULT_BROADCAST_PORT));
        match discovery::probe(target).await {
            Ok(station) => {
                found_any = true;
                println!("Found station via {}:", target);
                println!("  Name: {}", station.name);
                println!("  MAC:  {}", station.mac);
                println!("  Data: {}", station.address);
                println!();
            }
            Err(e) => {
                println!("{}: {}", target, e);
            }
        }
    }

    if !found_any {
        println!("\nNo station answered.");
        println!("Troubleshooting:");
        println!("  - Verify the station is powered on and joined to the WLAN");
        println!("  - Check that UDP port 46000 is not blocked by a firewall");
        println!("  - Ensure this machine is on the same subnet as the station");
    }

    Ok(())
}
