//! Continuous polling example.
//!
//! Starts the background poller (discovery every two minutes, fetch every
//! ten seconds) and prints a snapshot of all sensor values after each
//! expected fetch.
//!
//! # Usage
//!
//! ```sh
//! RUST_LOG=wxlib_station=info cargo run -p wxlib --example poll
//! ```

use std::sync::Arc;
use std::time::Duration;

use wxlib::station::poller::StationPollerBuilder;
use wxlib::station::sensors::Sensor;
use wxlib::station::state::StationState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let state = Arc::new(StationState::new());
    let poller = StationPollerBuilder::new()
        .fetch_interval(Duration::from_secs(10))
        .start(Arc::clone(&state));

    println!("Polling started; press Ctrl-C to stop.\n");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(Duration::from_secs(10)) => {
                match state.station() {
                    Some(address) => println!("Station: {}", address),
                    None => {
                        println!("No station known yet.");
                        continue;
                    }
                }
                for sensor in Sensor::ALL {
                    let unit = sensor.unit();
                    println!("  {:>26?}: {:>10.1} {}", sensor, state.value(sensor), unit);
                }
                println!();
            }
        }
    }

    println!("Shutting down...");
    poller.shutdown().await;
    println!("Done.");

    Ok(())
}
