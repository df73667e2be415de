//! Tick Client, a command-line client for the tick provider. It connects to the
//! provider over TCP, calls one of its methods and logs the answer:
//!
//! - `get_current_price` (`price`): the latest bid/ask pair; with `--watch` the price
//!   is polled every `--interval-ms` until Ctrl+C.
//! - `get_ticks` (`ticks`): the most recent ticks, one line each.
//! - `shutdown`: stops the provider and waits until it confirms.
//!
//! Usage example (CLI):
//! ```bash
//! tick_client price --server-ip 192.168.0.10 --watch --interval-ms 200
//! tick_client ticks
//! ```
#![warn(missing_docs)]
mod args;
mod sender;

use crate::args::Args;
use crate::sender::RpcClient;
use clap::Parser;
use log::{info, warn};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;
use tick_common::net::addr;
use tick_common::{Method, ProviderError, Quote, Result, Tick};

/// Polls the current price every `interval` until `shutdown` is set.
fn start_watch_loop(
    client: &mut RpcClient,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
) -> Result<(), ProviderError> {
    while !shutdown.load(Ordering::Relaxed) {
        log_price(&client.get_current_price()?);
        thread::sleep(interval);
    }
    info!("Watch loop stopping...");
    Ok(())
}

fn log_price(quote: &Quote) {
    info!("Bid: {:.2}, Ask: {:.2}", quote.bid, quote.ask);
}

fn log_ticks(ticks: &[Tick]) {
    info!("Received {} ticks", ticks.len());
    for tick in ticks {
        info!(
            "{}  bid={:.4}  ask={:.4}",
            tick.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            tick.bid,
            tick.ask
        );
    }
}

fn main() -> Result<(), ProviderError> {
    init_logger();
    let args = Args::parse();

    let server_ip = args.server_ip.trim().replace('"', "");
    let server_address = addr(&server_ip, args.port);
    info!("Connecting to tick provider at {}", server_address);
    let mut client = RpcClient::connect(&server_address)?;
    if args.watch && args.method != Method::GetCurrentPrice {
        warn!("--watch only applies to get_current_price; ignoring it");
    }

    match args.method {
        Method::GetCurrentPrice if args.watch => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let shutdown = shutdown.clone();
                ctrlc::set_handler(move || {
                    info!("Ctrl+C received. Stopping watch...");
                    shutdown.store(true, Ordering::SeqCst);
                })
                .map_err(|e| ProviderError::Signal(format!("failed to set Ctrl+C handler: {e}")))?;
            }
            info!("Watching price. Press Ctrl+C to exit.");
            start_watch_loop(&mut client, Duration::from_millis(args.interval_ms), shutdown)?;
        }
        Method::GetCurrentPrice => log_price(&client.get_current_price()?),
        Method::GetTicks => log_ticks(&client.get_ticks()?),
        Method::Shutdown => {
            client.shutdown()?;
            info!("Tick provider confirmed shutdown");
        }
    }
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
