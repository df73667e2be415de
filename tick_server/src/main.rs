//! Tick provider server.
//!
//! This binary starts a `TickProvider` and exposes it over TCP. Internally, it wires
//! together three main building blocks:
//!
//! - `TickProvider`: owns the tick buffer and its two background threads (tick
//!   generator and snapshot writer) and answers queries from copies of the buffer.
//! - `RpcReceiver`: accepts TCP connections and serves newline-delimited JSON
//!   requests (`get_current_price`, `get_ticks`, `shutdown`), one thread per client.
//! - Ctrl+C handler: sets the provider's stop signal.
//!
//! Shutdown:
//! - The stop signal can be set by Ctrl+C, by a remote `shutdown` call, or by the
//!   snapshot writer once its snapshot cap is reached.
//! - The main thread waits for that signal, joins the background threads, then waits
//!   for the RPC receiver to release its clients before exiting.
//!
//! Usage example:
//! ```bash
//! RUST_LOG=debug tick_server --port 9090 --snapshot-dir ./snapshots --max-snapshots 60
//! ```
#![warn(missing_docs)]
mod args;

use crate::args::Args;
use clap::Parser;
use log::{error, info};
use std::sync::Arc;
use std::thread;
use tick_common::net::addr;
use tick_common::{ProviderError, Result};
use tick_server::{RpcReceiver, TickProvider};

fn main() -> Result<(), ProviderError> {
    init_logger();
    let args = Args::parse();

    let receiver = RpcReceiver::new(&addr(&args.bind_ip, args.port))?;
    let listen_addr = receiver.local_addr()?;
    let provider = Arc::new(TickProvider::start(args.provider_config())?);

    {
        let lifecycle = provider.lifecycle();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down provider...");
            lifecycle.request_stop();
        })
        .map_err(|e| ProviderError::Signal(format!("failed to set Ctrl+C handler: {e}")))?;
    }

    let receiver_provider = Arc::clone(&provider);
    let receiver_thread = thread::Builder::new()
        .name("rpc-receiver".to_string())
        .spawn(move || receiver.receive_loop(receiver_provider))?;
    info!("Tick provider is ready on {}. Press Ctrl+C to exit.", listen_addr);

    provider.wait_for_stop_request();
    if let Err(e) = provider.shutdown() {
        error!("Background threads did not stop cleanly: {}", e);
    }

    match receiver_thread.join() {
        Ok(result) => result?,
        Err(_) => return Err(ProviderError::Worker("RPC receiver panicked".into())),
    }
    info!(
        "Tick provider stopped after writing {} snapshot(s)",
        provider.snapshots_written()
    );
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
