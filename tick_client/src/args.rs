//! Command-line arguments for the Tick Client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use tick_common::Method;
use tick_common::net::RPC_PORT;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Provider method to call (`price` and `ticks` are accepted as short names).
    #[clap(value_enum)]
    pub method: Method,

    /// Server IP address (IPv4 or IPv6) where the tick provider is running.
    #[clap(long, default_value = "127.0.0.1")]
    pub server_ip: String,

    /// TCP port of the tick provider.
    #[clap(long, default_value_t = RPC_PORT)]
    pub port: u16,

    /// Keep polling the current price until Ctrl+C (only with `get_current_price`).
    #[clap(long)]
    pub watch: bool,

    /// Polling interval for `--watch`, in milliseconds.
    #[clap(long, default_value_t = 200)]
    pub interval_ms: u64,
}
