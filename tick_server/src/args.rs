//! Command-line arguments for the tick server.
//!
//! Every provider setting can be overridden from the command line; the defaults are
//! those of `ProviderConfig::default()`.
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tick_common::net::RPC_PORT;
use tick_server::config::{
    DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_INTERVAL, DEFAULT_MAX_SNAPSHOTS, DEFAULT_MIN_INTERVAL,
    DEFAULT_QUERY_WINDOW, DEFAULT_SNAPSHOT_PERIOD,
};
use tick_server::{PriceBand, ProviderConfig};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Synthetic market tick provider", long_about = None)]
pub struct Args {
    /// IP address to accept RPC connections on.
    #[clap(long, default_value = "0.0.0.0")]
    pub bind_ip: String,

    /// TCP port to accept RPC connections on.
    #[clap(long, default_value_t = RPC_PORT)]
    pub port: u16,

    /// Maximum number of ticks kept in memory.
    #[clap(long, default_value_t = DEFAULT_BUFFER_CAPACITY)]
    pub capacity: usize,

    /// Shortest pause between two ticks, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_MIN_INTERVAL.as_millis() as u64)]
    pub min_interval_ms: u64,

    /// Longest pause between two ticks, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_MAX_INTERVAL.as_millis() as u64)]
    pub max_interval_ms: u64,

    /// Lowest generated bid.
    #[clap(long, default_value_t = PriceBand::default().low)]
    pub bid_low: f64,

    /// Upper bound (exclusive) of generated bids.
    #[clap(long, default_value_t = PriceBand::default().high)]
    pub bid_high: f64,

    /// Upper bound (exclusive) of the generated bid/ask spread.
    #[clap(long, default_value_t = PriceBand::default().max_spread)]
    pub max_spread: f64,

    /// Pause between two snapshot files, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_SNAPSHOT_PERIOD.as_millis() as u64)]
    pub snapshot_period_ms: u64,

    /// Directory snapshot files are written to.
    #[clap(long, default_value = ".")]
    pub snapshot_dir: PathBuf,

    /// Number of snapshot files after which the server stops itself.
    #[clap(long, default_value_t = DEFAULT_MAX_SNAPSHOTS)]
    pub max_snapshots: u64,

    /// Maximum number of ticks returned by `get_ticks`.
    #[clap(long, default_value_t = DEFAULT_QUERY_WINDOW)]
    pub query_window: usize,
}

impl Args {
    /// Provider settings described by these arguments.
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            buffer_capacity: self.capacity,
            min_tick_interval: Duration::from_millis(self.min_interval_ms),
            max_tick_interval: Duration::from_millis(self.max_interval_ms),
            price_band: PriceBand {
                low: self.bid_low,
                high: self.bid_high,
                max_spread: self.max_spread,
            },
            snapshot_period: Duration::from_millis(self.snapshot_period_ms),
            snapshot_dir: self.snapshot_dir.clone(),
            max_snapshots: self.max_snapshots,
            query_window: self.query_window,
        }
    }
}
