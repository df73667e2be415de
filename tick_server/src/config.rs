//! Provider configuration.
//!
//! All values are fixed when the provider starts; nothing here is reconfigurable at
//! runtime. `ProviderConfig::default()` gives the stock settings: a
//! 1000-tick buffer, a tick every 100–300 ms with bids in `[100, 105)` and spreads in
//! `[0, 1)`, a snapshot every 10 seconds and a 100-tick query window.

use std::path::PathBuf;
use std::time::Duration;

use tick_common::ProviderError;

/// Maximum number of ticks kept in memory.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;
/// Maximum number of ticks returned by `get_ticks`.
pub const DEFAULT_QUERY_WINDOW: usize = 100;
/// Shortest pause between two generated ticks.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);
/// Longest pause between two generated ticks.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_millis(300);
/// Pause between two snapshot files.
pub const DEFAULT_SNAPSHOT_PERIOD: Duration = Duration::from_secs(10);
/// Snapshots written before the provider stops itself (one hour at the default period).
pub const DEFAULT_MAX_SNAPSHOTS: u64 = 360;

/// Range synthetic prices are drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    /// Inclusive lower bound for the bid.
    pub low: f64,
    /// Exclusive upper bound for the bid.
    pub high: f64,
    /// Exclusive upper bound for `ask - bid`.
    pub max_spread: f64,
}

impl Default for PriceBand {
    fn default() -> Self {
        PriceBand {
            low: 100.0,
            high: 105.0,
            max_spread: 1.0,
        }
    }
}

/// Settings for a `TickProvider`.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Maximum number of ticks held by the buffer.
    pub buffer_capacity: usize,
    /// Lower bound of the randomized pause between ticks.
    pub min_tick_interval: Duration,
    /// Upper bound of the randomized pause between ticks.
    pub max_tick_interval: Duration,
    /// Distribution of generated prices.
    pub price_band: PriceBand,
    /// Pause between two snapshot writes.
    pub snapshot_period: Duration,
    /// Directory snapshot files are created in.
    pub snapshot_dir: PathBuf,
    /// Number of successful snapshots after which the provider stops itself.
    pub max_snapshots: u64,
    /// Maximum number of ticks returned by `get_ticks`.
    pub query_window: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            min_tick_interval: DEFAULT_MIN_INTERVAL,
            max_tick_interval: DEFAULT_MAX_INTERVAL,
            price_band: PriceBand::default(),
            snapshot_period: DEFAULT_SNAPSHOT_PERIOD,
            snapshot_dir: PathBuf::from("."),
            max_snapshots: DEFAULT_MAX_SNAPSHOTS,
            query_window: DEFAULT_QUERY_WINDOW,
        }
    }
}

impl ProviderConfig {
    /// Rejects values the background threads cannot work with.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.buffer_capacity == 0 {
            return Err(ProviderError::Config("buffer capacity must be at least 1".into()));
        }
        if self.query_window == 0 {
            return Err(ProviderError::Config("query window must be at least 1".into()));
        }
        if self.min_tick_interval.is_zero() || self.min_tick_interval > self.max_tick_interval {
            return Err(ProviderError::Config(format!(
                "tick interval {:?}..{:?} is empty or inverted",
                self.min_tick_interval, self.max_tick_interval
            )));
        }
        let band = &self.price_band;
        if !(band.low.is_finite() && band.high.is_finite() && band.low < band.high) {
            return Err(ProviderError::Config(format!(
                "price band [{}, {}) is empty or inverted",
                band.low, band.high
            )));
        }
        if !(band.max_spread.is_finite() && band.max_spread > 0.0) {
            return Err(ProviderError::Config(format!(
                "max spread must be positive, got {}",
                band.max_spread
            )));
        }
        if self.snapshot_period.is_zero() {
            return Err(ProviderError::Config("snapshot period must be positive".into()));
        }
        if self.max_snapshots == 0 {
            return Err(ProviderError::Config("max snapshots must be at least 1".into()));
        }
        Ok(())
    }
}
