//! Background tick producer.
//!
//! `TickGenerator` runs on its own thread for the lifetime of the provider. Each
//! iteration it waits a random delay drawn uniformly from the configured interval,
//! then synthesizes one tick and appends it to the shared `TickBuffer`:
//!
//! - `bid` is uniform in `[band.low, band.high)`;
//! - `ask` is `bid` plus a spread uniform in `[0, band.max_spread)`;
//! - `timestamp` is the current UTC time, clamped so it never precedes the newest
//!   buffered tick when the wall clock steps backwards.
//!
//! The wait goes through `LifecycleController::wait_timeout`, so a stop request ends
//! the loop without sleeping out the remaining delay.
//!
//! Any fault (an error from the buffer or a panic) terminates the process with
//! `FATAL_EXIT_CODE`; the generator never stops silently while the provider runs.

use std::panic::{self, AssertUnwindSafe};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, trace};
use rand::Rng;
use tick_common::{ProviderError, Quote, Tick};

use crate::config::PriceBand;
use crate::model::lifecycle::LifecycleController;
use crate::model::tick_buffer::TickBuffer;

/// Thread name of the generator.
pub const GENERATOR_THREAD: &str = "tick-generator";
/// Exit status used when the generator fails.
pub const FATAL_EXIT_CODE: i32 = 70;

/// Synthesizes ticks into a shared buffer until the provider stops.
pub struct TickGenerator {
    buffer: Arc<TickBuffer>,
    lifecycle: Arc<LifecycleController>,
    min_interval: Duration,
    max_interval: Duration,
    band: PriceBand,
}

impl TickGenerator {
    /// Creates a generator writing into `buffer` and governed by `lifecycle`.
    pub fn new(
        buffer: Arc<TickBuffer>,
        lifecycle: Arc<LifecycleController>,
        min_interval: Duration,
        max_interval: Duration,
        band: PriceBand,
    ) -> Self {
        Self {
            buffer,
            lifecycle,
            min_interval,
            max_interval,
            band,
        }
    }

    /// Draws a bid/ask pair from `band`.
    pub fn synthesize_quote(band: &PriceBand) -> Quote {
        let mut rng = rand::rng();
        let bid = rng.random_range(band.low..band.high);
        let spread = rng.random_range(0.0..band.max_spread);
        Quote {
            bid,
            ask: bid + spread,
        }
    }

    /// Draws a bid/ask pair from `band` and stamps it with the current time.
    pub fn synthesize(band: &PriceBand) -> Tick {
        let quote = Self::synthesize_quote(band);
        Tick::now(quote.bid, quote.ask)
    }

    fn next_delay(&self) -> Duration {
        rand::rng().random_range(self.min_interval..=self.max_interval)
    }

    /// Generation loop. Returns `Ok` once the stop signal is observed.
    pub fn run(&self) -> Result<(), ProviderError> {
        info!(
            "Tick generator started (Thread ID: {:?})",
            std::thread::current().id()
        );
        loop {
            if self.lifecycle.wait_timeout(self.next_delay()) {
                break;
            }
            let mut tick = Self::synthesize(&self.band);
            if let Some(last) = self.buffer.latest()? {
                tick.timestamp = tick.timestamp.max(last.timestamp);
            }
            self.buffer.insert(tick)?;
            trace!("Generated tick bid={:.4} ask={:.4}", tick.bid, tick.ask);
        }
        Ok(())
    }

    /// Runs the generator on a worker thread owned by the lifecycle controller.
    ///
    /// Failures inside the thread exit the process.
    pub fn start(self) -> Result<(), ProviderError> {
        let lifecycle = Arc::clone(&self.lifecycle);
        lifecycle.spawn(GENERATOR_THREAD, move || {
            match panic::catch_unwind(AssertUnwindSafe(|| self.run())) {
                Ok(Ok(())) => info!("Tick generator stopped"),
                Ok(Err(e)) => {
                    error!("Tick generator failed, terminating: {}", e);
                    process::exit(FATAL_EXIT_CODE);
                }
                Err(_) => {
                    error!("Tick generator panicked, terminating");
                    process::exit(FATAL_EXIT_CODE);
                }
            }
        })
    }
}
