//! Query facade over the running provider.
//!
//! `TickProvider::start` builds the shared `TickBuffer`, spawns the tick generator and
//! the snapshot writer, and returns a handle that is safe to share between request
//! threads (`Arc<TickProvider>`). Queries only copy data out of the buffer; they
//! never mutate it and never wait on the background threads.
//!
//! Dropping the provider shuts it down, so a provider that fails half-way through
//! `start` does not leak running threads.

use std::sync::Arc;

use log::{debug, error, info};
use tick_common::{ProviderError, Quote, Tick};

use crate::config::{PriceBand, ProviderConfig};
use crate::model::lifecycle::{LifecycleController, LifecycleState};
use crate::model::snapshot_writer::{SnapshotCounter, SnapshotWriter};
use crate::model::tick_buffer::TickBuffer;
use crate::model::tick_generator::TickGenerator;

/// Running tick provider: shared buffer, background workers and their lifecycle.
pub struct TickProvider {
    buffer: Arc<TickBuffer>,
    lifecycle: Arc<LifecycleController>,
    snapshots: Arc<SnapshotCounter>,
    price_band: PriceBand,
    query_window: usize,
}

impl TickProvider {
    /// Validates `config` and starts both background threads.
    pub fn start(config: ProviderConfig) -> Result<Self, ProviderError> {
        config.validate()?;

        let buffer = Arc::new(TickBuffer::new(config.buffer_capacity));
        let lifecycle = Arc::new(LifecycleController::new());
        let generator = TickGenerator::new(
            Arc::clone(&buffer),
            Arc::clone(&lifecycle),
            config.min_tick_interval,
            config.max_tick_interval,
            config.price_band,
        );
        let writer = SnapshotWriter::new(
            Arc::clone(&buffer),
            Arc::clone(&lifecycle),
            config.snapshot_dir.clone(),
            config.snapshot_period,
            config.max_snapshots,
        );

        let provider = Self {
            buffer,
            lifecycle,
            snapshots: writer.counter(),
            price_band: config.price_band,
            query_window: config.query_window,
        };
        generator.start()?;
        writer.start()?;
        provider.lifecycle.mark_running();

        info!(
            "Tick provider running: capacity {}, window {}, snapshots into {}",
            config.buffer_capacity,
            config.query_window,
            config.snapshot_dir.display()
        );
        Ok(provider)
    }

    /// Latest bid/ask pair.
    ///
    /// Before the first tick exists a pair is synthesized from the generator's price
    /// distribution, so callers racing the startup still get a plausible price.
    pub fn get_current_price(&self) -> Result<Quote, ProviderError> {
        match self.buffer.latest()? {
            Some(tick) => Ok(tick.quote()),
            None => {
                debug!("No tick generated yet, answering with a synthesized price");
                Ok(TickGenerator::synthesize_quote(&self.price_band))
            }
        }
    }

    /// Up to `query_window` most recent ticks, oldest first.
    pub fn get_ticks(&self) -> Result<Vec<Tick>, ProviderError> {
        let ticks = self.buffer.snapshot_head(self.query_window)?;
        debug!("get_ticks returned {} ticks", ticks.len());
        Ok(ticks)
    }

    /// Stops both background threads and waits until they have exited. Idempotent.
    pub fn shutdown(&self) -> Result<(), ProviderError> {
        self.lifecycle.shutdown()
    }

    /// Blocks until a stop was requested by any party.
    pub fn wait_for_stop_request(&self) {
        self.lifecycle.wait_for_stop_request();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Shared lifecycle controller, e.g. for an interrupt handler.
    pub fn lifecycle(&self) -> Arc<LifecycleController> {
        Arc::clone(&self.lifecycle)
    }

    /// Snapshots written successfully so far.
    pub fn snapshots_written(&self) -> u64 {
        self.snapshots.get()
    }

    /// Number of ticks currently buffered.
    pub fn buffered_ticks(&self) -> Result<usize, ProviderError> {
        self.buffer.len()
    }
}

impl Drop for TickProvider {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("Tick provider shutdown failed: {}", e);
        }
    }
}
