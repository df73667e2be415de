//! In-process market tick provider.
//!
//! A background generator thread appends synthetic bid/ask ticks to a bounded
//! in-memory buffer, a second background thread periodically dumps that buffer to
//! CSV files, and remote callers query it concurrently through a small
//! JSON-over-TCP RPC surface:
//!
//! - `get_current_price`: latest bid/ask pair (synthesized if no tick exists yet).
//! - `get_ticks`: the most recent window of ticks, oldest first.
//! - `shutdown`: stop both background threads and wait for them to exit.
//!
//! Building blocks:
//!
//! - `model::tick_buffer::TickBuffer`: the only shared market state; a mutex-guarded
//!   FIFO that evicts the oldest tick once full and only ever hands out copies.
//! - `model::tick_generator::TickGenerator`: produces ticks at random intervals.
//! - `model::snapshot_writer::SnapshotWriter`: writes `ticks_YYYYMMDD_HHMMSS.csv`
//!   files and stops the provider once its snapshot cap is reached.
//! - `model::lifecycle::LifecycleController`: the shared stop signal; every wait in
//!   the background threads is interruptible through it and `shutdown` joins them.
//! - `provider::TickProvider`: wires the above together and serves the queries.
//! - `receiver::RpcReceiver`: accepts RPC connections and dispatches requests.
#![warn(missing_docs)]

pub mod config;
pub mod model;
pub mod provider;
pub mod receiver;

pub use config::{PriceBand, ProviderConfig};
pub use model::lifecycle::{LifecycleController, LifecycleState};
pub use provider::TickProvider;
pub use receiver::RpcReceiver;
