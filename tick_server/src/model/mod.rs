//! Core state and background workers of the tick provider.
//!
//! - `tick_buffer` — bounded, mutex-protected FIFO of ticks shared by everything else.
//! - `lifecycle` — stop signal, interruptible waits and worker joining.
//! - `tick_generator` — background thread synthesizing ticks into the buffer.
//! - `snapshot_writer` — background thread dumping the buffer to CSV files.

pub mod lifecycle;
pub mod snapshot_writer;
pub mod tick_buffer;
pub mod tick_generator;
