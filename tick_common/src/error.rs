//! Error types shared between the tick server and client.
//!
//! `ProviderError` covers every failure surface of the workspace: socket and file
//! I/O, JSON and CSV encoding, oversized messages, invalid configuration, lifecycle
//! channels, poisoned locks, signal handlers, and errors reported back by the remote
//! side of an RPC call.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by client and server.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// I/O error originating from sockets or snapshot files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Failure while writing a CSV snapshot.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A configuration value is out of its accepted range.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Crossbeam/channel receive failed (e.g., sender closed); contains a short context string.
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),

    /// The server answered a request with an error response.
    #[error("Remote call failed: {0}")]
    Remote(String),

    /// A background thread could not be spawned or panicked before it was joined.
    #[error("Worker thread failure: {0}")]
    Worker(String),

    /// A framed message grew past the given number of bytes without a line break.
    #[error("Message exceeds {0} bytes")]
    MessageTooLong(usize),

    /// The process signal handler could not be installed.
    #[error("Signal handler error: {0}")]
    Signal(String),
}

impl<T> From<PoisonError<T>> for ProviderError {
    fn from(err: PoisonError<T>) -> Self {
        ProviderError::MutexLock(err.to_string())
    }
}
