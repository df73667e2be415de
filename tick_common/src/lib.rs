//!
//! Common types and utilities shared by the tick server and client.
//!
//! This crate aggregates:
//! - `error` — unified error type `ProviderError` used across the workspace.
//! - `result` — handy `Result<T, ProviderError>` alias.
//! - `tick` — the `Tick` record and the `Quote` bid/ask pair.
//! - `command` — RPC requests and responses exchanged between client and server.
//! - `net` — networking constants and line framing helpers.
#![warn(missing_docs)]
pub mod error;
pub mod result;
pub mod tick;
pub mod command;
pub mod net;

pub use error::ProviderError;
pub use result::Result;
pub use command::{Method, Request, Response};
pub use tick::{Quote, Tick};
