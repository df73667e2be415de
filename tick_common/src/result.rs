//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `ProviderError`, so functions can simply return `Result<T>`.
use crate::error::ProviderError;

/// Workspace-wide `Result` alias with `ProviderError` as the default error.
pub type Result<T, E = ProviderError> = std::result::Result<T, E>;
