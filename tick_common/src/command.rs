//! RPC payloads exchanged between client and server.
//!
//! A `Request` names one of the three remotely invocable methods. The server answers
//! each request with exactly one `Response`. Both are encoded as single-line JSON
//! (see `net` for framing):
//!
//! ```text
//! -> {"method":"get_ticks"}
//! <- {"ticks":[{"timestamp":"2024-03-01T12:30:05.120Z","bid":101.2,"ask":101.9}]}
//! ```
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::tick::{Quote, Tick};

/// Remotely invocable provider methods.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[value(rename_all = "snake_case")]
pub enum Method {
    /// Latest bid/ask pair.
    #[value(alias = "price")]
    GetCurrentPrice,
    /// Most recent window of ticks.
    #[value(alias = "ticks")]
    GetTicks,
    /// Stop the provider's background threads.
    Shutdown,
}

/// Request payload sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Method to invoke.
    pub method: Method,
}

impl Request {
    /// Creates a request for `method`.
    pub fn new(method: Method) -> Self {
        Request { method }
    }
}

/// Response payload sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// Answer to `get_current_price`.
    Price(Quote),
    /// Answer to `get_ticks`, ascending by timestamp.
    Ticks(Vec<Tick>),
    /// Answer to `shutdown` once the background threads have been joined.
    ShutdownComplete,
    /// The request could not be served.
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_snake_case_method_names() {
        let json = serde_json::to_string(&Request::new(Method::GetCurrentPrice)).unwrap();
        assert_eq!(json, r#"{"method":"get_current_price"}"#);

        let parsed: Request = serde_json::from_str(r#"{"method":"get_ticks"}"#).unwrap();
        assert_eq!(parsed.method, Method::GetTicks);
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(serde_json::from_str::<Request>(r#"{"method":"drop_tables"}"#).is_err());
        assert!("drop_tables".parse::<Method>().is_err());
    }

    #[test]
    fn method_display_matches_wire_name() {
        assert_eq!(Method::Shutdown.to_string(), "shutdown");
        assert_eq!("GET_TICKS".parse::<Method>().unwrap(), Method::GetTicks);
    }

    #[test]
    fn response_shapes() {
        let price = serde_json::to_value(Response::Price(Quote { bid: 100.0, ask: 100.5 })).unwrap();
        assert_eq!(price["price"]["bid"], 100.0);
        assert_eq!(price["price"]["ask"], 100.5);

        let done = serde_json::to_string(&Response::ShutdownComplete).unwrap();
        assert_eq!(done, r#""shutdown_complete""#);

        let ticks = serde_json::to_value(Response::Ticks(Vec::new())).unwrap();
        assert!(ticks["ticks"].as_array().unwrap().is_empty());
    }
}
