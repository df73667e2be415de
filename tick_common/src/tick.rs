//! Tick data model shared between server and client.
//!
//! A `Tick` is one timestamped bid/ask observation. Ticks are serialized with the
//! timestamp as an RFC 3339 (ISO-8601) string, both on the wire and in snapshot
//! files, so the field order here is also the CSV column order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single bid/ask observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// UTC instant the tick was produced.
    pub timestamp: DateTime<Utc>,
    /// Bid price.
    pub bid: f64,
    /// Ask price, never below `bid`.
    pub ask: f64,
}

impl Tick {
    /// Creates a tick stamped with the current UTC time.
    pub fn now(bid: f64, ask: f64) -> Self {
        Tick {
            timestamp: Utc::now(),
            bid,
            ask,
        }
    }

    /// The bid/ask pair of this tick.
    pub fn quote(&self) -> Quote {
        Quote {
            bid: self.bid,
            ask: self.ask,
        }
    }
}

/// Current bid/ask pair as returned by `get_current_price`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Bid price.
    pub bid: f64,
    /// Ask price.
    pub ask: f64,
}

impl Quote {
    /// Difference between ask and bid.
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

impl From<Quote> for (f64, f64) {
    fn from(quote: Quote) -> Self {
        (quote.bid, quote.ask)
    }
}
