//! Bounded, thread-safe tick history.
//!
//! `TickBuffer` is the only shared market state of the provider. It keeps ticks in
//! insertion order inside a `VecDeque` guarded by a single `Mutex`, and evicts the
//! oldest tick first once the configured capacity is exceeded.
//!
//! Readers never get a reference into the deque: every read returns an owned copy,
//! taken while the lock is held, so the lock window is limited to an in-memory copy.
//! The generator is the only writer and never stamps a tick earlier than the newest
//! buffered one, so insertion order is also timestamp order.

use std::collections::VecDeque;
use std::sync::Mutex;

use tick_common::{ProviderError, Tick};

/// Fixed-capacity FIFO of ticks shared between the background threads and queries.
#[derive(Debug)]
pub struct TickBuffer {
    ticks: Mutex<VecDeque<Tick>>,
    capacity: usize,
}

impl TickBuffer {
    /// Creates an empty buffer holding at most `capacity` ticks (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ticks: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Appends `tick`, evicting the oldest entries if the buffer would overflow.
    pub fn insert(&self, tick: Tick) -> Result<(), ProviderError> {
        let mut ticks = self.ticks.lock()?;
        while ticks.len() >= self.capacity {
            ticks.pop_front();
        }
        ticks.push_back(tick);
        Ok(())
    }

    /// Copies the most recent `n` ticks (or fewer), oldest first.
    pub fn snapshot_head(&self, n: usize) -> Result<Vec<Tick>, ProviderError> {
        let ticks = self.ticks.lock()?;
        let skip = ticks.len().saturating_sub(n);
        Ok(ticks.iter().skip(skip).copied().collect())
    }

    /// Copies the whole buffer, oldest first.
    pub fn snapshot_all(&self) -> Result<Vec<Tick>, ProviderError> {
        let ticks = self.ticks.lock()?;
        Ok(ticks.iter().copied().collect())
    }

    /// Most recently inserted tick, if any.
    pub fn latest(&self) -> Result<Option<Tick>, ProviderError> {
        Ok(self.ticks.lock()?.back().copied())
    }

    /// Number of ticks currently held.
    pub fn len(&self) -> Result<usize, ProviderError> {
        Ok(self.ticks.lock()?.len())
    }

    /// `true` when no tick has been inserted yet.
    pub fn is_empty(&self) -> Result<bool, ProviderError> {
        Ok(self.ticks.lock()?.is_empty())
    }

    /// Maximum number of ticks held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;
    use std::thread;

    fn tick_at(seq: i64) -> Tick {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bid = 100.0 + seq as f64 * 0.001;
        Tick {
            timestamp: base + Duration::milliseconds(seq),
            bid,
            ask: bid + 0.5,
        }
    }

    #[test]
    fn empty_buffer() {
        let buffer = TickBuffer::new(10);
        assert!(buffer.is_empty().unwrap());
        assert_eq!(buffer.latest().unwrap(), None);
        assert!(buffer.snapshot_all().unwrap().is_empty());
        assert!(buffer.snapshot_head(5).unwrap().is_empty());
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let buffer = TickBuffer::new(0);
        buffer.insert(tick_at(0)).unwrap();
        buffer.insert(tick_at(1)).unwrap();
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.snapshot_all().unwrap(), vec![tick_at(1)]);
    }

    #[test]
    fn evicts_oldest_first_and_keeps_last_capacity() {
        let capacity = 50;
        let extra = 17;
        let buffer = TickBuffer::new(capacity);
        for seq in 0..(capacity + extra) as i64 {
            buffer.insert(tick_at(seq)).unwrap();
            assert!(buffer.len().unwrap() <= capacity);
        }

        let all = buffer.snapshot_all().unwrap();
        let expected: Vec<Tick> = (extra as i64..(capacity + extra) as i64).map(tick_at).collect();
        assert_eq!(all, expected);
        assert_eq!(buffer.latest().unwrap(), Some(tick_at((capacity + extra - 1) as i64)));
    }

    #[test]
    fn head_returns_most_recent_window_in_order() {
        let buffer = TickBuffer::new(1000);
        for seq in 0..250 {
            buffer.insert(tick_at(seq)).unwrap();
        }

        let head = buffer.snapshot_head(100).unwrap();
        assert_eq!(head.len(), 100);
        assert_eq!(head.first(), Some(&tick_at(150)));
        assert_eq!(head.last(), Some(&tick_at(249)));
        assert!(head.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

        assert_eq!(buffer.snapshot_head(1000).unwrap().len(), 250);
        assert!(buffer.snapshot_head(0).unwrap().is_empty());
    }

    #[test]
    fn copies_are_independent_of_later_inserts() {
        let buffer = TickBuffer::new(3);
        buffer.insert(tick_at(0)).unwrap();
        let before = buffer.snapshot_all().unwrap();
        buffer.insert(tick_at(1)).unwrap();
        assert_eq!(before, vec![tick_at(0)]);
    }

    #[test]
    fn concurrent_writers_and_readers_see_consistent_windows() {
        let buffer = Arc::new(TickBuffer::new(64));
        let writer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                for seq in 0..5_000 {
                    buffer.insert(tick_at(seq)).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let window = buffer.snapshot_head(32).unwrap();
                        assert!(window.len() <= 32);
                        assert!(window.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
                        assert!(buffer.len().unwrap() <= 64);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(buffer.len().unwrap(), 64);
    }
}
