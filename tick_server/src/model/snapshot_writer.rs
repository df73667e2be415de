//! Periodic CSV snapshots of the tick buffer.
//!
//! Every `period` the writer copies the whole buffer (the lock is released before any
//! file is touched) and writes it to `ticks_YYYYMMDD_HHMMSS.csv` in the snapshot
//! directory, one `timestamp,bid,ask` row per tick. An empty buffer produces no file.
//!
//! Files are opened with create-new semantics and are never overwritten; when two
//! snapshots fall into the same UTC second the later one gets a numeric suffix
//! (`ticks_20240301_123005_1.csv`).
//!
//! Snapshot cap: once `max_snapshots` files have been written successfully the writer
//! sets the stop signal, which shuts the whole provider down. This bounds the disk
//! usage of a provider left running unattended; it is the intended end of life of
//! the process, not a failure.
//!
//! A failed write is logged and retried on the next period. Only successful writes
//! count towards the cap.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tick_common::{ProviderError, Tick};

use crate::model::lifecycle::LifecycleController;
use crate::model::tick_buffer::TickBuffer;

/// Thread name of the snapshot writer.
pub const SNAPSHOT_THREAD: &str = "snapshot-writer";
/// File name prefix of every snapshot.
pub const SNAPSHOT_PREFIX: &str = "ticks_";
/// File extension of every snapshot.
pub const SNAPSHOT_EXTENSION: &str = "csv";
/// Header row of every snapshot.
pub const SNAPSHOT_HEADER: [&str; 3] = ["timestamp", "bid", "ask"];
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Number of snapshots written successfully since the provider started.
#[derive(Debug, Default)]
pub struct SnapshotCounter(AtomicU64);

impl SnapshotCounter {
    /// Current count.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Builds the snapshot file name for `at`; `attempt > 0` adds a collision suffix.
pub fn snapshot_file_name(at: DateTime<Utc>, attempt: u32) -> String {
    let stamp = at.format("%Y%m%d_%H%M%S");
    if attempt == 0 {
        format!("{SNAPSHOT_PREFIX}{stamp}.{SNAPSHOT_EXTENSION}")
    } else {
        format!("{SNAPSHOT_PREFIX}{stamp}_{attempt}.{SNAPSHOT_EXTENSION}")
    }
}

fn create_snapshot_file(dir: &Path, at: DateTime<Utc>) -> Result<(PathBuf, File), ProviderError> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(snapshot_file_name(at, attempt));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(ProviderError::Format(format!(
        "no free snapshot file name for {} in {}",
        at.format("%Y%m%d_%H%M%S"),
        dir.display()
    )))
}

/// Writes `ticks` to a new snapshot file in `dir` named after `at`.
///
/// A partially written file is removed again before the error is returned.
pub fn write_snapshot(dir: &Path, ticks: &[Tick], at: DateTime<Utc>) -> Result<PathBuf, ProviderError> {
    let (path, file) = create_snapshot_file(dir, at)?;
    let result = (|| -> Result<(), ProviderError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(SNAPSHOT_HEADER)?;
        for tick in ticks {
            writer.serialize(tick)?;
        }
        writer.flush()?;
        Ok(())
    })();

    match result {
        Ok(()) => Ok(path),
        Err(e) => {
            let _ = fs::remove_file(&path);
            Err(e)
        }
    }
}

/// Dumps the tick buffer to disk on a fixed period until the provider stops.
pub struct SnapshotWriter {
    buffer: Arc<TickBuffer>,
    lifecycle: Arc<LifecycleController>,
    counter: Arc<SnapshotCounter>,
    dir: PathBuf,
    period: Duration,
    max_snapshots: u64,
}

impl SnapshotWriter {
    /// Creates a writer that stops the provider after `max_snapshots` files.
    pub fn new(
        buffer: Arc<TickBuffer>,
        lifecycle: Arc<LifecycleController>,
        dir: PathBuf,
        period: Duration,
        max_snapshots: u64,
    ) -> Self {
        Self {
            buffer,
            lifecycle,
            counter: Arc::new(SnapshotCounter::default()),
            dir,
            period,
            max_snapshots,
        }
    }

    /// Shared handle to the success counter.
    pub fn counter(&self) -> Arc<SnapshotCounter> {
        Arc::clone(&self.counter)
    }

    /// Writes one snapshot of the current buffer.
    ///
    /// Returns `Ok(None)` without touching the disk when the buffer is empty.
    pub fn snapshot_once(&self) -> Result<Option<PathBuf>, ProviderError> {
        let ticks = self.buffer.snapshot_all()?;
        if ticks.is_empty() {
            return Ok(None);
        }
        let path = write_snapshot(&self.dir, &ticks, Utc::now())?;
        let written = self.counter.increment();
        info!(
            "Snapshot #{} with {} ticks written to {}",
            written,
            ticks.len(),
            path.display()
        );
        Ok(Some(path))
    }

    /// `true` once the number of written snapshots reached the cap.
    pub fn cap_reached(&self) -> bool {
        self.counter.get() >= self.max_snapshots
    }

    /// Snapshot loop. Returns once the stop signal is observed or the cap is reached.
    pub fn run(&self) {
        info!(
            "Snapshot writer started: every {:?} into {}, cap {}",
            self.period,
            self.dir.display(),
            self.max_snapshots
        );
        loop {
            if self.lifecycle.wait_timeout(self.period) {
                break;
            }
            match self.snapshot_once() {
                Ok(Some(_)) => {}
                Ok(None) => debug!("Tick buffer empty, snapshot skipped"),
                Err(e) => warn!("Snapshot write failed, retrying next period: {}", e),
            }
            if self.cap_reached() {
                warn!(
                    "Snapshot cap of {} files reached, stopping the provider",
                    self.max_snapshots
                );
                self.lifecycle.request_stop();
                break;
            }
        }
        info!("Snapshot writer stopped after {} snapshots", self.counter.get());
    }

    /// Runs the writer on a worker thread owned by the lifecycle controller.
    pub fn start(self) -> Result<(), ProviderError> {
        let lifecycle = Arc::clone(&self.lifecycle);
        lifecycle.spawn(SNAPSHOT_THREAD, move || self.run())
    }
}
