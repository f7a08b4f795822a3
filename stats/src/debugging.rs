//! In-memory emitter for tests.
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::Mutex;

use crate::{Error, Metric, Stats, Tags};

/// Captures point-in-time snapshots of [`DebuggingStats`].
#[derive(Clone, Debug)]
pub struct Snapshotter {
    metrics: Arc<Mutex<Vec<Metric>>>,
}

impl Snapshotter {
    /// Returns every metric recorded so far, in recording order.
    pub fn snapshot(&self) -> Vec<Metric> {
        self.metrics.lock().clone()
    }

    /// Returns every metric recorded so far, leaving the recorder empty.
    pub fn drain(&self) -> Vec<Metric> {
        std::mem::take(&mut *self.metrics.lock())
    }

    /// Returns every metric recorded so far under `name`.
    pub fn named(&self, name: &str) -> Vec<Metric> {
        self.metrics.lock().iter().filter(|m| m.name() == name).cloned().collect()
    }
}

/// An emitter that keeps every metric in memory.
///
/// Recording after [`Stats::close`] fails with [`Error::Closed`], mirroring the network emitters.
#[derive(Debug, Default)]
pub struct DebuggingStats {
    metrics: Arc<Mutex<Vec<Metric>>>,
    closed: AtomicBool,
}

impl DebuggingStats {
    /// Creates a new `DebuggingStats`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a `Snapshotter` attached to this emitter.
    pub fn snapshotter(&self) -> Snapshotter {
        Snapshotter { metrics: Arc::clone(&self.metrics) }
    }

    /// Returns `true` once this emitter has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn record(&self, metric: Metric) -> Result<(), Error> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        self.metrics.lock().push(metric);
        Ok(())
    }
}

impl Stats for DebuggingStats {
    fn inc(&self, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.record(Metric::increment(name, value, rate, tags.clone()))
    }

    fn dec(&self, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.record(Metric::decrement(name, value, rate, tags.clone()))
    }

    fn gauge(&self, name: &str, value: f64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.record(Metric::gauge(name, value, rate, tags.clone()))
    }

    fn timing(&self, name: &str, value: Duration, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.record(Metric::timing(name, value, rate, tags.clone()))
    }

    fn close(&self) -> Result<(), Error> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
