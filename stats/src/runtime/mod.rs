//! Periodic sampling of process runtime statistics.
//!
//! A [`RuntimeSampler`] reads a [`RuntimeStats`] snapshot on a fixed interval and emits it through a [`Stats`]
//! emitter:
//!
//! - `runtime.cpu.goroutines` (gauge): live threads in the process
//! - `runtime.mem.resident` (gauge): resident set size, in bytes
//! - `runtime.mem.virtual` (gauge): virtual memory size, in bytes
//! - `runtime.mem.heap` (gauge): data segment size, in bytes
//! - `runtime.gc.pause` (timing): garbage collection pause time since the previous sample
//!
//! Readings the platform cannot provide are skipped.
use std::{sync::Arc, time::Duration};

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

mod reader;
pub use self::reader::{ProcessStatsReader, RuntimeStats, RuntimeStatsReader};

use crate::{from_context, Context, Diagnostics, Stats, Tags, TracingDiagnostics};

/// Interval used by [`runtime`].
pub const DEFAULT_RUNTIME_INTERVAL: Duration = Duration::from_secs(30);

const DIAGNOSTICS_SOURCE: &str = "runtime";

/// Emits process runtime statistics on a fixed interval.
pub struct RuntimeSampler<S> {
    stats: S,
    interval: Duration,
    reader: Box<dyn RuntimeStatsReader>,
    diagnostics: Arc<dyn Diagnostics>,
    last_gc_pause: Duration,
}

impl<S: Stats> RuntimeSampler<S> {
    /// Creates a new `RuntimeSampler` that emits through `stats`.
    ///
    /// Samples are taken every [`DEFAULT_RUNTIME_INTERVAL`], read with [`ProcessStatsReader`], and emit failures are
    /// reported through [`TracingDiagnostics`].
    pub fn new(stats: S) -> Self {
        RuntimeSampler {
            stats,
            interval: DEFAULT_RUNTIME_INTERVAL,
            reader: Box::new(ProcessStatsReader),
            diagnostics: Arc::new(TracingDiagnostics),
            last_gc_pause: Duration::ZERO,
        }
    }

    /// Sets the sampling interval.
    ///
    /// An interval of zero is ignored.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.interval = interval;
        }
        self
    }

    /// Sets the source of runtime statistics.
    #[must_use]
    pub fn with_reader<R>(mut self, reader: R) -> Self
    where
        R: RuntimeStatsReader + 'static,
    {
        self.reader = Box::new(reader);
        self
    }

    /// Sets where emit failures are reported.
    #[must_use]
    pub fn with_diagnostics<D>(mut self, diagnostics: D) -> Self
    where
        D: Diagnostics + 'static,
    {
        self.diagnostics = Arc::new(diagnostics);
        self
    }

    /// Gets the sampling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Samples forever.
    ///
    /// The first sample is taken one interval after this is first polled.
    pub async fn run(self) {
        self.run_until_cancelled(&Context::background()).await;
    }

    /// Samples until `ctx` is cancelled.
    ///
    /// Cancellation is checked before every sample: once it has been observed, nothing more is emitted.
    pub async fn run_until_cancelled(mut self, ctx: &Context) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                () = ctx.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if ctx.is_cancelled() {
                break;
            }
            self.sample();
        }

        debug!("Runtime sampler stopped.");
    }

    /// Takes a single sample and emits it.
    pub fn sample(&mut self) {
        let reading = self.reader.read();
        let tags = Tags::new();

        let gauges = [
            ("runtime.cpu.goroutines", reading.threads),
            ("runtime.mem.resident", reading.resident_bytes),
            ("runtime.mem.virtual", reading.virtual_bytes),
            ("runtime.mem.heap", reading.heap_bytes),
        ];
        for (name, value) in gauges {
            let Some(value) = value else {
                continue;
            };

            if let Err(e) = self.stats.gauge(name, value as f64, 1.0, &tags) {
                self.diagnostics.report(DIAGNOSTICS_SOURCE, &e);
            }
        }

        let pause = reading.gc_pause_total.saturating_sub(self.last_gc_pause);
        self.last_gc_pause = reading.gc_pause_total;
        if let Err(e) = self.stats.timing("runtime.gc.pause", pause, 1.0, &tags) {
            self.diagnostics.report(DIAGNOSTICS_SOURCE, &e);
        }
    }
}

/// Emits process runtime statistics through `stats` every [`DEFAULT_RUNTIME_INTERVAL`], forever.
pub async fn runtime<S: Stats>(stats: S) {
    RuntimeSampler::new(stats).run().await;
}

/// Emits process runtime statistics through the emitter in `ctx` every `interval`, until `ctx` is cancelled.
///
/// Returns immediately if `ctx` holds no emitter.
pub async fn runtime_from_context(ctx: &Context, interval: Duration) {
    let Some(stats) = from_context(ctx) else {
        debug!("No emitter in context, runtime sampler not started.");
        return;
    };

    RuntimeSampler::new(stats).with_interval(interval).run_until_cancelled(ctx).await;
}
