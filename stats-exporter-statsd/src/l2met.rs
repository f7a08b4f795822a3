use std::time::Duration;

use stats::{Error, Metric, Stats, Tags};
use tracing::info;

use crate::writer::{Dialect, LineEncoder};

/// A destination for encoded log lines.
pub trait LineSink: Send + Sync {
    /// Writes a single line.
    fn write_line(&self, line: &str);
}

/// Writes every line as a `tracing` event at the info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLineSink;

impl LineSink for TracingLineSink {
    fn write_line(&self, line: &str) {
        info!("{line}");
    }
}

/// An emitter that writes every metric as an l2met-style log line, such as `region=eu c#app.requests=1`.
///
/// Log-based metrics pipelines pick measurements out of the application's regular log stream, so nothing is sent over
/// the network and recording never fails.
#[derive(Debug)]
pub struct L2met<W = TracingLineSink> {
    encoder: LineEncoder,
    sink: W,
}

impl L2met {
    /// Creates a new `L2met` logging through `tracing`, with every metric name prefixed by `prefix`.
    pub fn new<P: Into<String>>(prefix: P) -> Self {
        Self::with_sink(TracingLineSink, prefix)
    }
}

impl<W: LineSink> L2met<W> {
    /// Creates a new `L2met` writing lines to `sink`, with every metric name prefixed by `prefix`.
    pub fn with_sink<P: Into<String>>(sink: W, prefix: P) -> Self {
        L2met { encoder: LineEncoder::new(Dialect::Log, prefix.into()), sink }
    }

    fn log(&self, metric: &Metric) -> Result<(), Error> {
        self.sink.write_line(&self.encoder.encode_string(metric));
        Ok(())
    }
}

impl<W: LineSink> Stats for L2met<W> {
    fn inc(&self, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.log(&Metric::increment(name, value, rate, tags.clone()))
    }

    fn dec(&self, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.log(&Metric::decrement(name, value, rate, tags.clone()))
    }

    fn gauge(&self, name: &str, value: f64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.log(&Metric::gauge(name, value, rate, tags.clone()))
    }

    fn timing(&self, name: &str, value: Duration, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.log(&Metric::timing(name, value, rate, tags.clone()))
    }

    fn close(&self) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockall::{mock, predicate::eq};
    use stats::{tags, Stats};

    use super::{L2met, LineSink};

    mock! {
        Sink {}

        impl LineSink for Sink {
            fn write_line(&self, line: &str);
        }
    }

    fn expect_line(line: &'static str) -> MockSink {
        let mut sink = MockSink::new();
        sink.expect_write_line().with(eq(line)).times(1).return_const(());
        sink
    }

    #[test]
    fn inc() {
        let stats = L2met::with_sink(expect_line("test=test c#test.test=2"), "test");
        stats.inc("test", 2, 1.0, &tags!("test" => "test")).unwrap();
    }

    #[test]
    fn dec() {
        let stats = L2met::with_sink(expect_line("c#queue=-2"), "");
        stats.dec("queue", 2, 1.0, &tags!()).unwrap();
    }

    #[test]
    fn gauge() {
        let stats = L2met::with_sink(expect_line("test=test g#test.test=2"), "test");
        stats.gauge("test", 2.0, 1.0, &tags!("test" => "test")).unwrap();
    }

    #[test]
    fn timing() {
        let stats = L2met::with_sink(expect_line("test=test ms#test.test=1000"), "test");
        stats.timing("test", Duration::from_secs(1), 1.0, &tags!("test" => "test")).unwrap();
    }

    #[test]
    fn tracing_sink() {
        let _guard = tracing::subscriber::set_default(tracing_subscriber::fmt().with_test_writer().finish());

        let stats = L2met::new("app");
        stats.inc("requests", 1, 1.0, &tags!("region" => "eu")).unwrap();
        stats.close().unwrap();
    }
}
