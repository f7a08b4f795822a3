use std::{
    sync::Arc,
    thread::JoinHandle,
    time::{Duration, Instant},
};

use bytes::{Bytes, BytesMut};
use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use stats::{Diagnostics, Error, Metric, Stats, Tags};
use tracing::{debug, error, trace};

use crate::{
    builder::{BuildError, StatsdBuilder, DEFAULT_FLUSH_BYTES},
    forwarder::Client,
    writer::LineEncoder,
};

const DIAGNOSTICS_SOURCE: &str = "stats-exporter-statsd";

pub(crate) struct FlushConfiguration {
    pub flush_interval: Duration,
    pub flush_bytes: usize,
    pub diagnostics: Arc<dyn Diagnostics>,
}

/// Pending lines, newline-delimited.
struct Buffer {
    bytes: BytesMut,
    pending_bytes: usize,
    last_flush: Instant,
    closed: bool,
}

impl Buffer {
    fn new(capacity: usize) -> Self {
        Buffer { bytes: BytesMut::with_capacity(capacity), pending_bytes: 0, last_flush: Instant::now(), closed: false }
    }

    fn push(&mut self, line: &[u8]) {
        self.bytes.extend_from_slice(line);
        self.bytes.extend_from_slice(b"\n");
        self.pending_bytes += line.len() + 1;
    }

    /// Swaps out everything pending, leaving the buffer empty.
    fn take(&mut self) -> Option<Bytes> {
        if self.bytes.is_empty() {
            return None;
        }

        trace!(pending_bytes = self.pending_bytes, since_last_flush = ?self.last_flush.elapsed(), "Flushing buffer.");
        self.pending_bytes = 0;
        self.last_flush = Instant::now();
        Some(self.bytes.split().freeze())
    }
}

struct Shared {
    encoder: LineEncoder,
    client: RwLock<Option<Client>>,
    buffer: Mutex<Buffer>,
    flush_bytes: usize,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Shared {
    /// Writes `batch` as a single datagram, without its trailing newline.
    fn write(&self, batch: &Bytes) -> Result<(), Error> {
        let payload = batch.strip_suffix(b"\n").unwrap_or(&batch[..]);

        let client = self.client.read();
        let client = client.as_ref().ok_or(Error::Closed)?;
        client.send(payload)?;

        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        let batch = self.buffer.lock().take();
        match batch {
            Some(batch) => self.write(&batch),
            None => Ok(()),
        }
    }
}

struct Flusher {
    shutdown: Sender<()>,
    handle: JoinHandle<()>,
}

impl Flusher {
    fn spawn(shared: Arc<Shared>, flush_interval: Duration) -> Result<Self, BuildError> {
        let (shutdown, shutdown_rx) = bounded(1);
        let handle = std::thread::Builder::new()
            .name("stats-exporter-statsd-flusher".to_string())
            .spawn(move || run_flusher(&shared, flush_interval, &shutdown_rx))
            .map_err(|_| BuildError::Backend)?;

        Ok(Flusher { shutdown, handle })
    }

    fn stop(self) {
        // Fails only if the thread has already exited.
        let _ = self.shutdown.send(());
        if self.handle.join().is_err() {
            error!("Flush thread panicked.");
        }
    }
}

fn run_flusher(shared: &Shared, flush_interval: Duration, shutdown: &Receiver<()>) {
    let ticker = tick(flush_interval);

    loop {
        select! {
            recv(ticker) -> _ => {
                if let Err(e) = shared.flush() {
                    shared.diagnostics.report(DIAGNOSTICS_SOURCE, &e);
                }
            }
            recv(shutdown) -> _ => break,
        }
    }

    debug!("Flush thread stopped.");
}

/// A statsd transport that batches lines and sends them as newline-delimited datagrams.
///
/// Lines are flushed when either trigger fires first:
///
/// - the flush interval elapses, checked by a background thread
/// - a recording call brings the pending bytes to the flush size
///
/// A size-triggered flush happens on the recording call's thread, and its write error is returned from that call. A
/// failed timer-triggered flush has no caller, so its error is reported to the configured [`Diagnostics`]. Failed
/// batches are dropped either way.
///
/// Buffered lines are only guaranteed to be sent by [`Stats::close`]: dropping a `BufferedStatsd` stops the background
/// thread but discards whatever is still pending.
pub struct BufferedStatsd {
    shared: Arc<Shared>,
    flusher: Mutex<Option<Flusher>>,
}

impl BufferedStatsd {
    /// Creates a new `BufferedStatsd` sending tag-annotated lines to `addr`, with every metric name prefixed by
    /// `prefix`.
    ///
    /// The flush interval and size are left at their defaults.
    ///
    /// # Errors
    ///
    /// If `addr` cannot be parsed, the local socket cannot be created, or the background thread cannot be spawned, an
    /// error will be returned.
    pub fn new<A, P>(addr: A, prefix: P) -> Result<Self, BuildError>
    where
        A: AsRef<str>,
        P: Into<String>,
    {
        StatsdBuilder::default().with_remote_address(addr)?.with_prefix(prefix).build_buffered()
    }

    pub(crate) fn from_parts(
        encoder: LineEncoder,
        client: Client,
        config: FlushConfiguration,
    ) -> Result<Self, BuildError> {
        let shared = Arc::new(Shared {
            encoder,
            client: RwLock::new(Some(client)),
            buffer: Mutex::new(Buffer::new(config.flush_bytes.min(DEFAULT_FLUSH_BYTES))),
            flush_bytes: config.flush_bytes,
            diagnostics: config.diagnostics,
        });
        let flusher = Flusher::spawn(Arc::clone(&shared), config.flush_interval)?;

        Ok(BufferedStatsd { shared, flusher: Mutex::new(Some(flusher)) })
    }

    fn record(&self, metric: &Metric) -> Result<(), Error> {
        let line = self.shared.encoder.encode(metric);

        let batch = {
            let mut buffer = self.shared.buffer.lock();
            if buffer.closed {
                return Err(Error::Closed);
            }

            buffer.push(&line);
            if buffer.pending_bytes >= self.shared.flush_bytes {
                buffer.take()
            } else {
                None
            }
        };

        match batch {
            Some(batch) => self.shared.write(&batch),
            None => Ok(()),
        }
    }
}

impl Stats for BufferedStatsd {
    fn inc(&self, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.record(&Metric::increment(name, value, rate, tags.clone()))
    }

    fn dec(&self, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.record(&Metric::decrement(name, value, rate, tags.clone()))
    }

    fn gauge(&self, name: &str, value: f64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.record(&Metric::gauge(name, value, rate, tags.clone()))
    }

    fn timing(&self, name: &str, value: Duration, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.record(&Metric::timing(name, value, rate, tags.clone()))
    }

    /// Stops the background thread, flushes anything pending and releases the socket.
    ///
    /// The error of the final flush, if any, is returned.
    fn close(&self) -> Result<(), Error> {
        let Some(flusher) = self.flusher.lock().take() else {
            return Err(Error::Closed);
        };
        flusher.stop();

        let batch = {
            let mut buffer = self.shared.buffer.lock();
            buffer.closed = true;
            buffer.take()
        };
        let result = match batch {
            Some(batch) => self.shared.write(&batch),
            None => Ok(()),
        };

        self.shared.client.write().take();
        result
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::UdpSocket,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    use bytes::Bytes;
    use stats::{tags, Diagnostics, Error, Stats};

    use super::{Buffer, BufferedStatsd};
    use crate::StatsdBuilder;

    #[derive(Clone, Default)]
    struct CountingDiagnostics(Arc<AtomicUsize>);

    impl Diagnostics for CountingDiagnostics {
        fn report(&self, source: &'static str, _error: &Error) {
            assert_eq!(source, "stats-exporter-statsd");
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn buffer_take_swaps_out_everything() {
        let mut buffer = Buffer::new(16);
        assert!(buffer.take().is_none());

        buffer.push(b"a:1|c");
        buffer.push(b"b:2|c");
        assert_eq!(buffer.pending_bytes, 12);

        assert_eq!(buffer.take(), Some(Bytes::from_static(b"a:1|c\nb:2|c\n")));
        assert_eq!(buffer.pending_bytes, 0);
        assert!(buffer.take().is_none());
    }

    #[test]
    fn size_trigger_returns_write_error() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let stats = StatsdBuilder::default()
            .with_remote_address(server.local_addr().unwrap().to_string())
            .unwrap()
            .with_flush_interval(Duration::from_secs(3600))
            .with_flush_bytes(1)
            .build_buffered()
            .unwrap();

        // Next write fails.
        stats.shared.client.write().take();

        assert!(matches!(stats.inc("test", 1, 1.0, &tags!()), Err(Error::Closed)));
        assert!(stats.shared.buffer.lock().bytes.is_empty());
    }

    #[test]
    fn timer_flush_errors_go_to_diagnostics() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let diagnostics = CountingDiagnostics::default();
        let stats = StatsdBuilder::default()
            .with_remote_address(server.local_addr().unwrap().to_string())
            .unwrap()
            .with_flush_interval(Duration::from_millis(10))
            .with_diagnostics(diagnostics.clone())
            .build_buffered()
            .unwrap();

        stats.shared.client.write().take();
        stats.inc("test", 1, 1.0, &tags!()).unwrap();

        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(diagnostics.0.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn huge_flush_size_disables_size_trigger() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        server.set_read_timeout(Some(Duration::from_millis(200))).unwrap();
        let stats = StatsdBuilder::default()
            .with_remote_address(server.local_addr().unwrap().to_string())
            .unwrap()
            .with_flush_interval(Duration::from_secs(3600))
            .with_flush_bytes(usize::MAX)
            .build_buffered()
            .unwrap();

        for _ in 0..100 {
            stats.inc("test", 1, 1.0, &tags!()).unwrap();
        }
        assert_eq!(stats.shared.buffer.lock().pending_bytes, 900);

        let mut buf = [0u8; 2048];
        assert!(server.recv(&mut buf).is_err());

        stats.close().unwrap();
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(buf[..n].split(|b| *b == b'\n').count(), 100);
    }

    #[test]
    fn closed() {
        let stats = BufferedStatsd::new("127.0.0.1:1234", "test").unwrap();
        stats.close().unwrap();

        assert!(matches!(stats.inc("test", 1, 1.0, &tags!()), Err(Error::Closed)));
        assert!(matches!(stats.close(), Err(Error::Closed)));
    }
}
