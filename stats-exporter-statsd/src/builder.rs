use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use stats::{Diagnostics, TracingDiagnostics};
use thiserror::Error;

use crate::{
    buffered::{BufferedStatsd, FlushConfiguration},
    forwarder::{Client, RemoteAddr},
    immediate::Statsd,
    writer::{Dialect, LineEncoder},
};

/// Default timeout for a single datagram write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Default interval between timer-triggered flushes of a buffered transport.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(100);

/// Default number of buffered bytes that triggers a flush.
///
/// A batch of this size fits in a single datagram on a typical 1500-byte MTU link.
pub const DEFAULT_FLUSH_BYTES: usize = 1432;

/// Errors that could occur while building a statsd transport.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Failed to parse the remote address.
    #[error("invalid remote address: {reason}")]
    InvalidRemoteAddress {
        /// Details about the parsing failure.
        reason: String,
    },

    /// Failed to create or connect the local socket.
    #[error("failed to bind statsd client socket: {0}")]
    Bind(#[source] io::Error),

    /// Failed to spawn the background flush thread.
    #[error("failed to spawn background flush thread for buffered transport")]
    Backend,
}

/// Builder for statsd transports.
pub struct StatsdBuilder {
    remote_addr: RemoteAddr,
    prefix: String,
    dialect: Dialect,
    write_timeout: Duration,
    flush_interval: Duration,
    flush_bytes: usize,
    diagnostics: Arc<dyn Diagnostics>,
}

impl StatsdBuilder {
    /// Set the remote address to send metrics to.
    ///
    /// The address needs to be in the format of `<host>:<port>`, and is resolved immediately.
    ///
    /// Defaults to `127.0.0.1:8125`.
    ///
    /// # Errors
    ///
    /// If the given address is not able to be parsed as a valid address, an error will be returned indicating the
    /// reason.
    pub fn with_remote_address<A>(mut self, addr: A) -> Result<Self, BuildError>
    where
        A: AsRef<str>,
    {
        self.remote_addr = RemoteAddr::try_from(addr.as_ref())
            .map_err(|reason| BuildError::InvalidRemoteAddress { reason })?;
        Ok(self)
    }

    /// Set the prefix joined to every metric name with a `.`.
    ///
    /// Defaults to no prefix.
    #[must_use]
    pub fn with_prefix<P>(mut self, prefix: P) -> Self
    where
        P: Into<String>,
    {
        self.prefix = prefix.into();
        self
    }

    /// Set the wire dialect.
    ///
    /// Defaults to [`Dialect::Tagged`].
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the write timeout.
    ///
    /// When the write timeout is reached, the write operation is aborted and the datagram being sent at the time is
    /// dropped without retrying.
    ///
    /// Defaults to 1 second.
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the interval between timer-triggered flushes of a buffered transport.
    ///
    /// An interval of zero is ignored. Has no effect on an immediate transport.
    ///
    /// Defaults to 100 milliseconds.
    #[must_use]
    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        if !flush_interval.is_zero() {
            self.flush_interval = flush_interval;
        }
        self
    }

    /// Set the number of buffered bytes that triggers a flush of a buffered transport.
    ///
    /// The recording call that brings the buffer to this size flushes it before returning. Has no effect on an
    /// immediate transport.
    ///
    /// Defaults to 1,432 bytes.
    #[must_use]
    pub fn with_flush_bytes(mut self, flush_bytes: usize) -> Self {
        self.flush_bytes = flush_bytes;
        self
    }

    /// Set where failures of timer-triggered flushes are reported.
    ///
    /// Defaults to [`TracingDiagnostics`].
    #[must_use]
    pub fn with_diagnostics<D>(mut self, diagnostics: D) -> Self
    where
        D: Diagnostics + 'static,
    {
        self.diagnostics = Arc::new(diagnostics);
        self
    }

    /// Builds an immediate transport, which sends one datagram per recorded metric.
    ///
    /// # Errors
    ///
    /// If the local socket cannot be created or connected, an error will be returned.
    pub fn build(self) -> Result<Statsd, BuildError> {
        let client = Client::connect(&self.remote_addr, self.write_timeout).map_err(BuildError::Bind)?;
        let encoder = LineEncoder::new(self.dialect, self.prefix);

        Ok(Statsd::from_parts(encoder, client))
    }

    /// Builds a buffered transport, which batches lines and flushes them on a timer or once enough bytes are pending.
    ///
    /// A background thread is spawned to drive the timer.
    ///
    /// # Errors
    ///
    /// If the local socket cannot be created or connected, or the background thread cannot be spawned, an error will be
    /// returned.
    pub fn build_buffered(self) -> Result<BufferedStatsd, BuildError> {
        let client = Client::connect(&self.remote_addr, self.write_timeout).map_err(BuildError::Bind)?;
        let encoder = LineEncoder::new(self.dialect, self.prefix);
        let config = FlushConfiguration {
            flush_interval: self.flush_interval,
            flush_bytes: self.flush_bytes,
            diagnostics: self.diagnostics,
        };

        BufferedStatsd::from_parts(encoder, client, config)
    }
}

impl Default for StatsdBuilder {
    fn default() -> Self {
        StatsdBuilder {
            remote_addr: RemoteAddr::from(SocketAddr::from(([127, 0, 0, 1], 8125))),
            prefix: String::new(),
            dialect: Dialect::default(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            flush_bytes: DEFAULT_FLUSH_BYTES,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }
}
