//! Statsd transports for the [`stats`] emitter.
//!
//! # Usage
//!
//! Every transport implements [`stats::Stats`], and is configured through [`StatsdBuilder`]:
//!
//! ```no_run
//! # use std::time::Duration;
//! # use stats::{tags, Stats};
//! # use stats_exporter_statsd::{Dialect, StatsdBuilder};
//! // An immediate transport sends one datagram for every recorded metric.
//! let statsd = StatsdBuilder::default()
//!     .with_remote_address("127.0.0.1:8125")
//!     .expect("failed to parse remote address")
//!     .with_prefix("app")
//!     .build()
//!     .expect("failed to build transport");
//!
//! // Sends `app.requests,region=eu:1|c`.
//! statsd.inc("requests", 1, 1.0, &tags!("region" => "eu")).expect("failed to send");
//!
//! // A buffered transport batches lines and flushes them on a timer, or once enough bytes are pending.
//! let buffered = StatsdBuilder::default()
//!     .with_dialect(Dialect::Tagged)
//!     .with_flush_interval(Duration::from_millis(250))
//!     .with_flush_bytes(1432)
//!     .build_buffered()
//!     .expect("failed to build transport");
//!
//! buffered.timing("latency", Duration::from_millis(12), 1.0, &tags!()).expect("failed to buffer");
//!
//! // Closing a buffered transport flushes whatever is still pending.
//! buffered.close().expect("failed to flush");
//! ```
//!
//! # Dialects
//!
//! Lines are either tag-annotated statsd lines (`app.requests,region=eu:1|c`), or l2met-style log lines
//! (`region=eu c#app.requests=1`). See [`Dialect`] for details.
//!
//! Log lines are usually consumed from the application's own logs rather than a socket: [`L2met`] writes them to a
//! [`LineSink`], which by default is the `tracing` event stream.
//!
//! # Failures
//!
//! Delivery is at-most-once. Write failures are returned from the call that performed the write, and batches that fail
//! to send are dropped. The only writes with no caller are timer-triggered flushes, whose failures are handed to a
//! [`stats::Diagnostics`] sink (by default, logged through `tracing`).
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]

mod buffered;
pub use self::buffered::BufferedStatsd;

mod builder;
pub use self::builder::{
    BuildError, StatsdBuilder, DEFAULT_FLUSH_BYTES, DEFAULT_FLUSH_INTERVAL, DEFAULT_WRITE_TIMEOUT,
};

mod forwarder;

mod immediate;
pub use self::immediate::Statsd;

mod l2met;
pub use self::l2met::{L2met, LineSink, TracingLineSink};

mod writer;
pub use self::writer::Dialect;
