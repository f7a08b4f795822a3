//! Tagged counters, gauges and timers.
//!
//! `stats` is the recording side of an application's metrics: components are handed a [`Stats`] emitter, either
//! directly or through a [`Context`], and record counters, gauges and timings through it. Where those metrics end up is
//! up to the emitter:
//!
//! - [`NullStats`] discards everything
//! - [`TaggedStats`] decorates another emitter with a fixed set of tags
//! - [`DebuggingStats`] keeps everything in memory, for tests
//!
//! Network transports live in the `stats-exporter-statsd` crate.
//!
//! # Usage
//!
//! ```
//! use std::{sync::Arc, time::Duration};
//!
//! use stats::{tags, Context, DebuggingStats, Stats, TaggedStats};
//!
//! # fn main() -> Result<(), stats::Error> {
//! // Every metric recorded through this emitter carries `service=api`, after the tags given at the call site.
//! let stats = TaggedStats::new(DebuggingStats::new(), tags!("service" => "api"));
//! stats.inc("requests", 1, 1.0, &tags!("route" => "/users"))?;
//!
//! // Emitters can also travel with a `Context`. Recording through a context without an emitter does nothing.
//! let ctx = Context::background().with_stats(Arc::new(stats));
//! stats::timing(&ctx, "latency", Duration::from_millis(12), 1.0, &tags!())?;
//! stats::close(&ctx)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Tags
//!
//! Tags are ordered key/value pairs. They can be built with the [`tags!`] macro, collected from `(key, value)` tuples,
//! or parsed from alternating key/value scalars with [`Tags::from_pairs`], which rejects an odd number of scalars.
//!
//! # Runtime statistics
//!
//! The [`runtime`] module periodically emits process statistics, such as the live thread count and memory usage,
//! through any emitter. It runs on a `tokio` runtime and stops when its [`Context`] is cancelled.
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]

mod context;
pub use self::context::{close, dec, from_context, gauge, inc, timing, with_stats, Context};

mod debugging;
pub use self::debugging::{DebuggingStats, Snapshotter};

mod diagnostics;
pub use self::diagnostics::{Diagnostics, TracingDiagnostics};

mod emitter;
pub use self::emitter::{NullStats, Stats};

mod error;
pub use self::error::{Error, TagsError};

mod metric;
pub use self::metric::{Metric, MetricKind, MetricValue};

pub mod runtime;

mod tag;
pub use self::tag::{SharedString, Tag, Tags};

mod tagged;
pub use self::tagged::TaggedStats;

#[cfg(test)]
mod test_util;
