use std::time::Duration;

use crate::{Error, Tags};

/// A trait for recording counters, gauges and timings.
///
/// This is the capability every component that wants to emit metrics receives, either directly or through a
/// [`Context`](crate::Context). Implementations may be called concurrently from any thread.
///
/// Every recording operation takes the metric name, the value, a sample rate in `(0.0, 1.0]`, and the tags for that
/// single call. Names are dot-delimited by convention but never validated.
pub trait Stats: Send + Sync {
    /// Increments a counter by `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the metric could not be delivered to the collector.
    fn inc(&self, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error>;

    /// Decrements a counter by `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the metric could not be delivered to the collector.
    fn dec(&self, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error>;

    /// Records the current value of a gauge.
    ///
    /// # Errors
    ///
    /// Returns an error if the metric could not be delivered to the collector.
    fn gauge(&self, name: &str, value: f64, rate: f32, tags: &Tags) -> Result<(), Error>;

    /// Records a timing.
    ///
    /// # Errors
    ///
    /// Returns an error if the metric could not be delivered to the collector.
    fn timing(&self, name: &str, value: Duration, rate: f32, tags: &Tags) -> Result<(), Error>;

    /// Releases any held resources: pending buffers are flushed, background work is stopped, and connections are
    /// closed.
    ///
    /// Callers should close an emitter once. Closing it a second time is not guarded against.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing pending metrics failed.
    fn close(&self) -> Result<(), Error>;
}

// Blanket implementations.
macro_rules! impl_stats {
    ($inner_ty:ident, $ptr_ty:ty) => {
        impl<$inner_ty> $crate::Stats for $ptr_ty
        where
            $inner_ty: $crate::Stats + ?Sized,
        {
            fn inc(&self, name: &str, value: i64, rate: f32, tags: &$crate::Tags) -> Result<(), $crate::Error> {
                std::ops::Deref::deref(self).inc(name, value, rate, tags)
            }

            fn dec(&self, name: &str, value: i64, rate: f32, tags: &$crate::Tags) -> Result<(), $crate::Error> {
                std::ops::Deref::deref(self).dec(name, value, rate, tags)
            }

            fn gauge(&self, name: &str, value: f64, rate: f32, tags: &$crate::Tags) -> Result<(), $crate::Error> {
                std::ops::Deref::deref(self).gauge(name, value, rate, tags)
            }

            fn timing(
                &self,
                name: &str,
                value: std::time::Duration,
                rate: f32,
                tags: &$crate::Tags,
            ) -> Result<(), $crate::Error> {
                std::ops::Deref::deref(self).timing(name, value, rate, tags)
            }

            fn close(&self) -> Result<(), $crate::Error> {
                std::ops::Deref::deref(self).close()
            }
        }
    };
}

impl_stats!(T, &T);
impl_stats!(T, std::boxed::Box<T>);
impl_stats!(T, std::sync::Arc<T>);

/// An emitter that discards everything.
///
/// Useful as a placeholder where metrics are optional, and as the innermost emitter when testing decorators.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullStats;

impl Stats for NullStats {
    fn inc(&self, _name: &str, _value: i64, _rate: f32, _tags: &Tags) -> Result<(), Error> {
        Ok(())
    }

    fn dec(&self, _name: &str, _value: i64, _rate: f32, _tags: &Tags) -> Result<(), Error> {
        Ok(())
    }

    fn gauge(&self, _name: &str, _value: f64, _rate: f32, _tags: &Tags) -> Result<(), Error> {
        Ok(())
    }

    fn timing(&self, _name: &str, _value: Duration, _rate: f32, _tags: &Tags) -> Result<(), Error> {
        Ok(())
    }

    fn close(&self) -> Result<(), Error> {
        Ok(())
    }
}
