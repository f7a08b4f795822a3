//! Request-scoped propagation of an emitter.
//!
//! A [`Context`] is threaded through call chains by the caller, and can carry a single emitter along with a
//! cancellation signal. Code deep in a call chain can then record metrics without having the emitter passed to it
//! explicitly:
//!
//! ```
//! # use std::sync::Arc;
//! # use stats::{Context, NullStats, Stats};
//! let ctx = Context::background().with_stats(Arc::new(NullStats));
//!
//! // Elsewhere, further down the call chain:
//! stats::inc(&ctx, "requests", 1, 1.0, &stats::tags!("region" => "eu")).unwrap();
//! ```
//!
//! The free functions in this module are silent no-ops when the context holds no emitter, so call sites can record
//! metrics unconditionally.
use std::{fmt, sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{Error, Stats, Tags};

/// A cancellable context that can carry an emitter.
///
/// Contexts are immutable: deriving a new one with [`Context::with_stats`] or [`Context::with_cancel`] leaves the
/// original untouched. Cloning is cheap.
#[derive(Clone, Default)]
pub struct Context {
    stats: Option<Arc<dyn Stats>>,
    token: CancellationToken,
}

impl Context {
    /// Creates an empty context with no emitter and its own cancellation signal.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derives a context that holds `stats`.
    ///
    /// Any emitter already held by this context is shadowed in the derived one. The cancellation signal is shared.
    #[must_use]
    pub fn with_stats(&self, stats: Arc<dyn Stats>) -> Context {
        Context { stats: Some(stats), token: self.token.clone() }
    }

    /// Derives a context that is cancelled when either it or this context is cancelled.
    #[must_use]
    pub fn with_cancel(&self) -> Context {
        Context { stats: self.stats.clone(), token: self.token.child_token() }
    }

    /// Gets the emitter held by this context, if any.
    pub fn stats(&self) -> Option<&Arc<dyn Stats>> {
        self.stats.as_ref()
    }

    /// Cancels this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` if this context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until this context is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("has_stats", &self.stats.is_some())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Derives a context from `ctx` that holds `stats`.
pub fn with_stats(ctx: &Context, stats: Arc<dyn Stats>) -> Context {
    ctx.with_stats(stats)
}

/// Gets the emitter held by `ctx`, if any.
///
/// An emitter stays reachable after the context has been cancelled.
pub fn from_context(ctx: &Context) -> Option<Arc<dyn Stats>> {
    ctx.stats.clone()
}

/// Increments a counter through the emitter in `ctx`, doing nothing if there is none.
///
/// # Errors
///
/// Returns the emitter's error, if it fails.
pub fn inc(ctx: &Context, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error> {
    match ctx.stats() {
        Some(stats) => stats.inc(name, value, rate, tags),
        None => Ok(()),
    }
}

/// Decrements a counter through the emitter in `ctx`, doing nothing if there is none.
///
/// # Errors
///
/// Returns the emitter's error, if it fails.
pub fn dec(ctx: &Context, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error> {
    match ctx.stats() {
        Some(stats) => stats.dec(name, value, rate, tags),
        None => Ok(()),
    }
}

/// Records a gauge through the emitter in `ctx`, doing nothing if there is none.
///
/// # Errors
///
/// Returns the emitter's error, if it fails.
pub fn gauge(ctx: &Context, name: &str, value: f64, rate: f32, tags: &Tags) -> Result<(), Error> {
    match ctx.stats() {
        Some(stats) => stats.gauge(name, value, rate, tags),
        None => Ok(()),
    }
}

/// Records a timing through the emitter in `ctx`, doing nothing if there is none.
///
/// # Errors
///
/// Returns the emitter's error, if it fails.
pub fn timing(ctx: &Context, name: &str, value: Duration, rate: f32, tags: &Tags) -> Result<(), Error> {
    match ctx.stats() {
        Some(stats) => stats.timing(name, value, rate, tags),
        None => Ok(()),
    }
}

/// Closes the emitter in `ctx`, doing nothing if there is none.
///
/// # Errors
///
/// Returns the emitter's error, if it fails.
pub fn close(ctx: &Context) -> Result<(), Error> {
    match ctx.stats() {
        Some(stats) => stats.close(),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use mockall::predicate::eq;

    use super::{from_context, with_stats, Context};
    use crate::{tags, test_util::MockStats, Error, NullStats, Stats, Tags};

    fn context_with(mock: MockStats) -> Context {
        with_stats(&Context::background(), Arc::new(mock))
    }

    #[test]
    fn round_trip() {
        let stats: Arc<dyn Stats> = Arc::new(NullStats);
        let ctx = with_stats(&Context::background(), Arc::clone(&stats));

        let found = from_context(&ctx).expect("stats should be found");
        assert!(Arc::ptr_eq(&found, &stats));
    }

    #[test]
    fn miss() {
        let ctx = Context::background();
        assert!(from_context(&ctx).is_none());
    }

    #[test]
    fn derived_context_leaves_parent_untouched() {
        let parent = Context::background();
        let child = parent.with_stats(Arc::new(NullStats));

        assert!(parent.stats().is_none());
        assert!(child.stats().is_some());
    }

    #[test]
    fn inc() {
        let mut mock = MockStats::new();
        mock.expect_inc()
            .with(eq("test"), eq(1i64), eq(1.0f32), eq(Tags::new()))
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        let ctx = context_with(mock);

        super::inc(&ctx, "test", 1, 1.0, &tags!()).unwrap();
    }

    #[test]
    fn dec() {
        let mut mock = MockStats::new();
        mock.expect_dec()
            .with(eq("test"), eq(1i64), eq(1.0f32), eq(Tags::new()))
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        let ctx = context_with(mock);

        super::dec(&ctx, "test", 1, 1.0, &tags!()).unwrap();
    }

    #[test]
    fn gauge() {
        let mut mock = MockStats::new();
        mock.expect_gauge()
            .with(eq("test"), eq(1.0f64), eq(1.0f32), eq(Tags::new()))
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        let ctx = context_with(mock);

        super::gauge(&ctx, "test", 1.0, 1.0, &tags!()).unwrap();
    }

    #[test]
    fn timing() {
        let mut mock = MockStats::new();
        mock.expect_timing()
            .with(eq("test"), eq(Duration::from_secs(1)), eq(1.0f32), eq(Tags::new()))
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        let ctx = context_with(mock);

        super::timing(&ctx, "test", Duration::from_secs(1), 1.0, &tags!()).unwrap();
    }

    #[test]
    fn close_returns_emitter_error() {
        let mut mock = MockStats::new();
        mock.expect_close().times(1).returning(|| Err(Error::Closed));
        let ctx = context_with(mock);

        assert!(matches!(super::close(&ctx), Err(Error::Closed)));
    }

    #[test]
    fn no_op_without_stats() {
        let ctx = Context::background();
        let tags = tags!("k" => "v");

        assert!(super::inc(&ctx, "test", 1, 1.0, &tags).is_ok());
        assert!(super::dec(&ctx, "test", 1, 1.0, &tags).is_ok());
        assert!(super::gauge(&ctx, "test", 1.0, 1.0, &tags).is_ok());
        assert!(super::timing(&ctx, "test", Duration::from_secs(1), 1.0, &tags).is_ok());
        assert!(super::close(&ctx).is_ok());
    }

    #[test]
    fn cancelled_context_still_resolves() {
        let mut mock = MockStats::new();
        mock.expect_inc().times(1).returning(|_, _, _, _| Ok(()));
        let ctx = context_with(mock).with_cancel();
        ctx.cancel();

        assert!(ctx.is_cancelled());
        super::inc(&ctx, "test", 1, 1.0, &tags!()).unwrap();

        let empty = Context::background().with_cancel();
        empty.cancel();
        assert!(super::inc(&empty, "test", 1, 1.0, &tags!()).is_ok());
    }

    #[test]
    fn cancellation_flows_to_children_only() {
        let parent = Context::background();
        let child = parent.with_cancel();
        let grandchild = child.with_stats(Arc::new(NullStats));

        child.cancel();
        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
        assert!(!parent.is_cancelled());
    }
}
