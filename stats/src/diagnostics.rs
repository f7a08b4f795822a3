use tracing::error;

use crate::Error;

/// A sink for failures that have no caller to report to.
///
/// Background work, such as a timer-driven flush or the runtime sampler, cannot return an error to anyone. Instead, the
/// failure is handed to a `Diagnostics` implementation so that it is at least visible.
pub trait Diagnostics: Send + Sync {
    /// Reports a failure that happened while doing background work on behalf of `source`.
    fn report(&self, source: &'static str, error: &Error);
}

/// Reports failures as `tracing` events at the error level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, source: &'static str, error: &Error) {
        error!(source, error = %error, "Dropped metrics.");
    }
}
