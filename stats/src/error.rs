use std::io;

use thiserror::Error;

/// Errors that could occur while recording a metric or releasing an emitter.
#[derive(Debug, Error)]
pub enum Error {
    /// Writing to the remote collector failed.
    ///
    /// Encoding a metric cannot fail, so this is the only failure a recording call reports while the emitter is open.
    #[error("failed to send metrics: {0}")]
    Io(#[from] io::Error),

    /// The emitter was used after it had been closed.
    #[error("emitter has already been closed")]
    Closed,
}

/// Errors that could occur while building a tag set from free-form input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagsError {
    /// Tags given as alternating keys and values must come in pairs.
    #[error("tags must be given as key/value pairs, got {len} scalars")]
    OddLength {
        /// Number of scalars that were given.
        len: usize,
    },
}
