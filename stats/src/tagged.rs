use std::time::Duration;

use crate::{Error, SharedString, Stats, Tags, TagsError};

/// Applies a fixed set of tags to every metric.
///
/// The tags given at each call site come first, followed by the fixed tags. The fixed tags are never modified after
/// construction, so a `TaggedStats` can be shared across threads without any locking of its own.
pub struct TaggedStats<S> {
    tags: Tags,
    inner: S,
}

impl<S> TaggedStats<S> {
    /// Creates a new `TaggedStats` that appends `tags` to every metric recorded through `inner`.
    pub fn new<T: Into<Tags>>(inner: S, tags: T) -> Self {
        TaggedStats { tags: tags.into(), inner }
    }

    /// Creates a new `TaggedStats` from free-form alternating key/value scalars.
    ///
    /// # Errors
    ///
    /// If an odd number of scalars is given, [`TagsError::OddLength`] is returned.
    pub fn from_pairs<I, T>(inner: S, pairs: I) -> Result<Self, TagsError>
    where
        I: IntoIterator<Item = T>,
        T: Into<SharedString>,
    {
        Ok(Self::new(inner, Tags::from_pairs(pairs)?))
    }

    /// Gets the fixed tags.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Gets a reference to the wrapped emitter.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Consumes this `TaggedStats`, returning the wrapped emitter.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn merge(&self, tags: &Tags) -> Tags {
        Tags::concat(tags, &self.tags)
    }
}

impl<S: Stats> Stats for TaggedStats<S> {
    fn inc(&self, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.inner.inc(name, value, rate, &self.merge(tags))
    }

    fn dec(&self, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.inner.dec(name, value, rate, &self.merge(tags))
    }

    fn gauge(&self, name: &str, value: f64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.inner.gauge(name, value, rate, &self.merge(tags))
    }

    fn timing(&self, name: &str, value: Duration, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.inner.timing(name, value, rate, &self.merge(tags))
    }

    fn close(&self) -> Result<(), Error> {
        self.inner.close()
    }
}
