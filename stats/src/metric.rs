use std::time::Duration;

use crate::Tags;

/// Metric kind.
///
/// Increments and decrements are both counts: a decrement is simply a count with a negated magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Counter.
    Count,
    /// Gauge.
    Gauge,
    /// Timer.
    Timing,
}

impl MetricKind {
    /// Returns the short type code used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            MetricKind::Count => "c",
            MetricKind::Gauge => "g",
            MetricKind::Timing => "ms",
        }
    }
}

/// A recorded value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MetricValue {
    /// Signed count delta.
    Count(i64),
    /// Point-in-time measurement.
    Gauge(f64),
    /// Elapsed time.
    Timing(Duration),
}

impl MetricValue {
    /// Returns the kind that matches this value.
    pub const fn kind(&self) -> MetricKind {
        match self {
            MetricValue::Count(_) => MetricKind::Count,
            MetricValue::Gauge(_) => MetricKind::Gauge,
            MetricValue::Timing(_) => MetricKind::Timing,
        }
    }
}

/// A single recorded metric event, prior to encoding.
///
/// Once built, a `Metric` cannot be changed: encoders only ever see it by reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Metric {
    name: String,
    value: MetricValue,
    rate: f32,
    tags: Tags,
}

impl Metric {
    /// Creates a new `Metric`.
    pub fn new<N: Into<String>>(name: N, value: MetricValue, rate: f32, tags: Tags) -> Self {
        Metric { name: name.into(), value, rate, tags }
    }

    /// Creates an increment of `value`.
    pub fn increment<N: Into<String>>(name: N, value: i64, rate: f32, tags: Tags) -> Self {
        Self::new(name, MetricValue::Count(value), rate, tags)
    }

    /// Creates a decrement of `value`, stored as a negated count.
    pub fn decrement<N: Into<String>>(name: N, value: i64, rate: f32, tags: Tags) -> Self {
        Self::new(name, MetricValue::Count(value.wrapping_neg()), rate, tags)
    }

    /// Creates a gauge measurement.
    pub fn gauge<N: Into<String>>(name: N, value: f64, rate: f32, tags: Tags) -> Self {
        Self::new(name, MetricValue::Gauge(value), rate, tags)
    }

    /// Creates a timing measurement.
    pub fn timing<N: Into<String>>(name: N, value: Duration, rate: f32, tags: Tags) -> Self {
        Self::new(name, MetricValue::Timing(value), rate, tags)
    }

    /// Kind of this metric.
    pub const fn kind(&self) -> MetricKind {
        self.value.kind()
    }

    /// Name of this metric, without any prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recorded value.
    pub const fn value(&self) -> MetricValue {
        self.value
    }

    /// Sample rate the caller recorded this metric with.
    ///
    /// The rate is carried through unchanged. Nothing in this crate samples based on it.
    pub const fn rate(&self) -> f32 {
        self.rate
    }

    /// Tags attached to this metric.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Metric, MetricKind, MetricValue};
    use crate::tags;

    #[test]
    fn decrement_negates() {
        let metric = Metric::decrement("queue", 2, 1.0, tags!());
        assert_eq!(metric.kind(), MetricKind::Count);
        assert_eq!(metric.value(), MetricValue::Count(-2));
    }

    #[test]
    fn kinds() {
        assert_eq!(Metric::increment("a", 1, 1.0, tags!()).kind().as_str(), "c");
        assert_eq!(Metric::gauge("a", 1.5, 1.0, tags!()).kind().as_str(), "g");
        assert_eq!(
            Metric::timing("a", Duration::from_millis(3), 0.5, tags!("k" => "v")).kind().as_str(),
            "ms"
        );
    }
}
