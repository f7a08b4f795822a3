use stats::{Metric, MetricValue, Tags};

/// Textual encoding of a metric.
///
/// Both dialects use the same type codes: `c` for counts, `g` for gauges, and `ms` for timings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dialect {
    /// Tag-annotated statsd lines, such as `app.requests,region=eu:1|c`.
    ///
    /// Tags follow the name as comma-separated `key=value` pairs. Without tags, the comma segment is omitted.
    #[default]
    Tagged,

    /// Log lines in the l2met style, such as `region=eu c#app.requests=1`.
    ///
    /// Each tag is written as `key=value` followed by a single space, ahead of the measurement itself.
    Log,
}

impl Dialect {
    /// Encodes `metric` as a single line, without a trailing newline.
    ///
    /// A non-empty `prefix` is joined to the metric name with a `.`.
    pub fn encode(self, prefix: &str, metric: &Metric) -> String {
        let mut buf = Vec::with_capacity(64);
        self.encode_into(prefix, metric, &mut buf);

        // Every piece written is either UTF-8 input or ASCII produced by the formatters.
        String::from_utf8(buf).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
    }

    /// Encodes `metric` as a single line, without a trailing newline, appending it to `buf`.
    pub fn encode_into(self, prefix: &str, metric: &Metric, buf: &mut Vec<u8>) {
        let mut formatter = ValueFormatter::new();
        let value = formatter.format(metric.value());
        let kind = metric.kind().as_str().as_bytes();

        match self {
            Dialect::Tagged => {
                write_name(prefix, metric.name(), buf);
                write_tags_tagged(metric.tags(), buf);
                buf.push(b':');
                buf.extend_from_slice(value.as_bytes());
                buf.push(b'|');
                buf.extend_from_slice(kind);
            }
            Dialect::Log => {
                write_tags_log(metric.tags(), buf);
                buf.extend_from_slice(kind);
                buf.push(b'#');
                write_name(prefix, metric.name(), buf);
                buf.push(b'=');
                buf.extend_from_slice(value.as_bytes());
            }
        }
    }
}

/// Line encoder bound to a dialect and prefix.
#[derive(Clone, Debug)]
pub(crate) struct LineEncoder {
    dialect: Dialect,
    prefix: String,
}

impl LineEncoder {
    pub fn new(dialect: Dialect, prefix: String) -> Self {
        Self { dialect, prefix }
    }

    pub fn encode(&self, metric: &Metric) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        self.dialect.encode_into(&self.prefix, metric, &mut buf);
        buf
    }

    pub fn encode_string(&self, metric: &Metric) -> String {
        self.dialect.encode(&self.prefix, metric)
    }
}

struct ValueFormatter {
    int_writer: itoa::Buffer,
    float_writer: ryu::Buffer,
}

impl ValueFormatter {
    fn new() -> Self {
        Self { int_writer: itoa::Buffer::new(), float_writer: ryu::Buffer::new() }
    }

    fn format(&mut self, value: MetricValue) -> &str {
        match value {
            MetricValue::Count(v) => self.int_writer.format(v),
            MetricValue::Gauge(v) => {
                // Integral gauges are written without a fractional part: `2`, not `2.0`.
                if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
                    self.int_writer.format(v as i64)
                } else {
                    self.float_writer.format(v)
                }
            }
            MetricValue::Timing(d) => self.int_writer.format(d.as_millis()),
        }
    }
}

fn write_name(prefix: &str, name: &str, buf: &mut Vec<u8>) {
    if !prefix.is_empty() {
        buf.extend_from_slice(prefix.as_bytes());
        buf.push(b'.');
    }
    buf.extend_from_slice(name.as_bytes());
}

fn write_tags_tagged(tags: &Tags, buf: &mut Vec<u8>) {
    for tag in tags {
        buf.push(b',');
        buf.extend_from_slice(tag.key().as_bytes());
        buf.push(b'=');
        buf.extend_from_slice(tag.value().as_bytes());
    }
}

fn write_tags_log(tags: &Tags, buf: &mut Vec<u8>) {
    for tag in tags {
        buf.extend_from_slice(tag.key().as_bytes());
        buf.push(b'=');
        buf.extend_from_slice(tag.value().as_bytes());
        buf.push(b' ');
    }
}
