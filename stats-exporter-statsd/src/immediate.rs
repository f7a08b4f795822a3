use std::time::Duration;

use parking_lot::RwLock;
use stats::{Error, Metric, Stats, Tags};

use crate::{
    builder::{BuildError, StatsdBuilder},
    forwarder::Client,
    writer::LineEncoder,
};

/// A statsd transport that sends every metric as its own datagram.
///
/// Each recording call encodes the metric and writes it before returning, so write failures are returned to the caller
/// as-is.
#[derive(Debug)]
pub struct Statsd {
    encoder: LineEncoder,
    client: RwLock<Option<Client>>,
}

impl Statsd {
    /// Creates a new `Statsd` sending tag-annotated lines to `addr`, with every metric name prefixed by `prefix`.
    ///
    /// # Errors
    ///
    /// If `addr` cannot be parsed, or the local socket cannot be created, an error will be returned.
    pub fn new<A, P>(addr: A, prefix: P) -> Result<Self, BuildError>
    where
        A: AsRef<str>,
        P: Into<String>,
    {
        StatsdBuilder::default().with_remote_address(addr)?.with_prefix(prefix).build()
    }

    pub(crate) fn from_parts(encoder: LineEncoder, client: Client) -> Self {
        Statsd { encoder, client: RwLock::new(Some(client)) }
    }

    fn send(&self, metric: &Metric) -> Result<(), Error> {
        let line = self.encoder.encode(metric);

        let client = self.client.read();
        let client = client.as_ref().ok_or(Error::Closed)?;
        client.send(&line)?;

        Ok(())
    }
}

impl Stats for Statsd {
    fn inc(&self, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.send(&Metric::increment(name, value, rate, tags.clone()))
    }

    fn dec(&self, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.send(&Metric::decrement(name, value, rate, tags.clone()))
    }

    fn gauge(&self, name: &str, value: f64, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.send(&Metric::gauge(name, value, rate, tags.clone()))
    }

    fn timing(&self, name: &str, value: Duration, rate: f32, tags: &Tags) -> Result<(), Error> {
        self.send(&Metric::timing(name, value, rate, tags.clone()))
    }

    fn close(&self) -> Result<(), Error> {
        match self.client.write().take() {
            Some(_) => Ok(()),
            None => Err(Error::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{net::UdpSocket, time::Duration};

    use stats::{tags, Error, Stats};

    use super::Statsd;
    use crate::{Dialect, StatsdBuilder};

    fn server() -> (UdpSocket, String) {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        server.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
        let addr = server.local_addr().unwrap().to_string();
        (server, addr)
    }

    fn recv(server: &UdpSocket) -> String {
        let mut buf = [0u8; 1024];
        let n = server.recv(&mut buf).unwrap();
        String::from_utf8_lossy(&buf[..n]).into_owned()
    }

    #[test]
    fn new() {
        assert!(Statsd::new("127.0.0.1:1234", "test").is_ok());
        assert!(Statsd::new("127.0", "test").is_err());
    }

    #[test]
    fn records() {
        let (server, addr) = server();
        let stats = Statsd::new(&addr, "test").unwrap();

        stats.inc("test", 2, 1.0, &tags!("test" => "test")).unwrap();
        assert_eq!(recv(&server), "test.test,test=test:2|c");

        stats.dec("test", 2, 1.0, &tags!("test" => "test")).unwrap();
        assert_eq!(recv(&server), "test.test,test=test:-2|c");

        stats.gauge("test", 2.0, 1.0, &tags!("test" => "test")).unwrap();
        assert_eq!(recv(&server), "test.test,test=test:2|g");

        stats.timing("test", Duration::from_secs(1), 1.0, &tags!("test" => "test")).unwrap();
        assert_eq!(recv(&server), "test.test,test=test:1000|ms");
    }

    #[test]
    fn log_dialect() {
        let (server, addr) = server();
        let stats = StatsdBuilder::default()
            .with_remote_address(&addr)
            .unwrap()
            .with_dialect(Dialect::Log)
            .build()
            .unwrap();

        stats.dec("queue", 2, 1.0, &tags!()).unwrap();
        assert_eq!(recv(&server), "c#queue=-2");
    }

    #[test]
    fn closed() {
        let stats = Statsd::new("127.0.0.1:1234", "test").unwrap();
        stats.close().unwrap();

        assert!(matches!(stats.inc("test", 1, 1.0, &tags!()), Err(Error::Closed)));
        assert!(matches!(stats.close(), Err(Error::Closed)));
    }
}
