use std::{
    io,
    net::{Ipv4Addr, SocketAddr, ToSocketAddrs as _, UdpSocket},
    time::Duration,
};

use tracing::debug;

/// Resolved address of the remote collector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RemoteAddr(Vec<SocketAddr>);

impl RemoteAddr {
    pub fn addrs(&self) -> &[SocketAddr] {
        &self.0
    }
}

impl From<SocketAddr> for RemoteAddr {
    fn from(addr: SocketAddr) -> Self {
        RemoteAddr(vec![addr])
    }
}

impl<'a> TryFrom<&'a str> for RemoteAddr {
    type Error = String;

    fn try_from(addr: &'a str) -> Result<Self, Self::Error> {
        match addr.to_socket_addrs() {
            Ok(addrs) => {
                let addrs = addrs.collect::<Vec<_>>();
                if addrs.is_empty() {
                    Err(format!("'{addr}' did not resolve to any address"))
                } else {
                    Ok(RemoteAddr(addrs))
                }
            }
            Err(e) => Err(e.to_string()),
        }
    }
}

/// A connected datagram socket.
///
/// Each call to [`Client::send`] writes exactly one datagram.
#[derive(Debug)]
pub(crate) struct Client {
    socket: UdpSocket,
}

impl Client {
    /// Binds an ephemeral local socket and connects it to `remote_addr`.
    pub fn connect(remote_addr: &RemoteAddr, write_timeout: Duration) -> io::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(remote_addr.addrs())?;
        socket.set_write_timeout(Some(write_timeout))?;

        debug!(
            local_addr = ?socket.local_addr().ok(),
            peer_addr = ?socket.peer_addr().ok(),
            "Connected statsd client."
        );

        Ok(Client { socket })
    }

    pub fn send(&self, payload: &[u8]) -> io::Result<usize> {
        self.socket.send(payload)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::{SocketAddr, UdpSocket},
        time::Duration,
    };

    use super::{Client, RemoteAddr};

    #[test]
    fn parses_socket_addresses() {
        let addr = RemoteAddr::try_from("127.0.0.1:8125").unwrap();
        let expected: SocketAddr = "127.0.0.1:8125".parse().unwrap();
        assert_eq!(addr.addrs(), &[expected]);

        assert!(RemoteAddr::try_from("localhost:8125").is_ok());
    }

    #[test]
    fn rejects_invalid_addresses() {
        assert!(RemoteAddr::try_from("127.0.0.1").is_err());
        assert!(RemoteAddr::try_from("127.0.0.1:notaport").is_err());
        assert!(RemoteAddr::try_from("").is_err());
    }

    #[test]
    fn sends_one_datagram_per_call() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        server.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
        let addr = RemoteAddr::try_from(server.local_addr().unwrap().to_string().as_str()).unwrap();

        let client = Client::connect(&addr, Duration::from_secs(1)).unwrap();
        client.send(b"first").unwrap();
        client.send(b"second").unwrap();

        let mut buf = [0u8; 64];
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"first");
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"second");
    }
}
