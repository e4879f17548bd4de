//! Byte transport underneath the exchange engine.
//!
//! The protocol has no framing of its own, so a transport only moves raw
//! buffers: one `send` per request and one `receive` per response.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// A blocking, connection-oriented byte pipe to the stub.
pub trait Transport {
    /// Writes all of `buf` or fails.
    fn send(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Blocks until data arrives and copies up to `buf.len()` bytes into it.
    ///
    /// Returns `Ok(0)` once the peer has closed the connection.
    fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, buf: &[u8]) -> io::Result<()> {
        (**self).send(buf)
    }

    fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).receive(buf)
    }
}

/// A single TCP connection to the stub.
#[derive(Debug)]
pub struct TcpTransport {
    /// The connected socket.
    stream: TcpStream,
}

impl TcpTransport {
    /// Connects to `addr`, trying each resolved address in turn.
    ///
    /// `timeout` bounds each connection attempt. Reads and writes on the
    /// established connection block without a deadline.
    pub fn connect(addr: impl ToSocketAddrs, timeout: Duration) -> io::Result<Self> {
        let mut last = None;
        for candidate in addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&candidate, timeout) {
                Ok(stream) => {
                    // Requests must leave as a single segment.
                    stream.set_nodelay(true)?;
                    return Ok(Self { stream });
                }
                Err(e) => last = Some(e),
            }
        }
        Err(last.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
        }))
    }

    /// Wraps an already-connected stream.
    pub const fn from_stream(stream: TcpStream) -> Self {
        Self { stream }
    }

    /// Closes both directions of the connection.
    pub fn disconnect(self) -> io::Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stream.write_all(buf)?;
        self.stream.flush()
    }

    fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.stream.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn sends_and_receives_raw_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let peer = std::thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            let mut buf = [0u8; 16];
            let n = sock.read(&mut buf).unwrap();
            sock.write_all(&buf[..n]).unwrap();
        });

        let mut t = TcpTransport::connect(addr, Duration::from_secs(1)).unwrap();
        t.send(b"ping").unwrap();
        let mut buf = [0u8; 16];
        let n = t.receive(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ping");

        peer.join().unwrap();
        assert_eq!(t.receive(&mut buf).unwrap(), 0);
        t.disconnect().unwrap();
    }

    #[test]
    fn connect_to_closed_port_fails() {
        let addr = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        // Listener dropped: nothing accepts on `addr` any more.
        assert!(TcpTransport::connect(addr, Duration::from_secs(1)).is_err());
    }
}
