use std::net::SocketAddr;

use socket2::Domain;
use tokio::net::{TcpListener, TcpStream};

/// A stream of incoming connections.
/// [`IncomingStream::bind`] is the primary entrypoint for constructing a new [`IncomingStream`].
///
/// Incoming connections are usually passed to a [`Server`](super::Server) instance to be handled.
/// Check out [`Server::bind`](super::Server::bind) or
/// [`Server::listen`](super::Server::listen) for more information.
pub struct IncomingStream {
    listener: TcpListener,
}

impl IncomingStream {
    /// Create a new [`IncomingStream`] by binding to a socket address.
    /// The socket is configured to be non-blocking and to reuse the address.
    pub async fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        let socket = socket2::Socket::new(
            Domain::for_address(addr),
            socket2::Type::STREAM,
            Some(socket2::Protocol::TCP),
        )?;

        socket.set_reuse_address(true)?;
        socket.set_nonblocking(true)?;
        socket.bind(&addr.into())?;
        socket.listen(1024_i32)?;

        let listener = std::net::TcpListener::from(socket);
        Ok(Self {
            listener: TcpListener::from_std(listener)?,
        })
    }

    /// Returns the address that this [`IncomingStream`] is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        // It differs from the requested address when binding to port 0.
        self.listener.local_addr()
    }

    /// Accepts a new incoming connection from the underlying listener.
    pub async fn accept(&self) -> std::io::Result<(TcpStream, SocketAddr)> {
        self.listener.accept().await
    }
}

#[cfg(test)]
mod tests {
    use super::IncomingStream;
    use std::net::SocketAddr;

    #[tokio::test]
    async fn binding_to_port_zero_picks_a_free_port() {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let incoming = IncomingStream::bind(addr).await.unwrap();
        let local_addr = incoming.local_addr().unwrap();
        assert_ne!(local_addr.port(), 0);

        let client = tokio::net::TcpStream::connect(local_addr);
        let (accepted, client) = tokio::join!(incoming.accept(), client);
        let (_, remote_peer) = accepted.unwrap();
        assert_eq!(remote_peer, client.unwrap().local_addr().unwrap());
    }
}
