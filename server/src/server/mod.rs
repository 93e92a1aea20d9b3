//! An HTTP/1.1 server built on `hyper`.
//!
//! A [`Server`] collects one or more [`IncomingStream`]s and, once
//! [`Server::serve`] is called, accepts connections from all of them on a
//! background task. The returned [`ServerHandle`] is used to shut it down.
use std::future::Future;
use std::net::SocketAddr;

pub use incoming::IncomingStream;
pub use server_handle::ServerHandle;
pub use shutdown_mode::ShutdownMode;

use crate::response::Response;

mod incoming;
mod server_handle;
mod shutdown_mode;

/// The signature every request handler must match.
pub type Handler<HandlerFuture, ApplicationState> =
    fn(http::Request<hyper::body::Incoming>, ApplicationState) -> HandlerFuture;

#[must_use = "You must call `serve` on a `Server` to start listening for incoming connections"]
#[derive(Default)]
/// A server that hasn't started accepting connections yet.
///
/// ```no_run
/// use std::net::SocketAddr;
/// use meshplot_server::response::{IntoResponse, Response};
/// use meshplot_server::server::Server;
///
/// async fn handler(_request: http::Request<hyper::body::Incoming>, _state: ()) -> Response {
///     http::StatusCode::OK.into_response()
/// }
///
/// # async fn t() -> std::io::Result<()> {
/// let addr = SocketAddr::from(([127, 0, 0, 1], 8080));
/// let server_handle = Server::new().bind(addr).await?.serve(handler, ());
/// // Wait until the server shuts down.
/// server_handle.await;
/// # Ok(())
/// # }
/// ```
pub struct Server {
    incoming: Vec<IncomingStream>,
}

impl Server {
    /// Create a server with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a new TCP listener to `addr` and accept connections from it.
    pub async fn bind(mut self, addr: SocketAddr) -> std::io::Result<Self> {
        let incoming = IncomingStream::bind(addr).await?;
        self.incoming.push(incoming);
        Ok(self)
    }

    /// Accept connections from an already bound listener.
    pub fn listen(mut self, incoming: IncomingStream) -> Self {
        self.incoming.push(incoming);
        self
    }

    /// Start accepting connections, invoking `handler` for every incoming request.
    ///
    /// `application_state` is cloned for every request.
    ///
    /// # Panics
    ///
    /// It panics if it's called outside of a Tokio runtime.
    pub fn serve<HandlerFuture, ApplicationState>(
        self,
        handler: Handler<HandlerFuture, ApplicationState>,
        application_state: ApplicationState,
    ) -> ServerHandle
    where
        HandlerFuture: Future<Output = Response> + Send + 'static,
        ApplicationState: Clone + Send + Sync + 'static,
    {
        ServerHandle::new(self.incoming, handler, application_state)
    }
}
