use std::convert::Infallible;
use std::future::{Future, IntoFuture, poll_fn};
use std::net::SocketAddr;
use std::pin::{Pin, pin};
use std::task::Poll;

use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinSet};
use tracing_log_error::log_error;

use super::{Handler, IncomingStream, ShutdownMode};
use crate::response::Response;

/// A handle to a running [`Server`](super::Server).
///
/// `.await` the [`ServerHandle`] to wait for the server to shut down.
#[derive(Clone)]
pub struct ServerHandle {
    command_outbox: mpsc::Sender<ServerCommand>,
}

impl ServerHandle {
    pub(super) fn new<HandlerFuture, ApplicationState>(
        incoming: Vec<IncomingStream>,
        handler: Handler<HandlerFuture, ApplicationState>,
        application_state: ApplicationState,
    ) -> Self
    where
        HandlerFuture: Future<Output = Response> + Send + 'static,
        ApplicationState: Clone + Send + Sync + 'static,
    {
        let (command_outbox, command_inbox) = mpsc::channel(32);
        let acceptor = Acceptor {
            command_inbox,
            incoming,
            handler,
            application_state,
        };
        tokio::spawn(acceptor.run());
        Self { command_outbox }
    }

    /// Instruct the [`Server`](super::Server) to stop accepting new connections.
    ///
    /// It resolves once the shutdown sequence has completed.
    #[doc(alias("stop"))]
    pub async fn shutdown(self, mode: ShutdownMode) {
        let (completion_notifier, completion) = oneshot::channel();
        if self
            .command_outbox
            .send(ServerCommand::Shutdown {
                completion_notifier,
                mode,
            })
            .await
            .is_ok()
        {
            // Sending only fails if the acceptor has already exited.
            let _ = completion.await;
        }
    }
}

impl IntoFuture for ServerHandle {
    type Output = ();
    type IntoFuture = Pin<Box<dyn Future<Output = ()> + Send + Sync + 'static>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.command_outbox.closed().await })
    }
}

enum ServerCommand {
    Shutdown {
        completion_notifier: oneshot::Sender<()>,
        mode: ShutdownMode,
    },
}

#[must_use]
struct Acceptor<HandlerFuture, ApplicationState> {
    command_inbox: mpsc::Receiver<ServerCommand>,
    incoming: Vec<IncomingStream>,
    handler: Handler<HandlerFuture, ApplicationState>,
    application_state: ApplicationState,
}

enum AcceptorInboxMessage {
    ServerCommand(ServerCommand),
    Connection(Result<(IncomingStream, TcpStream, SocketAddr), JoinError>),
    ConnectionClosed(Result<(), JoinError>),
}

impl<HandlerFuture, ApplicationState> Acceptor<HandlerFuture, ApplicationState>
where
    HandlerFuture: Future<Output = Response> + Send + 'static,
    ApplicationState: Clone + Send + Sync + 'static,
{
    /// Accept incoming connections and serve each of them on its own task.
    ///
    /// Constraint: this method **must not panic**.
    async fn run(self) {
        /// Accept a connection from the given [`IncomingStream`].
        /// If accepting a certain connection fails, log the error and keep trying with the next connection.
        async fn accept_connection(
            incoming: IncomingStream,
        ) -> (IncomingStream, TcpStream, SocketAddr) {
            loop {
                match incoming.accept().await {
                    Ok((connection, remote_peer)) => return (incoming, connection, remote_peer),
                    Err(e) => {
                        log_error!(e, "Failed to accept connection");
                        continue;
                    }
                }
            }
        }

        let Self {
            mut command_inbox,
            incoming,
            handler,
            application_state,
        } = self;

        let mut incoming_join_set = JoinSet::new();
        for incoming in incoming.into_iter() {
            incoming_join_set.spawn(accept_connection(incoming));
        }
        let mut connection_join_set = JoinSet::new();
        let (shutdown_outbox, shutdown_inbox) = watch::channel(());

        let error = 'event_loop: loop {
            let message = poll_fn(|cx| {
                Self::poll_inboxes(
                    cx,
                    &mut command_inbox,
                    &mut incoming_join_set,
                    &mut connection_join_set,
                )
            })
            .await;
            match message {
                AcceptorInboxMessage::ServerCommand(ServerCommand::Shutdown {
                    completion_notifier,
                    mode,
                }) => {
                    Self::shutdown(
                        completion_notifier,
                        mode,
                        incoming_join_set,
                        connection_join_set,
                        shutdown_outbox,
                    )
                    .await;
                    return;
                }
                AcceptorInboxMessage::Connection(msg) => {
                    let (incoming, connection, remote_peer) = match msg {
                        Ok(accepted) => accepted,
                        // Only happens if an accept task panicked or got cancelled.
                        Err(e) => break 'event_loop e,
                    };
                    // Keep accepting connections from the same socket.
                    incoming_join_set.spawn(accept_connection(incoming));
                    connection_join_set.spawn(serve_connection(
                        connection,
                        remote_peer,
                        handler,
                        application_state.clone(),
                        shutdown_inbox.clone(),
                    ));
                }
                AcceptorInboxMessage::ConnectionClosed(outcome) => {
                    if let Err(e) = outcome {
                        log_error!(e, "A connection task panicked");
                    }
                }
            }
        };

        log_error!(
            error,
            "Failed to accept new connections. The acceptor will exit now."
        );
    }

    /// Check if there is work to be done.
    fn poll_inboxes(
        cx: &mut std::task::Context<'_>,
        server_command_inbox: &mut mpsc::Receiver<ServerCommand>,
        incoming_join_set: &mut JoinSet<(IncomingStream, TcpStream, SocketAddr)>,
        connection_join_set: &mut JoinSet<()>,
    ) -> Poll<AcceptorInboxMessage> {
        // Order matters here: shutdown messages take priority over incoming connections.
        if let Poll::Ready(Some(message)) = server_command_inbox.poll_recv(cx) {
            return Poll::Ready(AcceptorInboxMessage::ServerCommand(message));
        }
        if let Poll::Ready(Some(message)) = incoming_join_set.poll_join_next(cx) {
            return Poll::Ready(AcceptorInboxMessage::Connection(message));
        }
        if let Poll::Ready(Some(message)) = connection_join_set.poll_join_next(cx) {
            return Poll::Ready(AcceptorInboxMessage::ConnectionClosed(message));
        }
        Poll::Pending
    }

    async fn shutdown(
        completion_notifier: oneshot::Sender<()>,
        mode: ShutdownMode,
        mut incoming_join_set: JoinSet<(IncomingStream, TcpStream, SocketAddr)>,
        mut connection_join_set: JoinSet<()>,
        shutdown_outbox: watch::Sender<()>,
    ) {
        // Cancelling the accept tasks drops the listeners, closing the sockets.
        incoming_join_set.shutdown().await;

        tracing::info!(
            graceful = mode.is_graceful(),
            open_connections = connection_join_set.len(),
            "Shutting down the server"
        );
        if let ShutdownMode::Graceful { timeout } = mode {
            // Every connection finishes its in-flight request, then closes.
            shutdown_outbox.send_replace(());
            let drained = tokio::time::timeout(timeout, async {
                while connection_join_set.join_next().await.is_some() {}
            })
            .await;
            if drained.is_err() {
                tracing::warn!(
                    open_connections = connection_join_set.len(),
                    "Graceful shutdown timed out, dropping the remaining connections"
                );
            }
        }
        connection_join_set.shutdown().await;

        let _ = completion_notifier.send(());
    }
}

/// Drive a single HTTP/1.1 connection to completion.
///
/// A message on `shutdown_inbox` asks the connection to close once the in-flight
/// request (if any) has been answered.
async fn serve_connection<HandlerFuture, ApplicationState>(
    connection: TcpStream,
    remote_peer: SocketAddr,
    handler: Handler<HandlerFuture, ApplicationState>,
    application_state: ApplicationState,
    mut shutdown_inbox: watch::Receiver<()>,
) where
    HandlerFuture: Future<Output = Response> + Send + 'static,
    ApplicationState: Clone + Send + Sync + 'static,
{
    let service = hyper::service::service_fn(move |request| {
        let response = handler(request, application_state.clone());
        async move { Ok::<_, Infallible>(response.await) }
    });
    let mut connection = pin!(
        hyper::server::conn::http1::Builder::new()
            .serve_connection(TokioIo::new(connection), service)
    );

    let outcome = tokio::select! {
        outcome = connection.as_mut() => outcome,
        _ = shutdown_inbox.changed() => {
            connection.as_mut().graceful_shutdown();
            connection.as_mut().await
        }
    };
    if let Err(e) = outcome {
        log_error!(
            e,
            level: tracing::Level::WARN,
            remote_peer = %remote_peer,
            "Failed to serve connection"
        );
    }
}
