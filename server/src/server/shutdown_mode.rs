use std::time::Duration;

#[derive(Debug, Clone)]
#[non_exhaustive]
/// Determine how a running [`Server`](super::Server) should shut down.
///
/// Use [`ServerHandle::shutdown`](super::ServerHandle::shutdown) to initiate the shutdown sequence.
pub enum ShutdownMode {
    /// Stop accepting new connections, then wait for open connections to finish
    /// their in-flight requests.
    Graceful {
        /// Connections still open when the timeout expires are dropped.
        timeout: Duration,
    },
    /// Shut down immediately, dropping all open connections abruptly.
    Forced,
}

impl ShutdownMode {
    /// Whether open connections get a chance to finish their in-flight requests.
    pub fn is_graceful(&self) -> bool {
        matches!(self, Self::Graceful { .. })
    }
}
