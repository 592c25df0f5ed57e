//! Per-port TCP listeners.
//!
//! # Responsibilities
//! - Own one bound, listening socket per config record
//! - Accept connections and serve them one at a time
//! - Keep transient accept failures from killing the port

use std::io;
use std::net::{Ipv6Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpSocket};

use crate::config::ConfigRecord;
use crate::lifecycle::Shutdown;
use crate::net::session::ClientSession;

/// Pending-connection backlog for every port.
const LISTEN_BACKLOG: u32 = 10;

/// Error type for listener operations. Fatal for the affected port only.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to create the server socket.
    #[error("cannot create server socket: {0}")]
    Socket(#[source] io::Error),

    /// Failed to set SO_REUSEADDR.
    #[error("cannot set SO_REUSEADDR on server socket: {0}")]
    SocketOption(#[source] io::Error),

    /// Failed to bind to the record's port.
    #[error("cannot bind server socket to TCP port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    /// Failed to start listening.
    #[error("cannot listen on TCP port {port}: {source}")]
    Listen {
        port: u16,
        #[source]
        source: io::Error,
    },

    /// The accept wait itself failed with a non-transient error.
    #[error("accept on TCP port {port} failed: {source}")]
    Accept {
        port: u16,
        #[source]
        source: io::Error,
    },
}

/// A bound, listening socket for one config record.
///
/// Serves clients strictly one at a time: the next connection is not
/// accepted until the current session's device handle is closed.
pub struct PortListener {
    record: Arc<ConfigRecord>,
    inner: TcpListener,
}

impl PortListener {
    /// Bind a dual-stack listening socket for one config record.
    ///
    /// IPv6 wildcard bind with SO_REUSEADDR; IPv4 peers arrive as
    /// IPv4-mapped addresses on a stock dual-stack host. Each setup step
    /// maps to its own error variant, fatal for this port only.
    pub fn bind(record: Arc<ConfigRecord>) -> Result<Self, ListenerError> {
        let port = record.port();

        let socket = TcpSocket::new_v6().map_err(ListenerError::Socket)?;
        socket
            .set_reuseaddr(true)
            .map_err(ListenerError::SocketOption)?;
        socket
            .bind(SocketAddr::from((Ipv6Addr::UNSPECIFIED, port)))
            .map_err(|source| ListenerError::Bind { port, source })?;
        let inner = socket
            .listen(LISTEN_BACKLOG)
            .map_err(|source| ListenerError::Listen { port, source })?;

        tracing::info!(port, "listener bound");
        Ok(Self { record, inner })
    }

    /// Local address of the bound socket.
    pub fn local_addr(&self) -> Result<SocketAddr, io::Error> {
        self.inner.local_addr()
    }

    /// Accept loop: serve one client at a time until shutdown.
    ///
    /// The shutdown signal is re-checked at every loop boundary and also
    /// cancels an in-flight accept wait, so an idle port stops promptly.
    /// An in-progress session is never interrupted mid-transfer except at
    /// its own read boundaries.
    pub async fn run(self, shutdown: Shutdown) -> Result<(), ListenerError> {
        let port = self.record.port();
        let mut shutdown_rx = shutdown.subscribe();

        loop {
            if shutdown.is_triggered() {
                break;
            }

            let accepted = tokio::select! {
                _ = shutdown_rx.recv() => break,
                result = self.inner.accept() => result,
            };
            let (stream, peer) = match accepted {
                Ok(accepted) => accepted,
                Err(err) if is_transient_accept(&err) => {
                    tracing::warn!(port, error = %err, "cannot accept client socket");
                    continue;
                }
                Err(source) => {
                    tracing::error!(port, error = %source, "accept wait failed, listener exits");
                    return Err(ListenerError::Accept { port, source });
                }
            };

            tracing::debug!(port, peer = %peer, "client connected");
            let session = ClientSession::new(self.record.parameter_map(), shutdown.clone());
            match session.run(stream).await {
                Ok(bytes) => {
                    tracing::debug!(port, peer = %peer, bytes, "session complete");
                }
                Err(err) => {
                    tracing::warn!(
                        port,
                        peer = %peer,
                        bytes = err.bytes_written(),
                        error = %err,
                        "session failed"
                    );
                }
            }
        }

        tracing::info!(port, "listener stopped");
        Ok(())
    }
}

/// Accept errors tied to a single lost connection; the loop survives these.
fn is_transient_accept(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}
