//! Listener supervision: one task per config record, joined at shutdown.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::ConfigRecord;
use crate::lifecycle::Shutdown;
use crate::net::PortListener;

/// Owns the listener tasks for the lifetime of the process.
pub struct Supervisor {
    shutdown: Shutdown,
    handles: Vec<JoinHandle<()>>,
}

impl Supervisor {
    /// Create a supervisor around a shutdown coordinator.
    pub fn new(shutdown: Shutdown) -> Self {
        Self {
            shutdown,
            handles: Vec::new(),
        }
    }

    /// Spawn one listener task per record.
    ///
    /// Binding happens inside each task, so a port that fails to come up
    /// (already in use, say) logs its error and ends without taking any
    /// sibling down.
    pub fn spawn_listeners(&mut self, records: Vec<ConfigRecord>) {
        for record in records {
            let record = Arc::new(record);
            let shutdown = self.shutdown.clone();
            let port = record.port();

            self.handles.push(tokio::spawn(async move {
                let listener = match PortListener::bind(record) {
                    Ok(listener) => listener,
                    Err(err) => {
                        tracing::error!(port, error = %err, "listener startup failed");
                        return;
                    }
                };
                if let Err(err) = listener.run(shutdown).await {
                    tracing::error!(port, error = %err, "listener terminated");
                }
            }));
        }
    }

    /// Number of listener tasks spawned so far.
    pub fn listener_count(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every listener task to finish, newest first.
    ///
    /// Returns once all ports have stopped, whether by shutdown signal or
    /// by their own fatal errors.
    pub async fn join_all(mut self) {
        while let Some(handle) = self.handles.pop() {
            if let Err(err) = handle.await {
                tracing::debug!(error = %err, "failed to join listener task");
            }
        }
    }
}
