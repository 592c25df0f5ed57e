//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use netdd::{ConfigRecord, PortListener, Shutdown};

/// Create an empty scratch device file inside `dir`.
pub fn create_device(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::File::create(&path).unwrap();
    path
}

/// Bind and run a listener for `record`, returning its task handle.
///
/// Binding happens before the task is spawned, so tests can connect as soon
/// as this returns.
#[allow(dead_code)]
pub fn start_listener(record: ConfigRecord, shutdown: &Shutdown) -> JoinHandle<()> {
    let listener = PortListener::bind(Arc::new(record)).expect("bind test listener");
    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = listener.run(shutdown).await;
    })
}

/// Connect to a listener port on loopback, retrying while it comes up.
pub async fn connect(port: u16) -> TcpStream {
    let addr: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
    for _ in 0..50 {
        if let Ok(stream) = TcpStream::connect(addr).await {
            return stream;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("could not connect to 127.0.0.1:{port}");
}

/// A connected (client, server) TCP stream pair on loopback.
#[allow(dead_code)]
pub async fn socket_pair() -> (TcpStream, TcpStream) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).await.unwrap();
    let (server, _) = listener.accept().await.unwrap();
    (client, server)
}

/// Poll until the file at `path` holds exactly `expected` bytes.
pub async fn wait_for_file_len(path: &Path, expected: u64) {
    for _ in 0..100 {
        if std::fs::metadata(path).map(|m| m.len()).unwrap_or(0) == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let len = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    panic!("{} holds {len} bytes, expected {expected}", path.display());
}
