//! Client sessions: relay bytes from an accepted connection to a device.
//!
//! # Responsibilities
//! - Resolve transfer parameters (`of=`, `bs=`) from the port's record
//! - Copy the client's byte stream to the device, block by block
//! - Convert every failure into a typed outcome for the listener to log

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use tokio::fs::OpenOptions;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::lifecycle::Shutdown;

/// Block size used when `bs=` is absent or unusable, as with `dd`.
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Error type for a single client session.
///
/// All variants are terminal for the session only; the listener logs them
/// and resumes accepting on the same port.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The parameter map has no usable `of=` entry.
    #[error("no device path configured, expected of=<path>")]
    MissingDeviceParameter,

    /// The device path does not exist on the filesystem.
    #[error("device {path} has not appeared")]
    DeviceNotFound { path: PathBuf },

    /// Opening the device read-write failed.
    #[error("cannot open device {path}: {source}")]
    DeviceOpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from the client socket failed with a non-retryable error.
    #[error("read from client socket failed after {written} bytes: {source}")]
    SocketRead {
        written: u64,
        #[source]
        source: io::Error,
    },

    /// Writing to the device failed.
    #[error("write to device failed after {written} bytes: {source}")]
    DeviceWrite {
        written: u64,
        #[source]
        source: io::Error,
    },
}

impl SessionError {
    /// Bytes that reached the device before the session failed.
    pub fn bytes_written(&self) -> u64 {
        match self {
            SessionError::SocketRead { written, .. }
            | SessionError::DeviceWrite { written, .. } => *written,
            _ => 0,
        }
    }
}

/// Transfer parameters resolved from a record's key/value map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// Target device or file, from `of=`.
    pub device_path: PathBuf,
    /// Relay buffer size in bytes, from `bs=`.
    pub block_size: usize,
}

impl SessionParams {
    /// Resolve `of=` and `bs=` from a parameter map.
    ///
    /// `of` is required and must be non-empty. `bs` falls back to
    /// [`DEFAULT_BLOCK_SIZE`] when missing, non-numeric, or not positive.
    /// Unrecognized keys are ignored.
    pub fn from_map(parameters: &HashMap<String, String>) -> Result<Self, SessionError> {
        let device_path = parameters
            .get("of")
            .filter(|path| !path.is_empty())
            .ok_or(SessionError::MissingDeviceParameter)?;

        let block_size = parameters
            .get("bs")
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|&size| size > 0)
            .unwrap_or(DEFAULT_BLOCK_SIZE);

        Ok(Self {
            device_path: PathBuf::from(device_path),
            block_size,
        })
    }
}

/// One accepted connection's byte relay, from accept to socket close.
pub struct ClientSession {
    parameters: HashMap<String, String>,
    shutdown: Shutdown,
}

impl ClientSession {
    /// Create a session for an accepted connection.
    ///
    /// The map is re-derived from the port's record for every connection, so
    /// a session never outlives the parameters it was resolved from.
    pub fn new(parameters: HashMap<String, String>, shutdown: Shutdown) -> Self {
        Self {
            parameters,
            shutdown,
        }
    }

    /// Relay the client's bytes to the configured device.
    ///
    /// Returns the total byte count written. The connection is closed when
    /// this returns, on every path. A read shorter than the block size
    /// completes the transfer: image-flashing clients hold the connection
    /// open and rely on the server closing it once the payload has landed.
    pub async fn run(&self, mut stream: TcpStream) -> Result<u64, SessionError> {
        let params = SessionParams::from_map(&self.parameters)?;

        // Advisory only; the open below is what actually gates the transfer.
        let exists = tokio::fs::try_exists(&params.device_path)
            .await
            .unwrap_or(false);
        if !exists {
            return Err(SessionError::DeviceNotFound {
                path: params.device_path,
            });
        }

        let mut device = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&params.device_path)
            .await
            .map_err(|source| SessionError::DeviceOpenFailed {
                path: params.device_path.clone(),
                source,
            })?;

        let mut shutdown_rx = self.shutdown.subscribe();
        let mut buf = vec![0u8; params.block_size];
        let mut total: u64 = 0;

        loop {
            if self.shutdown.is_triggered() {
                tracing::debug!("shutdown signaled, ending session");
                break;
            }

            let read = tokio::select! {
                _ = shutdown_rx.recv() => break,
                result = stream.read(&mut buf) => result,
            };
            let len = match read {
                Ok(0) => {
                    tracing::debug!("client closed the connection");
                    break;
                }
                Ok(len) => len,
                Err(err)
                    if matches!(
                        err.kind(),
                        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
                    ) =>
                {
                    continue;
                }
                Err(source) => {
                    return Err(SessionError::SocketRead {
                        written: total,
                        source,
                    })
                }
            };

            device
                .write_all(&buf[..len])
                .await
                .map_err(|source| SessionError::DeviceWrite {
                    written: total,
                    source,
                })?;
            total += len as u64;

            if len < params.block_size {
                tracing::debug!(bytes = len, "short read, transfer complete");
                break;
            }
        }

        device
            .flush()
            .await
            .map_err(|source| SessionError::DeviceWrite {
                written: total,
                source,
            })?;

        tracing::info!(
            device = %params.device_path.display(),
            bytes = total,
            "transfer finished"
        );
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_of_is_an_error() {
        let err = SessionParams::from_map(&map(&[("bs", "1024")])).unwrap_err();
        assert!(matches!(err, SessionError::MissingDeviceParameter));
        assert_eq!(err.bytes_written(), 0);
    }

    #[test]
    fn empty_of_is_an_error() {
        let err = SessionParams::from_map(&map(&[("of", "")])).unwrap_err();
        assert!(matches!(err, SessionError::MissingDeviceParameter));
    }

    #[test]
    fn bs_defaults_to_512_when_missing() {
        let params = SessionParams::from_map(&map(&[("of", "/tmp/dev")])).unwrap();
        assert_eq!(params.block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(params.device_path, PathBuf::from("/tmp/dev"));
    }

    #[test]
    fn bs_falls_back_on_garbage() {
        for bad in ["notanumber", "0", "-4", "4k"] {
            let params = SessionParams::from_map(&map(&[("of", "/tmp/dev"), ("bs", bad)]))
                .unwrap_or_else(|_| panic!("bs={bad} should not fail the session"));
            assert_eq!(params.block_size, DEFAULT_BLOCK_SIZE, "bs={bad}");
        }
    }

    #[test]
    fn bs_is_honored_when_numeric() {
        let params =
            SessionParams::from_map(&map(&[("of", "/tmp/dev"), ("bs", "4096")])).unwrap();
        assert_eq!(params.block_size, 4096);
    }

    #[test]
    fn unrecognized_keys_are_ignored() {
        let params =
            SessionParams::from_map(&map(&[("of", "/tmp/dev"), ("seek", "2")])).unwrap();
        assert_eq!(params.device_path, PathBuf::from("/tmp/dev"));
    }
}
