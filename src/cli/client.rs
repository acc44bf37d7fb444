//! IPC Client for communicating with the focus timer daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::types::{IpcRequest, IpcResponse};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: u64 = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
}

impl IpcClient {
    /// Creates a new IPC client for the given socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Sends a start command to the daemon.
    pub async fn start(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Start).await
    }

    /// Sends a pause command to the daemon.
    pub async fn pause(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Pause).await
    }

    /// Sends a toggle command to the daemon.
    pub async fn toggle(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Toggle).await
    }

    /// Sends a reset command to the daemon.
    pub async fn reset(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Reset).await
    }

    /// Sends a status query to the daemon.
    pub async fn status(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Status).await
    }

    /// Sends a request to the daemon, retrying transport failures.
    ///
    /// Connection failures are always retried. Once a non-idempotent request
    /// has been handed to the daemon, a later failure is returned without
    /// retrying since the daemon may already have applied it. An error
    /// response from the daemon is returned as an error without retrying.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            let result = match self.connect().await {
                Ok(stream) => match self.exchange(stream, request).await {
                    Err(e) if !request.is_idempotent() => {
                        return Err(e.context(
                            "the daemon may have applied the request; not retrying",
                        ));
                    }
                    other => other,
                },
                Err(e) => Err(e),
            };

            match result {
                Ok(response) if response.is_error() => anyhow::bail!("{}", response.message),
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!("request failed (attempt {}/{}): {:#}", attempt, MAX_RETRIES, e);
                    last_error = Some(e);

                    if attempt < MAX_RETRIES {
                        let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("request was not sent")))
    }

    /// Connects to the daemon socket.
    async fn connect(&self) -> Result<UnixStream> {
        timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("connection timed out")?
            .with_context(|| {
                format!(
                    "cannot connect to the daemon at {}; run 'studyfocus daemon' first",
                    self.socket_path.display()
                )
            })
    }

    /// Writes one request on a connected stream and reads the response.
    async fn exchange(&self, mut stream: UnixStream, request: &IpcRequest) -> Result<IpcResponse> {
        let io_timeout = Duration::from_secs(IO_TIMEOUT_SECS);

        let request_json = serde_json::to_string(request).context("failed to serialize request")?;

        timeout(io_timeout, stream.write_all(request_json.as_bytes()))
            .await
            .context("write timed out")?
            .context("failed to send request")?;

        timeout(io_timeout, stream.flush())
            .await
            .context("flush timed out")?
            .context("failed to flush request")?;

        // Shutdown write side to signal end of request
        stream.shutdown().await.context("failed to shut down write side")?;

        let mut buffer = Vec::new();
        timeout(
            io_timeout,
            (&mut stream).take(MAX_RESPONSE_SIZE).read_to_end(&mut buffer),
        )
        .await
        .context("read timed out")?
        .context("failed to receive response")?;

        if buffer.is_empty() {
            anyhow::bail!("the daemon sent no response");
        }

        serde_json::from_slice(&buffer).context("failed to parse response")
    }
}

// ============================================================================
// Tests
// ============================================================================
