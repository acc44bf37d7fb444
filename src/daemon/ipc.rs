//! IPC Server for the focus timer daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for timer commands
//! - Integration with FocusTimer for command execution

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{watch, Mutex};
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::types::{IpcRequest, IpcResponse, ResponseData, TimerPhase};

use super::timer::FocusTimer;

// ============================================================================
// Constants
// ============================================================================

/// Socket file name inside the data directory
pub const SOCKET_FILE_NAME: &str = "studyfocus.sock";

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE + 1];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            anyhow::bail!("Connection closed by client");
        }
        if n > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Serves requests one connection at a time until `shutdown` changes.
    ///
    /// Per-connection failures are logged and do not stop the server.
    pub async fn serve(&self, handler: &RequestHandler, mut shutdown: watch::Receiver<bool>) {
        loop {
            let mut stream = tokio::select! {
                _ = shutdown.changed() => break,
                accepted = self.accept() => match accepted {
                    Ok(stream) => stream,
                    Err(e) => {
                        warn!("{:#}", e);
                        continue;
                    }
                },
            };

            let response = match Self::receive_request(&mut stream).await {
                Ok(request) => {
                    debug!(?request, "IPC request");
                    handler.handle(request).await
                }
                Err(e) => {
                    debug!("invalid IPC request: {:#}", e);
                    IpcResponse::error(format!("{:#}", e))
                }
            };

            if let Err(e) = Self::send_response(&mut stream, &response).await {
                debug!("failed to answer IPC client: {:#}", e);
            }
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the FocusTimer.
pub struct RequestHandler {
    /// Shared reference to the timer
    timer: Arc<Mutex<FocusTimer>>,
    /// Account sessions are recorded for
    user_id: String,
}

impl RequestHandler {
    /// Creates a new request handler for the given timer.
    pub fn new(timer: Arc<Mutex<FocusTimer>>, user_id: impl Into<String>) -> Self {
        Self {
            timer,
            user_id: user_id.into(),
        }
    }

    /// Handles an IPC request and returns the appropriate response.
    ///
    /// Transitions that do not apply in the current state are no-ops and
    /// still succeed.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        let mut timer = self.timer.lock().await;

        let message = match request {
            IpcRequest::Start => {
                if timer.start() {
                    "Timer started"
                } else {
                    "Timer is already running"
                }
            }
            IpcRequest::Pause => {
                if timer.pause() {
                    "Timer paused"
                } else {
                    "Timer is not running"
                }
            }
            IpcRequest::Toggle => {
                if timer.toggle() == TimerPhase::Running {
                    "Timer started"
                } else {
                    "Timer paused"
                }
            }
            IpcRequest::Reset => {
                timer.reset();
                "Timer reset"
            }
            IpcRequest::Status => "",
        };

        IpcResponse::success(message, Some(self.response_data(&timer)))
    }

    fn response_data(&self, timer: &FocusTimer) -> ResponseData {
        let state = timer.get_state();
        ResponseData {
            state: Some(state.phase.as_str().to_string()),
            remaining_seconds: Some(state.remaining_seconds),
            display: Some(state.display()),
            progress: Some(state.progress()),
            completed_sessions: Some(timer.completed_sessions()),
            last_completed_at: timer.last_completed_at(),
            user_id: Some(self.user_id.clone()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::daemon::timer::TimerEvent;
    use crate::types::SESSION_SECONDS;

    // ------------------------------------------------------------------------
    // Helper functions
    // ------------------------------------------------------------------------

    fn create_temp_socket_path() -> PathBuf {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sock");
        // Keep the directory so it's not deleted
        std::mem::forget(dir);
        path
    }

    fn create_timer() -> (Arc<Mutex<FocusTimer>>, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Mutex::new(FocusTimer::new(tx))), rx)
    }

    async fn exchange(socket_path: &Path, raw: &str) -> IpcResponse {
        let mut stream = UnixStream::connect(socket_path).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        stream.flush().await.unwrap();
        stream.shutdown().await.unwrap();

        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer).await.unwrap();
        serde_json::from_slice(&buffer).unwrap()
    }

    // ------------------------------------------------------------------------
    // IpcServer Tests
    // ------------------------------------------------------------------------

    mod ipc_server_tests {
        use super::*;

        #[tokio::test]
        async fn test_server_creation() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path);

            assert!(server.is_ok());
            assert!(socket_path.exists());
        }

        #[tokio::test]
        async fn test_server_removes_existing_socket() {
            let socket_path = create_temp_socket_path();
            std::fs::write(&socket_path, "dummy").unwrap();

            let server = IpcServer::new(&socket_path);
            assert!(server.is_ok());
        }

        #[tokio::test]
        async fn test_server_creates_parent_directory() {
            let dir = tempfile::tempdir().unwrap();
            let socket_path = dir.path().join("subdir").join("test.sock");

            let server = IpcServer::new(&socket_path);
            assert!(server.is_ok());
            assert!(socket_path.parent().unwrap().exists());
        }

        #[tokio::test]
        async fn test_receive_request_toggle() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let client_handle = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                stream.write_all(br#"{"command":"toggle"}"#).await.unwrap();
                stream.flush().await.unwrap();
            });

            let mut stream = server.accept().await.unwrap();
            let request = IpcServer::receive_request(&mut stream).await.unwrap();
            assert_eq!(request, IpcRequest::Toggle);

            client_handle.await.unwrap();
        }

        #[tokio::test]
        async fn test_receive_request_invalid_json() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let _client_handle = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                stream.write_all(b"not valid json").await.unwrap();
                stream.flush().await.unwrap();
            });

            let mut stream = server.accept().await.unwrap();
            let request = IpcServer::receive_request(&mut stream).await;

            assert!(request.is_err());
        }

        #[tokio::test]
        async fn test_server_drop_cleanup() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();
            assert!(socket_path.exists());

            drop(server);
            assert!(!socket_path.exists());
        }

        #[tokio::test]
        async fn test_serve_until_shutdown() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();
            let (timer, _rx) = create_timer();
            let handler = RequestHandler::new(timer.clone(), "alice");
            let (shutdown_tx, shutdown_rx) = watch::channel(false);

            let client_path = socket_path.clone();
            let client = async move {
                let started = exchange(&client_path, r#"{"command":"start"}"#).await;
                let garbage = exchange(&client_path, "nope").await;
                let status = exchange(&client_path, r#"{"command":"status"}"#).await;
                shutdown_tx.send(true).unwrap();
                (started, garbage, status)
            };

            let ((started, garbage, status), ()) =
                tokio::join!(client, server.serve(&handler, shutdown_rx));

            assert_eq!(started.message, "Timer started");
            assert!(garbage.is_error());
            assert_eq!(
                status.data.unwrap().state,
                Some("running".to_string())
            );
        }
    }

    // ------------------------------------------------------------------------
    // RequestHandler Tests
    // ------------------------------------------------------------------------

    mod request_handler_tests {
        use super::*;

        #[tokio::test]
        async fn test_handle_status() {
            let (timer, _rx) = create_timer();
            let handler = RequestHandler::new(timer, "alice");

            let response = handler.handle(IpcRequest::Status).await;

            assert_eq!(response.status, "success");
            let data = response.data.unwrap();
            assert_eq!(data.state, Some("idle".to_string()));
            assert_eq!(data.remaining_seconds, Some(SESSION_SECONDS));
            assert_eq!(data.display, Some("25:00".to_string()));
            assert_eq!(data.progress, Some(0.0));
            assert_eq!(data.completed_sessions, Some(0));
            assert_eq!(data.last_completed_at, None);
            assert_eq!(data.user_id, Some("alice".to_string()));
        }

        #[tokio::test]
        async fn test_handle_start_twice_is_noop() {
            let (timer, _rx) = create_timer();
            let handler = RequestHandler::new(timer, "alice");

            let first = handler.handle(IpcRequest::Start).await;
            let second = handler.handle(IpcRequest::Start).await;

            assert_eq!(first.message, "Timer started");
            assert_eq!(second.status, "success");
            assert_eq!(second.message, "Timer is already running");
            assert_eq!(second.data.unwrap().state, Some("running".to_string()));
        }

        #[tokio::test]
        async fn test_handle_pause_not_running() {
            let (timer, _rx) = create_timer();
            let handler = RequestHandler::new(timer, "alice");

            let response = handler.handle(IpcRequest::Pause).await;

            assert_eq!(response.status, "success");
            assert_eq!(response.message, "Timer is not running");
            assert_eq!(response.data.unwrap().state, Some("idle".to_string()));
        }

        #[tokio::test]
        async fn test_handle_toggle() {
            let (timer, _rx) = create_timer();
            let handler = RequestHandler::new(timer, "alice");

            let response = handler.handle(IpcRequest::Toggle).await;
            assert_eq!(response.message, "Timer started");

            let response = handler.handle(IpcRequest::Toggle).await;
            assert_eq!(response.message, "Timer paused");
            assert_eq!(response.data.unwrap().state, Some("paused".to_string()));
        }

        #[tokio::test]
        async fn test_handle_reset() {
            let (timer, _rx) = create_timer();
            let handler = RequestHandler::new(timer.clone(), "alice");

            handler.handle(IpcRequest::Start).await;
            for _ in 0..65 {
                timer.lock().await.tick();
            }
            let status = handler.handle(IpcRequest::Status).await;
            assert_eq!(status.data.unwrap().display, Some("23:55".to_string()));

            let response = handler.handle(IpcRequest::Reset).await;
            assert_eq!(response.message, "Timer reset");
            let data = response.data.unwrap();
            assert_eq!(data.state, Some("idle".to_string()));
            assert_eq!(data.remaining_seconds, Some(SESSION_SECONDS));
        }

        #[tokio::test]
        async fn test_status_reports_completions() {
            let (timer, _rx) = create_timer();
            let handler = RequestHandler::new(timer.clone(), "alice");

            handler.handle(IpcRequest::Start).await;
            for _ in 0..SESSION_SECONDS {
                timer.lock().await.tick();
            }

            let data = handler.handle(IpcRequest::Status).await.data.unwrap();
            assert_eq!(data.completed_sessions, Some(1));
            assert!(data.last_completed_at.is_some());
            assert_eq!(data.state, Some("idle".to_string()));
        }
    }

    // ------------------------------------------------------------------------
    // Error Tests
    // ------------------------------------------------------------------------

    mod error_tests {
        use super::*;

        #[test]
        fn test_ipc_error_display() {
            assert_eq!(IpcError::Timeout.to_string(), "Operation timed out");
            assert!(IpcError::RequestTooLarge.to_string().contains("4096"));
            assert!(IpcError::ReadError("reset".into())
                .to_string()
                .contains("reset"));
        }
    }
}
