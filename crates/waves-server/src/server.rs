use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, UnixListener};
use tracing::{debug, error, info, warn};
use waves_model::ScalarWaveModel;

use crate::error::RpcError;
use crate::framing::{DEFAULT_MAX_FRAME_BYTES, read_frame, write_message};
use crate::protocol::{WaveRequest, WaveResponse};
use crate::router::ServerState;
use crate::servicer::WavesServicer;

/// Consecutive accept failures tolerated before the server gives up.
const MAX_ACCEPT_ERRORS: u32 = 10;

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// Largest request frame accepted, in bytes.
    pub max_frame_bytes: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

/// Where the server accepts connections.
pub enum Listener {
    Tcp(TcpListener),
    Unix(UnixListener),
}

impl Listener {
    pub async fn bind_tcp(addr: SocketAddr) -> Result<Self, std::io::Error> {
        Ok(Self::Tcp(TcpListener::bind(addr).await?))
    }

    /// Bind a Unix socket, replacing a stale socket file.
    pub fn bind_unix(path: &Path) -> Result<Self, std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(Self::Unix(UnixListener::bind(path)?))
    }

    pub fn describe(&self) -> String {
        match self {
            Listener::Tcp(listener) => match listener.local_addr() {
                Ok(addr) => format!("tcp://{}", addr),
                Err(_) => "tcp://<unknown>".to_string(),
            },
            Listener::Unix(listener) => match listener.local_addr() {
                Ok(addr) => match addr.as_pathname() {
                    Some(path) => format!("unix://{}", path.display()),
                    None => "unix://<unnamed>".to_string(),
                },
                Err(_) => "unix://<unknown>".to_string(),
            },
        }
    }
}

/// Serves a wave model to any number of concurrent connections.
pub struct WavesServer<M> {
    state: Arc<ServerState<M>>,
    options: ServerOptions,
}

impl<M> WavesServer<M>
where
    M: ScalarWaveModel + Clone + 'static,
{
    pub fn new(servicer: WavesServicer<M>) -> Self {
        Self {
            state: Arc::new(ServerState::new(servicer)),
            options: ServerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ServerOptions) -> Self {
        self.options = options;
        self
    }

    /// Shared state, e.g. for the HTTP gateway.
    pub fn state(&self) -> Arc<ServerState<M>> {
        Arc::clone(&self.state)
    }

    /// Accept connections until the listener fails repeatedly.
    pub async fn run(self, listener: Listener) -> Result<(), std::io::Error> {
        info!("Waves server listening on {}", listener.describe());

        let mut error_count = 0;
        loop {
            let accepted = match &listener {
                Listener::Tcp(listener) => listener.accept().await.map(|(stream, addr)| {
                    debug!("Client connected from {}", addr);
                    self.spawn_connection(stream);
                }),
                Listener::Unix(listener) => listener.accept().await.map(|(stream, _)| {
                    debug!("Client connected on unix socket");
                    self.spawn_connection(stream);
                }),
            };

            match accepted {
                Ok(()) => error_count = 0,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    error_count += 1;
                    if error_count > MAX_ACCEPT_ERRORS {
                        error!("Too many consecutive IO errors, shutting down waves server");
                        return Err(e);
                    }
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                }
            }
        }
    }

    fn spawn_connection<S>(&self, stream: S)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let state = self.state();
        let max_frame_bytes = self.options.max_frame_bytes;
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, state, max_frame_bytes).await {
                warn!("Connection error: {}", e);
            }
        });
    }
}

async fn handle_connection<S, M>(
    mut stream: S,
    state: Arc<ServerState<M>>,
    max_frame_bytes: usize,
) -> Result<(), std::io::Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
    M: ScalarWaveModel + Clone + 'static,
{
    loop {
        let frame = match read_frame(&mut stream, max_frame_bytes).await {
            Ok(frame) => frame,
            Err(e) => {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    debug!("Client disconnected");
                    return Ok(());
                }
                if e.kind() == std::io::ErrorKind::InvalidData {
                    // The rest of the frame is never read, so the stream is out of sync.
                    let error = RpcError::invalid_argument(e.to_string());
                    write_message(&mut stream, &WaveResponse::error(0, error)).await?;
                }
                return Err(e);
            }
        };

        let response = match serde_json::from_slice::<WaveRequest>(&frame) {
            Ok(request) => {
                debug!("Received request: {} ({})", request.method, request.id);
                dispatch_blocking(Arc::clone(&state), request).await
            }
            Err(e) => {
                warn!("Malformed request frame: {}", e);
                let error = RpcError::invalid_argument(format!("malformed request: {}", e));
                WaveResponse::error(0, error)
            }
        };

        write_message(&mut stream, &response).await?;
    }
}

/// Run a request on the blocking pool; model evaluation is CPU bound.
pub async fn dispatch_blocking<M>(state: Arc<ServerState<M>>, request: WaveRequest) -> WaveResponse
where
    M: ScalarWaveModel + Clone + 'static,
{
    let id = request.id;
    match tokio::task::spawn_blocking(move || state.dispatch(&request)).await {
        Ok(response) => response,
        Err(e) => {
            error!("Request {} failed on its worker: {}", id, e);
            WaveResponse::error(id, RpcError::internal(format!("worker failed: {}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use waves_model::StubModel;

    use super::*;
    use crate::framing::read_message;
    use crate::protocol::StatusCode;

    #[tokio::test]
    async fn test_malformed_frame_keeps_connection_open() {
        let (mut client, server) = tokio::io::duplex(4096);
        let state = Arc::new(ServerState::new(WavesServicer::new(StubModel::new())));
        let task = tokio::spawn(handle_connection(server, state, 4096));

        write_message(&mut client, &"not an envelope").await.unwrap();
        let response: WaveResponse = read_message(&mut client, 4096).await.unwrap();
        assert_eq!(response.id, 0);
        assert_eq!(response.status, StatusCode::InvalidArgument);

        let request = WaveRequest {
            id: 42,
            method: "elevations".to_string(),
            payload: serde_json::json!({"x": [1.0], "y": [1.0], "t": 1.0}),
        };
        write_message(&mut client, &request).await.unwrap();
        let response: WaveResponse = read_message(&mut client, 4096).await.unwrap();
        assert_eq!(response.id, 42);
        assert!(response.is_ok());

        drop(client);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_oversized_frame_is_answered_before_closing() {
        let (mut client, server) = tokio::io::duplex(4096);
        let state = Arc::new(ServerState::new(WavesServicer::new(StubModel::new())));
        let task = tokio::spawn(handle_connection(server, state, 64));

        tokio::io::AsyncWriteExt::write_u32(&mut client, 1_000).await.unwrap();
        let response: WaveResponse = read_message(&mut client, 4096).await.unwrap();
        assert_eq!(response.id, 0);
        assert_eq!(response.status, StatusCode::InvalidArgument);
        assert!(response.message.contains("exceeds limit"), "{}", response.message);

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        let err = read_frame(&mut client, 4096).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }
}
