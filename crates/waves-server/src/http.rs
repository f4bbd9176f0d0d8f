//! JSON-over-HTTP gateway.
//!
//! `POST /rpc/{method}` takes the method payload as its body and answers the
//! same [`WaveResponse`] envelope as the framed transport, with an HTTP
//! status mirroring the RPC status.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode as HttpStatus;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use waves_model::ScalarWaveModel;

use crate::error::RpcError;
use crate::protocol::{StatusCode, WaveRequest, WaveResponse};
use crate::router::ServerState;
use crate::server::dispatch_blocking;

pub fn router<M>(state: Arc<ServerState<M>>) -> Router
where
    M: ScalarWaveModel + Clone + 'static,
{
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/rpc/:method", post(rpc_handler::<M>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the gateway until the listener fails.
pub async fn serve<M>(
    listener: TcpListener,
    state: Arc<ServerState<M>>,
) -> Result<(), std::io::Error>
where
    M: ScalarWaveModel + Clone + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("HTTP gateway listening on http://{}", addr);
    }
    axum::serve(listener, router(state)).await
}

pub async fn rpc_handler<M>(
    State(state): State<Arc<ServerState<M>>>,
    Path(method): Path<String>,
    body: Bytes,
) -> (HttpStatus, Json<WaveResponse>)
where
    M: ScalarWaveModel + Clone + 'static,
{
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(payload) => payload,
            Err(e) => {
                let response = WaveResponse::error(
                    0,
                    RpcError::invalid_argument(format!("malformed request body: {}", e)),
                );
                return (http_status(response.status), Json(response));
            }
        }
    };

    let request = WaveRequest {
        id: 0,
        method,
        payload,
    };
    let response = dispatch_blocking(state, request).await;
    (http_status(response.status), Json(response))
}

pub fn http_status(status: StatusCode) -> HttpStatus {
    match status {
        StatusCode::Ok => HttpStatus::OK,
        StatusCode::InvalidArgument => HttpStatus::BAD_REQUEST,
        StatusCode::Unimplemented => HttpStatus::NOT_IMPLEMENTED,
        StatusCode::Internal | StatusCode::Unknown => HttpStatus::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use waves_model::StubModel;

    use super::*;
    use crate::servicer::WavesServicer;

    fn state() -> Arc<ServerState<StubModel>> {
        Arc::new(ServerState::new(WavesServicer::new(StubModel::new())))
    }

    #[tokio::test]
    async fn test_elevations_over_http() {
        let (status, Json(response)) = rpc_handler(
            State(state()),
            Path("elevations".to_string()),
            Bytes::from_static(br#"{"x": [1.0, 6.0], "y": [2.0, 5.0], "t": 3.0}"#),
        )
        .await;

        assert_eq!(status, HttpStatus::OK);
        let payload = response.payload.unwrap();
        assert_eq!(payload["z"], serde_json::json!([6.0, 14.0]));
    }

    #[tokio::test]
    async fn test_statuses_map_to_http() {
        let (status, Json(response)) =
            rpc_handler(State(state()), Path("spectrum".to_string()), Bytes::new()).await;
        assert_eq!(status, HttpStatus::NOT_IMPLEMENTED);
        assert_eq!(response.status, StatusCode::Unimplemented);

        let (status, _) = rpc_handler(
            State(state()),
            Path("elevations".to_string()),
            Bytes::from_static(b"{not json"),
        )
        .await;
        assert_eq!(status, HttpStatus::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_model_failures_are_server_errors() {
        let (status, Json(response)) = rpc_handler(
            State(state()),
            Path("elevations".to_string()),
            Bytes::from_static(br#"{"x": [1e308], "y": [1e308], "t": 0.0}"#),
        )
        .await;
        assert_eq!(status, HttpStatus::INTERNAL_SERVER_ERROR);
        assert_eq!(response.status, StatusCode::Unknown);
        assert!(response.payload.is_none());

        assert_eq!(http_status(StatusCode::Internal), HttpStatus::INTERNAL_SERVER_ERROR);
        assert_eq!(http_status(StatusCode::Ok), HttpStatus::OK);
    }
}
