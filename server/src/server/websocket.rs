use crate::error::StubError;
use crate::session::{self, SessionContext};
use crate::transport::WsTransport;
use axum::{
    Router,
    extract::{ConnectInfo, State, ws::WebSocketUpgrade},
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Router that upgrades a request on any path
pub fn ws_router(context: SessionContext) -> Router {
    Router::new()
        .fallback(ws_handler)
        .with_state(context)
        .layer(TraceLayer::new_for_http())
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(context): State<SessionContext>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> Response {
    let peer = connect_info
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let failed_peer = peer.clone();
    ws.on_failed_upgrade(move |e| warn!("WebSocket upgrade from {} failed: {}", failed_peer, e))
        .on_upgrade(move |socket| session::serve(WsTransport::new(socket, peer), context))
}

/// Serve WebSocket sessions on `listener`.
///
/// axum owns the accept loop here; if it ever stops, the completion signal
/// fires so the process can exit.
pub async fn serve_websocket(
    listener: TcpListener,
    context: SessionContext,
) -> Result<(), StubError> {
    let coordinator = Arc::clone(&context.coordinator);
    let app = ws_router(context);

    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await;

    coordinator.complete();
    result.map_err(StubError::Serve)
}
