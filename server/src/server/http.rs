//! Fixed-body HTTP responder
//!
//! Every request, on any path and with any method, gets the same body. Used
//! for plain request/response throughput tests; shares nothing with the
//! paced servers.

use crate::config::ResponseBody;
use crate::error::StubError;
use axum::{
    Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub fn http_router(body: ResponseBody) -> Router {
    Router::new()
        .fallback(respond)
        .with_state(Arc::new(body))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn respond(State(body): State<Arc<ResponseBody>>) -> Response {
    (
        [(header::CONTENT_TYPE, body.content_type())],
        body.content().to_owned(),
    )
        .into_response()
}

/// Serve the responder until the listener fails
pub async fn serve_http(listener: TcpListener, body: ResponseBody) -> Result<(), StubError> {
    axum::serve(listener, http_router(body))
        .await
        .map_err(StubError::Serve)
}
