//! Server loops and process-level orchestration
//!
//! - `socket`: raw TCP accept loop
//! - `websocket`: axum upgrade handler, one session per upgraded socket
//! - `http`: fixed-body responder

pub mod http;
pub mod socket;
pub mod websocket;

pub use http::{http_router, serve_http};
pub use socket::serve_socket;
pub use websocket::{serve_websocket, ws_handler, ws_router};

use crate::config::PacedServerConfig;
use crate::error::StubError;
use crate::session::{Coordinator, SessionContext};
use std::fmt;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Transport flavour of a paced server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Socket,
    WebSocket,
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flavor::Socket => write!(f, "Socket"),
            Flavor::WebSocket => write!(f, "WebSocket"),
        }
    }
}

/// Bind `addr`. A failure fires the completion signal before returning.
pub async fn bind(addr: &str, coordinator: &Coordinator) -> Result<TcpListener, StubError> {
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(source) => {
            error!("Cannot listen on {}: {}", addr, source);
            coordinator.complete();
            Err(StubError::Bind {
                addr: addr.to_string(),
                source,
            })
        }
    }
}

/// Serve `listener` until the completion signal fires or the server fails.
///
/// Returning drops the server loop, which aborts any session still running.
pub async fn run_until_complete(
    flavor: Flavor,
    listener: TcpListener,
    context: SessionContext,
) -> Result<(), StubError> {
    let coordinator = Arc::clone(&context.coordinator);
    let server = async move {
        match flavor {
            Flavor::Socket => serve_socket(listener, context).await,
            Flavor::WebSocket => serve_websocket(listener, context).await,
        }
    };

    tokio::select! {
        _ = coordinator.completed() => Ok(()),
        result = server => result,
    }
}

/// Entry point of the socket and WebSocket binaries
pub async fn run_paced_server(
    flavor: Flavor,
    config: PacedServerConfig,
) -> Result<(), StubError> {
    let coordinator = Coordinator::new(config.max_sessions);
    let context = SessionContext::new(config.load, Arc::clone(&coordinator));
    let addr = config.listen.addr();
    let count = config.load.count;
    let cost = config.load.cost;

    let listener = bind(&addr, &coordinator).await?;
    info!(
        "{} server started (listening: {}, messages: {}, cost: {}s)",
        flavor, addr, count, cost
    );

    let result = run_until_complete(flavor, listener, context).await;
    if let Err(ref e) = result {
        error!("{} server failed: {}", flavor, e);
    }

    info!(
        "{} server stopped (listening: {}, messages: {}, cost: {}s)",
        flavor, addr, count, cost
    );
    result
}
