//! Connection transports
//!
//! The pacing scheduler and the session lifecycle are written against the
//! `Transport` trait; the raw socket and WebSocket servers only differ in how
//! a single message is written and how the drain phase reads.

mod stream;
mod websocket;

pub use stream::StreamTransport;
pub use websocket::WsTransport;

use crate::error::SessionError;
use async_trait::async_trait;

/// One accepted connection, seen from the session that serves it
#[async_trait]
pub trait Transport: Send {
    /// Peer address for logging
    fn peer(&self) -> &str;

    /// Write one message and flush it to the peer
    async fn send(&mut self, message: &str) -> Result<(), SessionError>;

    /// Read and discard one unit of input from the peer.
    ///
    /// Returns `SessionError::Closed` once the peer has gone away.
    async fn recv(&mut self) -> Result<(), SessionError>;

    /// Close the connection. Errors are ignored; the session is ending anyway.
    async fn close(&mut self);
}
