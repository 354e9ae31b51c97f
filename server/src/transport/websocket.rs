//! Upgraded WebSocket transport: one text frame per message

use super::Transport;
use crate::error::SessionError;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::SinkExt;

pub struct WsTransport {
    peer: String,
    socket: WebSocket,
}

impl WsTransport {
    pub fn new(socket: WebSocket, peer: impl Into<String>) -> Self {
        Self {
            peer: peer.into(),
            socket,
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    fn peer(&self) -> &str {
        &self.peer
    }

    async fn send(&mut self, message: &str) -> Result<(), SessionError> {
        self.socket
            .send(Message::Text(message.to_owned()))
            .await
            .map_err(|e| SessionError::Write(e.to_string()))
    }

    async fn recv(&mut self) -> Result<(), SessionError> {
        match self.socket.recv().await {
            Some(Ok(Message::Close(_))) | None => Err(SessionError::Closed),
            Some(Ok(_)) => Ok(()),
            Some(Err(e)) => Err(SessionError::Read(e.to_string())),
        }
    }

    async fn close(&mut self) {
        let _ = SinkExt::close(&mut self.socket).await;
    }
}
