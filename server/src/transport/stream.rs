//! Raw byte-stream transport (plain TCP)

use super::Transport;
use crate::error::SessionError;
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tracing::debug;

/// Inbound bytes are only read to notice EOF, never kept
const DISCARD_BUF_SIZE: usize = 1024;

/// Writes messages straight onto a byte stream, one flush per message
pub struct StreamTransport<S> {
    peer: String,
    reader: ReadHalf<S>,
    writer: BufWriter<WriteHalf<S>>,
    discard: Box<[u8]>,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Send,
{
    pub fn new(stream: S, peer: impl Into<String>) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            peer: peer.into(),
            reader: read_half,
            writer: BufWriter::new(write_half),
            discard: vec![0; DISCARD_BUF_SIZE].into_boxed_slice(),
        }
    }
}

impl StreamTransport<TcpStream> {
    /// Wrap an accepted socket with Nagle disabled, so each flushed message
    /// leaves as soon as it is written.
    pub fn from_tcp(stream: TcpStream) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY: {}", e);
        }
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        Self::new(stream, peer)
    }
}

#[async_trait]
impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Send,
{
    fn peer(&self) -> &str {
        &self.peer
    }

    async fn send(&mut self, message: &str) -> Result<(), SessionError> {
        self.writer
            .write_all(message.as_bytes())
            .await
            .map_err(|e| SessionError::Write(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| SessionError::Write(e.to_string()))
    }

    async fn recv(&mut self) -> Result<(), SessionError> {
        match self.reader.read(&mut self.discard).await {
            Ok(0) => Err(SessionError::Closed),
            Ok(_) => Ok(()),
            Err(e) => Err(SessionError::Read(e.to_string())),
        }
    }

    async fn close(&mut self) {
        let _ = self.writer.shutdown().await;
    }
}
