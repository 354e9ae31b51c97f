//! Error types for the stub servers
//!
//! `StubError` covers everything that stops a server (or keeps it from
//! starting). `SessionError` covers a single connection and never leaves the
//! session that produced it.

use std::io;
use thiserror::Error;

/// Server-level errors: configuration, bind and accept failures
#[derive(Debug, Error)]
pub enum StubError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to accept connection: {0}")]
    Accept(#[source] io::Error),

    #[error("Server stopped: {0}")]
    Serve(#[source] io::Error),

    #[error("Failed to install metrics exporter: {0}")]
    Metrics(String),
}

/// Errors local to one connection session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Write failed: {0}")]
    Write(String),

    #[error("Read failed: {0}")]
    Read(String),

    #[error("Peer closed the connection")]
    Closed,

    #[error("Session registry is closed")]
    RegistryClosed,
}

impl SessionError {
    /// True when the peer went away cleanly rather than the transport failing
    pub fn is_peer_close(&self) -> bool {
        matches!(self, SessionError::Closed)
    }
}
