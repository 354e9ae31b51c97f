//! ratestub server library
//!
//! Stub servers that feed a client under test: the socket and WebSocket
//! servers stream `count` numbered messages to each connection spread over
//! `cost` seconds, the HTTP server answers every request with one fixed body.
//! The binaries are thin wrappers; everything here is usable from tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod load;
pub mod pacing;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod transport;

// Re-export commonly used types
pub use config::{HttpServerConfig, ListenConfig, LogLevel, PacedServerConfig, ResponseBody};
pub use error::{SessionError, StubError};
pub use load::{LoadOptions, MessageLoad, generate};
pub use pacing::{Pacer, PacingReport, Schedule};
pub use server::Flavor;
pub use session::{Coordinator, SessionContext};
pub use transport::Transport;
