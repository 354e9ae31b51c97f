//! Common Test Utilities for Integration Tests
//!
//! Servers are started on `127.0.0.1:0` with a short tick so paced runs
//! finish in well under a second.

#![allow(dead_code)]

use ratestub_server::server::{Flavor, run_until_complete};
use ratestub_server::{Coordinator, LoadOptions, Pacer, SessionContext, StubError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Tick used by integration tests instead of one second
pub const TEST_TICK: Duration = Duration::from_millis(50);

/// Generous upper bound for anything a test waits on
pub const WAIT: Duration = Duration::from_secs(5);

pub fn test_context(count: i64, cost: i64) -> SessionContext {
    capped_test_context(count, cost, ratestub_server::session::DEFAULT_MAX_SESSIONS)
}

/// Like `test_context`, admitting at most `max_sessions` at once
pub fn capped_test_context(count: i64, cost: i64, max_sessions: usize) -> SessionContext {
    SessionContext::new(
        LoadOptions::new(count, cost).unwrap(),
        Coordinator::new(max_sessions),
    )
    .with_pacer(Pacer::new(TEST_TICK).unwrap())
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub coordinator: Arc<Coordinator>,
    pub handle: JoinHandle<Result<(), StubError>>,
}

/// Start a paced server on a random port
pub async fn start_server(flavor: Flavor, context: SessionContext) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let coordinator = Arc::clone(&context.coordinator);

    let handle = tokio::spawn(run_until_complete(flavor, listener, context));

    TestServer {
        addr,
        coordinator,
        handle,
    }
}

impl TestServer {
    /// Wait for the server to observe completion and return
    pub async fn finished(self) -> Result<(), StubError> {
        tokio::time::timeout(WAIT, self.handle)
            .await
            .expect("server should finish after the last session drains")
            .expect("server task should not panic")
    }
}

/// `"1\n"` through `"n\n"`
pub fn expected_lines(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{}\n", i)).collect()
}

/// Read `n` newline-terminated lines
pub async fn read_lines<R>(reader: &mut BufReader<R>, n: usize) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut lines = Vec::with_capacity(n);
    for _ in 0..n {
        let mut line = String::new();
        let read = tokio::time::timeout(WAIT, reader.read_line(&mut line))
            .await
            .expect("line should arrive in time")
            .unwrap();
        assert!(read > 0, "server closed before sending every line");
        lines.push(line);
    }
    lines
}

/// Initialize test logging for detailed output
pub fn init_test_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratestub_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
