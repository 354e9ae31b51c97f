//! Raw TCP accept loop

use crate::error::StubError;
use crate::session::{self, SessionContext};
use crate::transport::StreamTransport;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Accept connections forever, one session task per connection.
///
/// Any accept error is treated as fatal: the completion signal fires and
/// the loop stops. Sessions live in a `JoinSet` owned by the loop, so
/// dropping the returned future aborts them.
pub async fn serve_socket(listener: TcpListener, context: SessionContext) -> Result<(), StubError> {
    let mut sessions = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!("Dispatching session for {}", peer);
                    sessions.spawn(session::serve(
                        StreamTransport::from_tcp(stream),
                        context.clone(),
                    ));
                }
                Err(e) => {
                    error!("Cannot accept connection: {}", e);
                    context.coordinator.complete();
                    return Err(StubError::Accept(e));
                }
            },
            Some(finished) = sessions.join_next(), if !sessions.is_empty() => {
                if let Err(e) = finished
                    && e.is_panic()
                {
                    warn!("Session task panicked: {}", e);
                }
            }
        }
    }
}
