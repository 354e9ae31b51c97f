//! Lifecycle of one served connection
//!
//! register -> generate load -> paced send -> drain until the peer leaves
//! -> close -> deregister (via the guard)

use super::coordinator::Coordinator;
use crate::error::SessionError;
use crate::load::{LoadOptions, generate};
use crate::pacing::Pacer;
use crate::transport::Transport;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Everything a session needs from its server
#[derive(Clone)]
pub struct SessionContext {
    pub options: LoadOptions,
    pub pacer: Pacer,
    pub coordinator: Arc<Coordinator>,
}

impl SessionContext {
    pub fn new(options: LoadOptions, coordinator: Arc<Coordinator>) -> Self {
        Self {
            options,
            pacer: Pacer::default(),
            coordinator,
        }
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }
}

/// Serve one connection to completion. Errors end this session only.
pub async fn serve<T>(mut transport: T, context: SessionContext)
where
    T: Transport,
{
    let session_id = Uuid::new_v4();
    let peer = transport.peer().to_string();

    let _guard = match context.coordinator.register().await {
        Ok(guard) => guard,
        Err(e) => {
            warn!("Session {} from {} not admitted: {}", session_id, peer, e);
            transport.close().await;
            return;
        }
    };
    debug!("Accepted connection {} from {}", session_id, peer);
    counter!("ratestub_sessions_started_total").increment(1);

    let started = Instant::now();
    let load = generate(context.options.count.get());

    match context
        .pacer
        .run(&mut transport, &load, context.options.cost)
        .await
    {
        Ok(report) => {
            counter!("ratestub_messages_sent_total").increment(report.delivered as u64);
            debug!(
                "Session {} sent {} messages in {} ticks, {:.1}s",
                session_id,
                report.delivered,
                report.ticks,
                report.elapsed.as_secs_f64()
            );

            let reason = drain(&mut transport).await;
            if reason.is_peer_close() {
                debug!("Peer {} closed session {}", peer, session_id);
            } else {
                debug!("Session {} drain ended: {}", session_id, reason);
            }
        }
        Err(e) => {
            counter!("ratestub_messages_sent_total").increment(e.delivered as u64);
            counter!("ratestub_write_failures_total").increment(1);
            debug!("Session {} to {} aborted: {}", session_id, peer, e);
        }
    }

    transport.close().await;
    histogram!("ratestub_session_duration_seconds").record(started.elapsed());
    debug!("Closed connection {} ({})", session_id, peer);
}

/// Read and discard until the peer goes away
async fn drain<T>(transport: &mut T) -> SessionError
where
    T: Transport + ?Sized,
{
    loop {
        if let Err(reason) = transport.recv().await {
            return reason;
        }
    }
}
