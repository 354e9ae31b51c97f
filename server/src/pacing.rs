//! Rate-paced message delivery
//!
//! A load of `count` messages is cut into slices of `count / cost` messages.
//! One slice goes out per tick for `cost` ticks, and whatever does not fit
//! (`count % cost` messages) is written as a single unpaced burst after the
//! last tick. When `cost > count` the slice size is zero, there are no ticks,
//! and the whole load is the burst.
//!
//! Ticks sit on a fixed grid anchored at the start of the run, so a slow
//! slice shortens the following wait instead of shifting every later tick.

use crate::error::{SessionError, StubError};
use crate::load::MessageLoad;
use crate::transport::Transport;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

/// Pacing interval used by the servers
pub const TICK: Duration = Duration::from_secs(1);

/// How a load of a given length is split across ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Messages per tick
    pub slice: usize,
    /// Number of paced ticks
    pub ticks: usize,
    /// Messages in the trailing burst
    pub remainder: usize,
}

impl Schedule {
    pub fn plan(len: usize, cost: NonZeroU32) -> Self {
        let cost = cost.get() as usize;
        let slice = len / cost;
        let ticks = if slice == 0 { 0 } else { cost };
        Self {
            slice,
            ticks,
            remainder: len - slice * ticks,
        }
    }

    /// Index of the first message of the trailing burst
    pub fn burst_start(&self) -> usize {
        self.slice * self.ticks
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingReport {
    pub delivered: usize,
    pub ticks: usize,
    pub elapsed: Duration,
}

/// A write failed; `delivered` messages made it out before it
#[derive(Debug, Error)]
#[error("{source} after {delivered} messages")]
pub struct PacingError {
    pub delivered: usize,
    #[source]
    pub source: SessionError,
}

/// Emits a message load over a transport at one slice per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    tick: Duration,
}

impl Default for Pacer {
    fn default() -> Self {
        Self { tick: TICK }
    }
}

impl Pacer {
    /// A pacer with a custom tick. A zero tick is rejected.
    pub fn new(tick: Duration) -> Result<Self, StubError> {
        if tick.is_zero() {
            return Err(StubError::InvalidConfiguration(
                "pacing tick must be longer than zero".to_string(),
            ));
        }
        Ok(Self { tick })
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Deliver `load` over `transport`, pacing it across `cost` ticks.
    ///
    /// Stops at the first write error; nothing is retried.
    pub async fn run<T>(
        &self,
        transport: &mut T,
        load: &MessageLoad,
        cost: NonZeroU32,
    ) -> Result<PacingReport, PacingError>
    where
        T: Transport + ?Sized,
    {
        let start = Instant::now();
        let schedule = Schedule::plan(load.len(), cost);
        let messages = load.as_slice();
        let mut delivered = 0;

        if schedule.ticks > 0 {
            let mut interval = time::interval(self.tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            for (tick, slice) in messages[..schedule.burst_start()]
                .chunks(schedule.slice)
                .enumerate()
            {
                interval.tick().await;
                trace!(
                    "Tick {}/{} to {}: {} messages",
                    tick + 1,
                    schedule.ticks,
                    transport.peer(),
                    slice.len()
                );
                deliver(transport, slice, &mut delivered).await?;
            }

            // Hold the last slice for a full tick before the burst
            interval.tick().await;
        }

        deliver(transport, &messages[schedule.burst_start()..], &mut delivered).await?;

        Ok(PacingReport {
            delivered,
            ticks: schedule.ticks,
            elapsed: start.elapsed(),
        })
    }
}

async fn deliver<T>(
    transport: &mut T,
    batch: &[String],
    delivered: &mut usize,
) -> Result<(), PacingError>
where
    T: Transport + ?Sized,
{
    for message in batch {
        transport
            .send(message)
            .await
            .map_err(|source| PacingError {
                delivered: *delivered,
                source,
            })?;
        *delivered += 1;
    }
    Ok(())
}
