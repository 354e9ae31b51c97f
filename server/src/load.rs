//! Message load generation
//!
//! A load is the ordered list of payloads one session sends: `"1\n"`,
//! `"2\n"`, ... up to the configured count. Every session builds its own.

use crate::error::StubError;
use std::num::{NonZeroU32, NonZeroUsize};

/// Messages per session when none is configured
pub const DEFAULT_COUNT: NonZeroUsize = NonZeroUsize::new(3000).unwrap();

/// Pacing window in seconds when none is configured
pub const DEFAULT_COST: NonZeroU32 = NonZeroU32::new(60).unwrap();

/// Total message count and pacing window for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Messages generated per session
    pub count: NonZeroUsize,
    /// Seconds (ticks) over which the load is spread
    pub cost: NonZeroU32,
}

impl LoadOptions {
    /// Validate raw values coming from the command line or environment.
    pub fn new(count: i64, cost: i64) -> Result<Self, StubError> {
        if count <= 0 {
            return Err(StubError::InvalidConfiguration(format!(
                "message count must be positive, got {}",
                count
            )));
        }
        if cost <= 0 {
            return Err(StubError::InvalidConfiguration(format!(
                "pacing duration must be a positive number of seconds, got {}",
                cost
            )));
        }

        let count = usize::try_from(count)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| {
                StubError::InvalidConfiguration(format!("message count {} is too large", count))
            })?;
        let cost = u32::try_from(cost)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| {
                StubError::InvalidConfiguration(format!(
                    "pacing duration of {} seconds is too large",
                    cost
                ))
            })?;
        Ok(Self { count, cost })
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            cost: DEFAULT_COST,
        }
    }
}

/// Immutable, ordered message payloads for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLoad {
    messages: Vec<String>,
}

impl MessageLoad {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.messages
    }
}

/// Build `count` newline-terminated decimal counters starting at 1.
pub fn generate(count: usize) -> MessageLoad {
    let messages = (1..=count).map(|i| format!("{}\n", i)).collect();
    MessageLoad { messages }
}
