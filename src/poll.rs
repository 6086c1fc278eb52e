//! Bounded poll-until-condition.
//!
//! Re-reads remote state on a fixed interval until a predicate holds or the
//! wall-clock budget runs out. Running out of budget is reported as
//! [`PollOutcome::TimedOut`] rather than an error: the remote side may still
//! be working on the change.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub time_limit: Duration,
    pub interval: Duration,
}

impl PollConfig {
    pub fn new(time_limit: Duration, interval: Duration) -> Self {
        Self {
            time_limit,
            interval,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(60), Duration::from_secs(3))
    }
}

/// Passed to the reader on every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTick {
    pub attempt: u32,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    Confirmed {
        value: T,
        attempts: u32,
        elapsed: Duration,
    },
    TimedOut {
        attempts: u32,
        elapsed: Duration,
    },
}

impl<T> PollOutcome<T> {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, PollOutcome::Confirmed { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Confirmed { attempts, .. } | PollOutcome::TimedOut { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            PollOutcome::Confirmed { elapsed, .. } | PollOutcome::TimedOut { elapsed, .. } => {
                *elapsed
            }
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            PollOutcome::Confirmed { value, .. } => Some(value),
            PollOutcome::TimedOut { .. } => None,
        }
    }
}

/// Calls `read` until `done` accepts its result or `config.time_limit` elapses.
///
/// Reader errors are logged and treated as "not observed yet". The final sleep
/// is clipped to the remaining budget, so the loop never outlives the budget by
/// more than one read.
pub async fn poll_until<T, E, F, Fut, P>(config: &PollConfig, mut read: F, mut done: P) -> PollOutcome<T>
where
    F: FnMut(PollTick) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    P: FnMut(&T) -> bool,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    while start.elapsed() < config.time_limit {
        attempts += 1;
        let tick = PollTick {
            attempt: attempts,
            elapsed: start.elapsed(),
        };

        match read(tick).await {
            Ok(value) if done(&value) => {
                debug!(attempts, "Poll condition confirmed");
                return PollOutcome::Confirmed {
                    value,
                    attempts,
                    elapsed: start.elapsed(),
                };
            }
            Ok(_) => debug!(attempts, "Poll condition not met yet"),
            Err(e) => warn!(attempts, error = %e, "Poll read failed"),
        }

        let remaining = config.time_limit.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            break;
        }
        tokio::time::sleep(config.interval.min(remaining)).await;
    }

    PollOutcome::TimedOut {
        attempts,
        elapsed: start.elapsed(),
    }
}
