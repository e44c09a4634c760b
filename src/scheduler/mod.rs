//! Fixed-period poll scheduling.
//!
//! [`PollScheduler`] never sleeps or spawns anything itself. The host asks
//! it whether a tick is due at a given instant and when the next one falls,
//! which keeps it steppable from tests with synthetic instants. Stopping is
//! done through a shared [`CancellationToken`].

pub mod event_loop;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared, clonable stop flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Decides when poll ticks fire.
#[derive(Debug)]
pub struct PollScheduler {
    interval: Duration,
    next_due: Option<Instant>,
    token: CancellationToken,
}

impl PollScheduler {
    pub fn new(interval: Duration, token: CancellationToken) -> Self {
        Self {
            interval,
            next_due: None,
            token,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Arm the scheduler. The first tick is due immediately.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    /// Stop firing. Equivalent to cancelling the token.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// When the next tick is due, or `None` if not started or cancelled.
    pub fn next_due(&self) -> Option<Instant> {
        if self.token.is_cancelled() {
            return None;
        }
        self.next_due
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due().is_some_and(|due| now >= due)
    }

    /// Time left until the next tick (zero if overdue).
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due()
            .map(|due| due.saturating_duration_since(now))
    }

    /// Consume a due tick. Returns `true` if one fired.
    ///
    /// Ticks keep a fixed cadence relative to the first one. If the host fell
    /// behind by more than a whole period, missed ticks are dropped rather
    /// than fired in a burst.
    pub fn fire(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due() else {
            return false;
        };
        if now < due {
            return false;
        }
        let mut next = due + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.next_due = Some(next);
        true
    }
}
