//! Per-turn time budgeting.
//!
//! The budget is a fixed fraction of the clock left for this side. The search
//! samples a [`Deadline`] between sibling moves; nothing interrupts a child
//! expansion already in progress.

use std::time::{Duration, Instant};

const LONG_CLOCK: Duration = Duration::from_secs(600);
const MEDIUM_CLOCK: Duration = Duration::from_secs(300);

/// Share of `remaining` to spend on one move: a twentieth with ten minutes or
/// more left, a tenth with five minutes or more, a fifth below that.
pub fn allocate_budget(remaining: Duration) -> Duration {
    if remaining >= LONG_CLOCK {
        remaining / 20
    } else if remaining >= MEDIUM_CLOCK {
        remaining / 10
    } else {
        remaining / 5
    }
}

/// Same policy for a clock reported in nanoseconds.
pub fn allocate_budget_nanos(remaining_ns: u64) -> Duration {
    allocate_budget(Duration::from_nanos(remaining_ns))
}

/// Wall-clock limit for one search, started when it is created.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    pub fn new(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget: Some(budget),
        }
    }

    /// A deadline that never expires.
    pub fn unbounded() -> Self {
        Self {
            start: Instant::now(),
            budget: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    pub fn is_expired(&self) -> bool {
        match self.budget {
            Some(budget) => self.elapsed() > budget,
            None => false,
        }
    }
}
