//! Nested deadline arithmetic shared by every wait strategy.

use serde::Serialize;

use crate::core::capability::Clock;
use crate::core::types::Outcome;

/// Start time and total budget of one loop iteration.
///
/// Fixed for the lifetime of the iteration and shared by every step run in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoopContext {
    pub start_ms: u32,
    pub budget_ms: u32,
}

impl LoopContext {
    pub fn new(start_ms: u32, budget_ms: u32) -> Self {
        Self {
            start_ms,
            budget_ms,
        }
    }

    /// Milliseconds consumed by the loop at timestamp `now`.
    pub fn elapsed(&self, now: u32) -> u32 {
        now.wrapping_sub(self.start_ms)
    }

    pub fn is_exhausted(&self, now: u32) -> bool {
        self.elapsed(now) >= self.budget_ms
    }

    /// Budget left at timestamp `now`, zero once exhausted.
    pub fn remaining(&self, now: u32) -> u32 {
        self.budget_ms.saturating_sub(self.elapsed(now))
    }
}

/// Decide whether a step running inside `lp` has run out of time.
///
/// The loop deadline is checked before the step deadline so callers can rely on
/// `LoopTimedOut` to abandon the rest of the iteration. Both comparisons use a
/// single clock reading.
pub fn check(
    lp: &LoopContext,
    step_start_ms: u32,
    step_budget_ms: u32,
    clock: Option<&dyn Clock>,
) -> Outcome {
    let Some(clock) = clock else {
        return Outcome::MissingCapability;
    };
    let now = clock.now();
    if lp.is_exhausted(now) {
        Outcome::LoopTimedOut
    } else if now.wrapping_sub(step_start_ms) >= step_budget_ms {
        Outcome::StepTimedOut
    } else {
        Outcome::Ok
    }
}
