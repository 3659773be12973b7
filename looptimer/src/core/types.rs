//! Shared value types for the timer core.
//!
//! These are plain data with no behavior beyond classification helpers, so
//! they can flow through logs and reports unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result classification for a budget check, a strategy, or a session call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The step finished within both budgets.
    Ok,
    /// The step's own budget expired first.
    StepTimedOut,
    /// The enclosing loop's budget expired. Takes precedence over `StepTimedOut`.
    LoopTimedOut,
    /// The referenced step id is not registered.
    InvalidStep,
    /// A required capability was not supplied.
    MissingCapability,
    /// Malformed session usage, e.g. starting a loop without a clock.
    InvalidArgument,
}

impl Outcome {
    pub fn is_ok(self) -> bool {
        self == Outcome::Ok
    }

    /// True for either budget expiring.
    pub fn is_timeout(self) -> bool {
        matches!(self, Outcome::StepTimedOut | Outcome::LoopTimedOut)
    }

    /// Stable snake_case label, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::StepTimedOut => "step_timed_out",
            Outcome::LoopTimedOut => "loop_timed_out",
            Outcome::InvalidStep => "invalid_step",
            Outcome::MissingCapability => "missing_capability",
            Outcome::InvalidArgument => "invalid_argument",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a step spends its slice of the loop budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Return as soon as the event fires, or on timeout.
    WaitEvent,
    /// Wait for the event, then sleep out the rest of the step budget.
    WaitEventThenSettle,
    /// Sleep the step budget, clamped to what is left of the loop.
    SleepRemaining,
}

impl Strategy {
    /// Whether the strategy polls an event capability.
    pub fn needs_event(self) -> bool {
        !matches!(self, Strategy::SleepRemaining)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::WaitEvent => "wait_event",
            Strategy::WaitEventThenSettle => "wait_event_then_settle",
            Strategy::SleepRemaining => "sleep_remaining",
        }
    }
}

/// Outcome of one strategy call plus the time it consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub outcome: Outcome,
    /// Milliseconds from the step's own start to the strategy returning.
    pub elapsed_ms: u32,
}

impl StepResult {
    pub fn new(outcome: Outcome, elapsed_ms: u32) -> Self {
        Self {
            outcome,
            elapsed_ms,
        }
    }
}
