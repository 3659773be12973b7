//! Wait strategies a step can use to spend its slice of the loop budget.
//!
//! All strategies measure elapsed time from the step's own start, never from
//! the loop start, and none of them may sleep past the loop deadline.

use crate::core::budget::{LoopContext, check};
use crate::core::capability::{Clock, EventFlag, Sleeper};
use crate::core::types::{Outcome, StepResult, Strategy};

/// Borrowed capabilities for a single strategy call. Any of them may be absent.
#[derive(Clone, Copy, Default)]
pub struct StepCapabilities<'a> {
    pub clock: Option<&'a dyn Clock>,
    pub sleeper: Option<&'a dyn Sleeper>,
    pub event: Option<&'a dyn EventFlag>,
}

/// Sleep for `step_budget_ms`, clamped to what is left of the loop budget.
///
/// Returns the elapsed milliseconds. An exhausted loop returns `0` without
/// sleeping.
pub fn sleep_remaining(
    lp: &LoopContext,
    step_budget_ms: u32,
    clock: &dyn Clock,
    sleeper: &dyn Sleeper,
) -> u32 {
    let current = clock.now();
    if lp.is_exhausted(current) {
        return 0;
    }

    let sleep_ms = step_budget_ms.min(lp.remaining(current));
    if sleep_ms > 0 {
        sleeper.sleep(sleep_ms);
    }
    clock.now().wrapping_sub(current)
}

/// Spin until the event fires or either budget expires.
///
/// The budget check only runs after an unset poll, so an event that is already
/// set wins even when the budget is gone.
fn poll_event(
    lp: &LoopContext,
    step_start_ms: u32,
    step_budget_ms: u32,
    clock: &dyn Clock,
    event: &dyn EventFlag,
) -> Outcome {
    while !event.is_set() {
        let outcome = check(lp, step_start_ms, step_budget_ms, Some(clock));
        if outcome != Outcome::Ok {
            return outcome;
        }
        std::hint::spin_loop();
    }
    Outcome::Ok
}

/// Wait for the event or a timeout, whichever comes first.
///
/// The step budget is not clamped to the loop's remaining budget here; an
/// oversized step simply ends with `LoopTimedOut`.
pub fn wait_event(
    lp: &LoopContext,
    step_budget_ms: u32,
    clock: Option<&dyn Clock>,
    event: Option<&dyn EventFlag>,
) -> StepResult {
    let (Some(clock), Some(event)) = (clock, event) else {
        return StepResult::new(Outcome::MissingCapability, 0);
    };

    let step_start = clock.now();
    let outcome = poll_event(lp, step_start, step_budget_ms, clock, event);
    StepResult::new(outcome, clock.now().wrapping_sub(step_start))
}

/// Wait for the event, then sleep out the rest of the step budget.
///
/// A step whose event fires early still consumes roughly its configured
/// budget. Timeouts return immediately without the settle sleep.
pub fn wait_event_and_settle(
    lp: &LoopContext,
    step_budget_ms: u32,
    clock: Option<&dyn Clock>,
    event: Option<&dyn EventFlag>,
    sleeper: Option<&dyn Sleeper>,
) -> StepResult {
    let (Some(clock), Some(event), Some(sleeper)) = (clock, event, sleeper) else {
        return StepResult::new(Outcome::MissingCapability, 0);
    };

    let step_start = clock.now();
    let outcome = poll_event(lp, step_start, step_budget_ms, clock, event);
    if outcome.is_ok() {
        // Events noticed after the step budget settle for zero, not u32::MAX.
        let leftover = step_budget_ms.saturating_sub(clock.now().wrapping_sub(step_start));
        sleep_remaining(lp, leftover, clock, sleeper);
    }
    StepResult::new(outcome, clock.now().wrapping_sub(step_start))
}

/// Run `strategy` for one step.
pub fn run_strategy(
    strategy: Strategy,
    lp: &LoopContext,
    step_budget_ms: u32,
    caps: StepCapabilities<'_>,
) -> StepResult {
    match strategy {
        Strategy::WaitEvent => wait_event(lp, step_budget_ms, caps.clock, caps.event),
        Strategy::WaitEventThenSettle => {
            wait_event_and_settle(lp, step_budget_ms, caps.clock, caps.event, caps.sleeper)
        }
        Strategy::SleepRemaining => match (caps.clock, caps.sleeper) {
            (Some(clock), Some(sleeper)) => StepResult::new(
                Outcome::Ok,
                sleep_remaining(lp, step_budget_ms, clock, sleeper),
            ),
            _ => StepResult::new(Outcome::MissingCapability, 0),
        },
    }
}
