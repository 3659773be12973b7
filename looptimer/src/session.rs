//! Stateful timer session: named steps run one after another under a shared
//! loop budget.
//!
//! A session is reusable across iterations. `start_loop` stamps a fresh loop
//! start; `execute_step` then runs registered steps in whatever order the
//! caller asks for, each against the same loop deadline.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::budget::LoopContext;
use crate::core::capability::{Clock, EventFlag, Sleeper};
use crate::core::strategy::{StepCapabilities, run_strategy};
use crate::core::types::{Outcome, Strategy};

/// Registered configuration for one step.
#[derive(Clone)]
pub struct StepConfig {
    pub expected_duration_ms: u32,
    pub event: Option<Arc<dyn EventFlag>>,
    pub strategy: Strategy,
}

impl fmt::Debug for StepConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepConfig")
            .field("expected_duration_ms", &self.expected_duration_ms)
            .field("event", &self.event.is_some())
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// Loop budget, step table and the most recent elapsed time.
pub struct TimerSession {
    loop_budget_ms: u32,
    clock: Option<Arc<dyn Clock>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    steps: HashMap<String, StepConfig>,
    loop_start_ms: Option<u32>,
    last_elapsed_ms: u32,
}

impl TimerSession {
    /// Create a session. Capabilities may be absent; the calls that need them
    /// report it instead of panicking.
    pub fn new(
        loop_budget_ms: u32,
        clock: Option<Arc<dyn Clock>>,
        sleeper: Option<Arc<dyn Sleeper>>,
    ) -> Self {
        Self {
            loop_budget_ms,
            clock,
            sleeper,
            steps: HashMap::new(),
            loop_start_ms: None,
            last_elapsed_ms: 0,
        }
    }

    /// Begin a loop iteration at the current clock reading.
    ///
    /// Returns `InvalidArgument` when the session has no clock.
    pub fn start_loop(&mut self) -> Outcome {
        let Some(clock) = self.clock.as_deref() else {
            warn!("start_loop called without a clock");
            return Outcome::InvalidArgument;
        };
        let start = clock.now();
        self.loop_start_ms = Some(start);
        debug!(
            loop_start_ms = start,
            loop_budget_ms = self.loop_budget_ms,
            "loop started"
        );
        Outcome::Ok
    }

    /// Insert or replace the step registered under `id`.
    pub fn register_step(
        &mut self,
        id: impl Into<String>,
        expected_duration_ms: u32,
        event: Option<Arc<dyn EventFlag>>,
        strategy: Strategy,
    ) {
        let id = id.into();
        debug!(step = %id, expected_duration_ms, ?strategy, "step registered");
        self.steps.insert(
            id,
            StepConfig {
                expected_duration_ms,
                event,
                strategy,
            },
        );
    }

    /// Run the step registered under `id` against the current loop.
    ///
    /// Unknown ids return `InvalidStep` and running before `start_loop`
    /// returns `InvalidArgument`; neither touches the last elapsed time.
    pub fn execute_step(&mut self, id: &str) -> Outcome {
        let Some(step) = self.steps.get(id) else {
            warn!(step = id, "step not registered");
            return Outcome::InvalidStep;
        };
        if self.clock.is_none() {
            return Outcome::MissingCapability;
        }
        let Some(lp) = self.loop_context() else {
            warn!(step = id, "step executed before start_loop");
            return Outcome::InvalidArgument;
        };

        debug!(
            step = id,
            strategy = ?step.strategy,
            expected_duration_ms = step.expected_duration_ms,
            "executing step"
        );
        let caps = StepCapabilities {
            clock: self.clock.as_deref(),
            sleeper: self.sleeper.as_deref(),
            event: step.event.as_deref(),
        };
        let result = run_strategy(step.strategy, &lp, step.expected_duration_ms, caps);
        self.last_elapsed_ms = result.elapsed_ms;

        if result.outcome.is_ok() {
            info!(step = id, elapsed_ms = result.elapsed_ms, "step finished");
        } else {
            warn!(
                step = id,
                elapsed_ms = result.elapsed_ms,
                outcome = %result.outcome,
                "step did not finish cleanly"
            );
        }
        result.outcome
    }

    pub fn last_elapsed_time(&self) -> u32 {
        self.last_elapsed_ms
    }

    /// Start of the current iteration, `None` until `start_loop` succeeds.
    pub fn loop_start_time(&self) -> Option<u32> {
        self.loop_start_ms
    }

    pub fn loop_budget(&self) -> u32 {
        self.loop_budget_ms
    }

    pub fn loop_context(&self) -> Option<LoopContext> {
        self.loop_start_ms
            .map(|start| LoopContext::new(start, self.loop_budget_ms))
    }

    pub fn step(&self, id: &str) -> Option<&StepConfig> {
        self.steps.get(id)
    }

    /// Registered ids in lexicographic order.
    pub fn step_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.steps.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
