//! Run one loop iteration of a configured scenario through a [`TimerSession`].

use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::core::capability::{Clock, Sleeper};
use crate::core::types::{Outcome, Strategy};
use crate::exit_codes;
use crate::io::config::ScenarioConfig;
use crate::io::system::{SystemClock, ThreadSleeper};
use crate::io::worker::{EventSource, ThreadWorkers};
use crate::session::TimerSession;

/// Result of a single executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub id: String,
    pub strategy: Strategy,
    pub expected_duration_ms: u32,
    pub outcome: Outcome,
    pub elapsed_ms: u32,
}

/// Why the scenario stopped running steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoopStop {
    /// Every configured step was executed.
    Completed,
    /// A step hit the loop deadline and the remaining steps were skipped.
    Abandoned { at_step: String, skipped: Vec<String> },
}

/// Summary of one loop iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub loop_budget_ms: u32,
    pub steps: Vec<StepReport>,
    /// Time from loop start until the last step returned.
    pub total_elapsed_ms: u32,
    pub stop: LoopStop,
}

impl ScenarioReport {
    /// Map the worst step outcome to a CLI exit code.
    pub fn exit_code(&self) -> i32 {
        let outcomes = || self.steps.iter().map(|step| step.outcome);
        if outcomes().any(|o| o == Outcome::LoopTimedOut) {
            exit_codes::LOOP_TIMED_OUT
        } else if outcomes().any(|o| o == Outcome::StepTimedOut) {
            exit_codes::STEP_TIMED_OUT
        } else {
            exit_codes::OK
        }
    }
}

/// Run the scenario's steps in file order inside a single loop iteration.
///
/// Event steps get a freshly armed event from `events` right before they
/// execute. `on_step` is called after every executed step. Outcomes that mean
/// the session itself is misconfigured are returned as errors.
#[instrument(skip_all, fields(loop_budget_ms = cfg.loop_budget_ms, steps = cfg.steps.len()))]
pub fn run_scenario<S: EventSource, F: FnMut(&StepReport)>(
    cfg: &ScenarioConfig,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    events: &S,
    mut on_step: F,
) -> Result<ScenarioReport> {
    cfg.validate()?;

    let mut session = TimerSession::new(cfg.loop_budget_ms, Some(clock.clone()), Some(sleeper));
    for step in &cfg.steps {
        session.register_step(
            step.id.as_str(),
            step.expected_duration_ms,
            None,
            step.strategy,
        );
    }

    debug!(steps = ?session.step_ids(), "registered steps");

    let started = session.start_loop();
    if !started.is_ok() {
        bail!("start loop: {started}");
    }
    let loop_start = session
        .loop_start_time()
        .ok_or_else(|| anyhow!("loop start missing after start_loop"))?;

    let mut reports = Vec::with_capacity(cfg.steps.len());
    let mut stop = LoopStop::Completed;
    for (index, step) in cfg.steps.iter().enumerate() {
        if step.strategy.needs_event()
            && let Some(after_ms) = step.event_after_ms
        {
            let event = events.arm(&step.id, after_ms);
            session.register_step(
                step.id.as_str(),
                step.expected_duration_ms,
                Some(event),
                step.strategy,
            );
        }

        let outcome = session.execute_step(&step.id);
        if matches!(
            outcome,
            Outcome::InvalidStep | Outcome::MissingCapability | Outcome::InvalidArgument
        ) {
            bail!("step {}: {outcome}", step.id);
        }

        let report = StepReport {
            id: step.id.clone(),
            strategy: step.strategy,
            expected_duration_ms: step.expected_duration_ms,
            outcome,
            elapsed_ms: session.last_elapsed_time(),
        };
        on_step(&report);
        reports.push(report);

        if outcome == Outcome::LoopTimedOut && cfg.abandon_on_loop_timeout {
            let skipped: Vec<String> = cfg.steps[index + 1..]
                .iter()
                .map(|s| s.id.clone())
                .collect();
            warn!(
                step = %step.id,
                skipped = skipped.len(),
                "loop budget exhausted, abandoning iteration"
            );
            stop = LoopStop::Abandoned {
                at_step: step.id.clone(),
                skipped,
            };
            break;
        }
    }

    let total_elapsed_ms = clock.now().wrapping_sub(loop_start);
    info!(total_elapsed_ms, "loop finished");
    Ok(ScenarioReport {
        loop_budget_ms: session.loop_budget(),
        steps: reports,
        total_elapsed_ms,
        stop,
    })
}

/// Run a scenario on the OS clock with real worker threads.
pub fn run_system_scenario<F: FnMut(&StepReport)>(
    cfg: &ScenarioConfig,
    on_step: F,
) -> Result<ScenarioReport> {
    run_scenario(
        cfg,
        Arc::new(SystemClock::new()),
        Arc::new(ThreadSleeper),
        &ThreadWorkers,
        on_step,
    )
}
