//! Scenario runs on the simulated clock from `looptimer::test_support`.
//!
//! Polls and sleeps advance simulated time, so every elapsed value is exact.

use std::fs;
use std::sync::Arc;

use looptimer::core::types::Outcome;
use looptimer::exit_codes;
use looptimer::io::config::{ScenarioConfig, load_config};
use looptimer::scenario::{LoopStop, ScenarioReport, run_scenario};
use looptimer::test_support::{ScriptedEvents, SimClock, SimSleeper};

fn run_on(clock: &SimClock, cfg: &ScenarioConfig) -> ScenarioReport {
    run_scenario(
        cfg,
        Arc::new(clock.clone()),
        Arc::new(SimSleeper::new(clock)),
        &ScriptedEvents::new(clock),
        |_| {},
    )
    .expect("scenario")
}

fn outcomes(report: &ScenarioReport) -> Vec<(&str, Outcome, u32)> {
    report
        .steps
        .iter()
        .map(|s| (s.id.as_str(), s.outcome, s.elapsed_ms))
        .collect()
}

/// Loop of 400 ms loaded from disk:
/// 1. `wait` gets its event 50 ms in -> ok after 50 ms.
/// 2. `ack` allows 50 ms, its event comes at 300 ms -> step timeout.
/// 3. `idle` sleeps the 300 ms left in the loop.
#[test]
fn scenario_file_runs_to_loop_budget() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("scenario.toml");
    fs::write(
        &path,
        r#"
loop_budget_ms = 400

[[steps]]
id = "wait"
expected_duration_ms = 200
strategy = "wait_event"
event_after_ms = 50

[[steps]]
id = "ack"
expected_duration_ms = 50
strategy = "wait_event"
event_after_ms = 300

[[steps]]
id = "idle"
expected_duration_ms = 400
strategy = "sleep_remaining"
"#,
    )
    .expect("write scenario");
    let cfg = load_config(&path).expect("load");

    let report = run_on(&SimClock::at(0), &cfg);

    assert_eq!(
        outcomes(&report),
        vec![
            ("wait", Outcome::Ok, 50),
            ("ack", Outcome::StepTimedOut, 50),
            ("idle", Outcome::Ok, 300),
        ]
    );
    assert_eq!(report.total_elapsed_ms, 400);
    assert_eq!(report.stop, LoopStop::Completed);
    assert_eq!(report.exit_code(), exit_codes::STEP_TIMED_OUT);
}

#[test]
fn default_scenario_survives_tick_counter_wrap() {
    let clock = SimClock::at(u32::MAX - 3_000);

    let report = run_on(&clock, &ScenarioConfig::default());

    assert_eq!(
        outcomes(&report),
        vec![
            ("sensor", Outcome::Ok, 2_000),
            ("actuate", Outcome::Ok, 2_500),
            ("ack", Outcome::StepTimedOut, 500),
            ("idle", Outcome::Ok, 2_000),
        ]
    );
    assert_eq!(report.total_elapsed_ms, 7_000);
    assert_eq!(report.loop_budget_ms, 7_000);
}
