//! Real-time loop tests on the OS clock.
//!
//! Events are raised by worker threads, so assertions allow a few tens of
//! milliseconds of scheduler slack above the ideal value.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use looptimer::core::capability::Clock;
use looptimer::core::types::{Outcome, Strategy};
use looptimer::io::system::{AtomicEvent, SystemClock, ThreadSleeper};
use looptimer::io::worker::spawn_event_after;
use looptimer::session::TimerSession;

const SLACK_MS: u32 = 60;

fn assert_near(actual: u32, expected: u32, label: &str) {
    assert!(
        actual + 2 >= expected && actual <= expected + SLACK_MS,
        "{label}: elapsed {actual} ms, expected about {expected} ms"
    );
}

fn system_session(budget_ms: u32, clock: &SystemClock) -> TimerSession {
    TimerSession::new(
        budget_ms,
        Some(Arc::new(*clock)),
        Some(Arc::new(ThreadSleeper)),
    )
}

/// Loop of 2000 ms:
/// 1. `acquire` waits up to 1000 ms, its worker fires at 500 ms -> ok.
/// 2. `confirm` waits up to 100 ms, its worker fires at 1000 ms -> step timeout.
/// 3. `idle` sleeps out whatever is left of the loop.
#[test]
fn steps_share_one_loop_budget() {
    let clock = SystemClock::new();
    let mut timer = system_session(2_000, &clock);
    let acquire = AtomicEvent::new();
    let confirm = AtomicEvent::new();
    timer.register_step(
        "acquire",
        1_000,
        Some(Arc::new(acquire.clone())),
        Strategy::WaitEvent,
    );
    timer.register_step(
        "confirm",
        100,
        Some(Arc::new(confirm.clone())),
        Strategy::WaitEvent,
    );
    timer.register_step("idle", 2_000, None, Strategy::SleepRemaining);

    assert_eq!(timer.start_loop(), Outcome::Ok);
    let loop_start = timer.loop_start_time().expect("loop started");

    spawn_event_after(acquire, Duration::from_millis(500));
    assert_eq!(timer.execute_step("acquire"), Outcome::Ok);
    assert_near(timer.last_elapsed_time(), 500, "acquire");

    spawn_event_after(confirm, Duration::from_millis(1_000));
    assert_eq!(timer.execute_step("confirm"), Outcome::StepTimedOut);
    assert_near(timer.last_elapsed_time(), 100, "confirm");

    assert_eq!(timer.execute_step("idle"), Outcome::Ok);
    assert_near(clock.now().wrapping_sub(loop_start), 2_000, "loop total");
}

#[test]
fn settle_holds_step_until_its_budget() {
    let clock = SystemClock::new();
    let mut timer = system_session(2_000, &clock);
    let event = AtomicEvent::new();
    timer.register_step(
        "settle",
        300,
        Some(Arc::new(event.clone())),
        Strategy::WaitEventThenSettle,
    );

    timer.start_loop();
    spawn_event_after(event, Duration::from_millis(100));
    assert_eq!(timer.execute_step("settle"), Outcome::Ok);
    assert_near(timer.last_elapsed_time(), 300, "settle");
}

#[test]
fn sleep_remaining_is_cut_short_by_loop_deadline() {
    let clock = SystemClock::new();
    let mut timer = system_session(100, &clock);
    timer.register_step("rest", 500, None, Strategy::SleepRemaining);

    timer.start_loop();
    let loop_start = timer.loop_start_time().expect("loop started");
    thread::sleep(Duration::from_millis(90));

    assert_eq!(timer.execute_step("rest"), Outcome::Ok);
    assert!(
        timer.last_elapsed_time() <= 10 + SLACK_MS,
        "slept {} ms",
        timer.last_elapsed_time()
    );
    assert_near(clock.now().wrapping_sub(loop_start), 100, "loop total");
}

#[test]
fn event_already_set_returns_immediately() {
    let clock = SystemClock::new();
    let mut timer = system_session(1_000, &clock);
    let event = AtomicEvent::new();
    event.set();
    timer.register_step("ready", 500, Some(Arc::new(event)), Strategy::WaitEvent);

    timer.start_loop();
    assert_eq!(timer.execute_step("ready"), Outcome::Ok);
    assert!(timer.last_elapsed_time() <= 5);
}
