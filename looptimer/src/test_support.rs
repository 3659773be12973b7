//! Test-only capabilities driven by a simulated millisecond clock.
//!
//! Nothing here reads real time. Sleeping and polling advance the shared
//! [`SimClock`], so strategy results are exact and tests run instantly.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::capability::{Clock, EventFlag, Sleeper};
use crate::io::worker::EventSource;

/// Manually advanced clock. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: Arc<AtomicU32>,
}

impl SimClock {
    /// Create a clock reading `start_ms`.
    pub fn at(start_ms: u32) -> Self {
        Self {
            now: Arc::new(AtomicU32::new(start_ms)),
        }
    }

    /// Move time forward by `ms`, wrapping like a hardware tick counter.
    pub fn advance(&self, ms: u32) {
        let next = self.now.load(Ordering::SeqCst).wrapping_add(ms);
        self.now.store(next, Ordering::SeqCst);
    }
}

impl Clock for SimClock {
    fn now(&self) -> u32 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Sleeper that advances a [`SimClock`] and records every requested duration.
#[derive(Debug, Clone)]
pub struct SimSleeper {
    clock: SimClock,
    sleeps: Arc<Mutex<Vec<u32>>>,
}

impl SimSleeper {
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Durations passed to `sleep`, in call order.
    pub fn sleeps(&self) -> Vec<u32> {
        self.sleeps.lock().expect("sleep log lock").clone()
    }
}

impl Sleeper for SimSleeper {
    fn sleep(&self, duration_ms: u32) {
        self.sleeps
            .lock()
            .expect("sleep log lock")
            .push(duration_ms);
        self.clock.advance(duration_ms);
    }
}

/// Event that becomes set once the simulated clock reaches `fires_at`.
///
/// The deadline is kept relative to the clock reading at construction, so it
/// still fires when the counter wraps. Each poll costs `poll_cost_ms`
/// (default 1 ms) of simulated time, so spin loops make progress without a
/// second thread.
#[derive(Debug, Clone)]
pub struct ScriptedEvent {
    clock: SimClock,
    armed_at: u32,
    delay_ms: Option<u32>,
    poll_cost_ms: u32,
    polls: Arc<AtomicU32>,
}

impl ScriptedEvent {
    pub fn fires_at(clock: &SimClock, at_ms: u32) -> Self {
        Self::build(clock, Some(at_ms))
    }

    pub fn never(clock: &SimClock) -> Self {
        Self::build(clock, None)
    }

    pub fn with_poll_cost(mut self, poll_cost_ms: u32) -> Self {
        self.poll_cost_ms = poll_cost_ms;
        self
    }

    /// Number of times `is_set` was called.
    pub fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    fn build(clock: &SimClock, fires_at: Option<u32>) -> Self {
        let armed_at = clock.now();
        Self {
            clock: clock.clone(),
            armed_at,
            delay_ms: fires_at.map(|at| at.wrapping_sub(armed_at)),
            poll_cost_ms: 1,
            polls: Arc::new(AtomicU32::new(0)),
        }
    }
}

impl EventFlag for ScriptedEvent {
    fn is_set(&self) -> bool {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.clock.advance(self.poll_cost_ms);
        let waited = self.clock.now().wrapping_sub(self.armed_at);
        self.delay_ms.is_some_and(|delay| waited >= delay)
    }
}

/// [`EventSource`] that arms [`ScriptedEvent`]s on a shared [`SimClock`].
#[derive(Debug, Clone)]
pub struct ScriptedEvents {
    clock: SimClock,
}

impl ScriptedEvents {
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
        }
    }
}

impl EventSource for ScriptedEvents {
    fn arm(&self, _step_id: &str, after_ms: u32) -> Arc<dyn EventFlag> {
        let at = self.clock.now().wrapping_add(after_ms);
        Arc::new(ScriptedEvent::fires_at(&self.clock, at))
    }
}
