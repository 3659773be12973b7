//! Capabilities backed by the host OS: monotonic clock, thread sleep and an
//! atomic flag that another thread can raise.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::core::capability::{Clock, EventFlag, Sleeper};

/// Milliseconds since the clock was created, truncated to `u32`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> u32 {
        // Truncation is the wraparound the timer arithmetic expects.
        self.origin.elapsed().as_millis() as u32
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration_ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(duration_ms)));
    }
}

/// Shared boolean flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct AtomicEvent {
    flag: Arc<AtomicBool>,
}

impl AtomicEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

impl EventFlag for AtomicEvent {
    fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
