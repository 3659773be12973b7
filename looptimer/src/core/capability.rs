//! Host-supplied capabilities the timer core runs against.
//!
//! The core never reads a clock, sleeps, or inspects shared state on its own.
//! Everything goes through these three traits so the same budget logic runs on
//! a real monotonic clock, a simulated clock in tests, or an embedded tick
//! counter.

/// Monotonic millisecond counter.
///
/// Values are `u32` and wrap; callers subtract with `wrapping_sub`, which
/// stays correct for sessions far shorter than the ~49 day rollover.
pub trait Clock {
    fn now(&self) -> u32;
}

/// Blocks the calling context for at least `duration_ms`.
pub trait Sleeper {
    fn sleep(&self, duration_ms: u32);
}

/// Non-blocking poll of an external condition.
///
/// Visibility of the underlying flag across threads is the implementor's job.
pub trait EventFlag {
    fn is_set(&self) -> bool;
}

impl<F: Fn() -> u32> Clock for F {
    fn now(&self) -> u32 {
        self()
    }
}

impl<F: Fn(u32)> Sleeper for F {
    fn sleep(&self, duration_ms: u32) {
        self(duration_ms);
    }
}

impl<F: Fn() -> bool> EventFlag for F {
    fn is_set(&self) -> bool {
        self()
    }
}
