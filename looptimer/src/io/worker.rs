//! Simulated workers that raise a step's event from another thread.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::core::capability::EventFlag;
use crate::io::system::AtomicEvent;

/// Hands out the event a step waits on, armed to fire after a delay.
pub trait EventSource {
    /// Return a fresh event that becomes set `after_ms` from now.
    fn arm(&self, step_id: &str, after_ms: u32) -> Arc<dyn EventFlag>;
}

/// Raise `event` after `delay` on a detached thread.
pub fn spawn_event_after(event: AtomicEvent, delay: Duration) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        thread::sleep(delay);
        event.set();
    })
}

/// [`EventSource`] backed by one worker thread per armed event.
///
/// Workers are not joined; one that outlives its step just sets a flag
/// nobody polls anymore.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadWorkers;

impl EventSource for ThreadWorkers {
    fn arm(&self, step_id: &str, after_ms: u32) -> Arc<dyn EventFlag> {
        let event = AtomicEvent::new();
        debug!(step = step_id, after_ms, "worker started");
        spawn_event_after(event.clone(), Duration::from_millis(u64::from(after_ms)));
        Arc::new(event)
    }
}
