//! Stderr tracing for sessions and scenario runs.
//!
//! Levels used by the crate:
//! - `warn`: a step timed out, a step id is unknown, a step ran before
//!   `start_loop`, or a scenario abandoned its loop.
//! - `info`: a step finished within budget, a loop finished.
//! - `debug`: loop start, step registration and dispatch, worker threads
//!   arming events.
//!
//! The `looptimer run` report goes to stdout and is independent of this filter.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "warn";

/// Install a compact stderr subscriber filtered by `RUST_LOG`.
///
/// Timeouts stay visible without any configuration; set
/// `RUST_LOG=looptimer=debug` to follow every poll loop dispatch.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}
