//! Nested deadline budgets for cooperative polling loops.
//!
//! A loop iteration has a total time budget; each step inside it has its own
//! expected duration and a strategy for spending it (wait for an event, wait
//! then settle, or just sleep). No step may push the loop past its budget.
//!
//! - **[`core`]**: Budget checks and wait strategies. Pure logic over the
//!   [`Clock`](core::capability::Clock), [`Sleeper`](core::capability::Sleeper)
//!   and [`EventFlag`](core::capability::EventFlag) capabilities; no real time.
//! - **[`io`]**: Host implementations of those capabilities, scenario config,
//!   and simulated worker threads.
//!
//! [`session::TimerSession`] holds named steps and runs them against a shared
//! loop deadline; [`scenario`] drives a session from a TOML scenario for the CLI.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod scenario;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
