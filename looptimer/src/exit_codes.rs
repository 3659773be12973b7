//! Stable exit codes for `looptimer` CLI commands.

/// Command succeeded; for `run`, every step finished within its budget.
pub const OK: i32 = 0;
/// Invalid scenario config or other error.
pub const INVALID: i32 = 1;
/// `looptimer run`: at least one step hit its own budget, the loop stayed within budget.
pub const STEP_TIMED_OUT: i32 = 2;
/// `looptimer run`: the loop budget ran out.
pub const LOOP_TIMED_OUT: i32 = 3;
