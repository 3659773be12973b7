//! Host-side collaborators: OS capabilities, scenario config and workers.

pub mod config;
pub mod system;
pub mod worker;
