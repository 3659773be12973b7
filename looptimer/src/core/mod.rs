//! Budget arithmetic and wait strategies.
//!
//! Core modules never touch a real clock, sleep, or thread. Every side effect
//! goes through the capability traits in [`capability`], which keeps the logic
//! deterministic under a simulated clock.

pub mod budget;
pub mod capability;
pub mod strategy;
pub mod types;
