//! Pure building blocks (no I/O): shared types, graph algorithms and
//! step selection.

pub mod candidates;
pub mod graph;
pub mod invariants;
pub mod readiness;
pub mod selector;
pub mod types;
