//! Side-effecting collaborators: askers, specifiers, prompts and config files.

pub mod asker;
pub mod config;
pub mod prompt;
pub mod specifier;
