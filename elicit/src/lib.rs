//! Dependency-aware parameter resolution.
//!
//! A set of named fields, each declaring which other fields it `requires`
//! (hard dependencies) and which it is `influenced_by` (soft dependencies),
//! is resolved into one domain object in two modes:
//!
//! - **[`fixup`]**: batch validation of loose input into either an accepted
//!   value or per-field feedback (allowed options, refusal reasons, unmet
//!   dependencies).
//! - **[`step`] / [`looping`]**: interactive elicitation, one field action per
//!   step, driven by an [`io::asker::Asker`] and an [`io::specifier::Specifier`].
//!
//! The field spec registry lives in [`spec`]. Pure graph and selection logic
//! is in [`core`]; collaborators with side effects are in [`io`]. [`airline`]
//! is a complete example spec used by the CLI.

pub mod airline;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod fixup;
pub mod io;
pub mod logging;
pub mod looping;
pub mod spec;
pub mod step;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
