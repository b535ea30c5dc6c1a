//! Stable exit codes for `elicit` commands.

/// Input accepted, session resolved, or spec check passed.
pub const OK: i32 = 0;
/// Invalid spec, config, input or any other error.
pub const INVALID: i32 = 1;
/// `elicit fixup` rejected the input; feedback was printed.
pub const REJECTED: i32 = 2;
/// `elicit ask` hit a provided value with no candidate options.
pub const REFUSED: i32 = 3;
