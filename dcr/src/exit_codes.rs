//! Stable exit codes for `dcr` CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to an invalid workspace, config, graph or run state.
pub const INVALID: i32 = 1;
/// `dcr enabled` found no enabled event.
pub const NONE_ENABLED: i32 = 2;
/// `dcr execute` was asked to fire an event that is not enabled.
pub const NOT_ENABLED: i32 = 3;
