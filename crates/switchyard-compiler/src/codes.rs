//! Diagnostic codes reported by the compiler.

/// `entry_name` is not a usable Rust identifier.
pub const INVALID_ENTRY_NAME: &str = "C001";
/// `entry_name` collides with an item the generated module defines.
pub const ENTRY_COLLISION: &str = "C002";
/// The definition has no steps to dispatch.
pub const NO_STEPS: &str = "C003";
/// A transition names a step that does not exist.
pub const UNKNOWN_TARGET: &str = "C004";
/// Two steps share an id.
pub const DUPLICATE_STEP: &str = "C005";
/// Trigger registration is emitted for a workflow without triggers.
pub const NO_TRIGGERS: &str = "C100";
