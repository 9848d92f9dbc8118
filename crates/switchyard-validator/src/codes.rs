//! Diagnostic codes reported by the validator.

/// The transition graph contains a cycle.
pub const CYCLE: &str = "V001";
/// A step cannot be reached from the entry step.
pub const UNREACHABLE_STEP: &str = "V002";
/// The same trigger is declared more than once.
pub const DUPLICATE_TRIGGER: &str = "V003";
/// A step sends success and failure to the same target.
pub const AMBIGUOUS_BRANCH: &str = "V004";
