//! Diagnostic codes reported by the parser.

/// The document could not be read as YAML/JSON.
pub const UNREADABLE: &str = "P000";
/// The document root is not a mapping.
pub const NOT_A_MAPPING: &str = "P001";
/// A required field is missing or empty.
pub const MISSING_FIELD: &str = "P002";
/// The discriminator does not mark a workflow document.
pub const WRONG_KIND: &str = "P003";
/// A field has the wrong type.
pub const INVALID_FIELD: &str = "P004";
/// The workflow declares no steps.
pub const NO_STEPS: &str = "P005";
/// Two steps share an id.
pub const DUPLICATE_STEP: &str = "P006";
/// A transition names a step that does not exist.
pub const UNKNOWN_TARGET: &str = "P007";
/// A trigger is neither an event nor a schedule trigger.
pub const INVALID_TRIGGER: &str = "P008";

/// The workflow declares no triggers.
pub const NO_TRIGGERS: &str = "P100";
/// A field is not recognised and was ignored.
pub const UNKNOWN_FIELD: &str = "P101";
