//! Switchyard Validator
//!
//! Semantic checks over a parsed [`WorkflowDefinition`] that structural
//! parsing cannot make on its own:
//!
//! - cycles in the step transition graph (errors)
//! - steps unreachable from the entry step (warnings)
//! - duplicate triggers and branches that cannot tell success from failure
//!   (warnings)
//!
//! The validator assumes its input came from `switchyard-parser` and does not
//! repeat the parser's checks (unique ids, existing transition targets).

pub mod codes;
mod cycles;
mod validator;

use serde::{Deserialize, Serialize};
use switchyard_definition::Diagnostics;

pub use cycles::find_cycles;
pub use validator::validate;

#[cfg(doc)]
use switchyard_definition::WorkflowDefinition;

/// Output of [`validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
  /// False if any error-severity diagnostic was reported.
  pub valid: bool,
  pub diagnostics: Diagnostics,
}

impl ValidationResult {
  pub fn errors(&self) -> Vec<String> {
    self.diagnostics.error_messages()
  }

  pub fn warnings(&self) -> Vec<String> {
    self.diagnostics.warning_messages()
  }
}
