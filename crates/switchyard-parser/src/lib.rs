//! Switchyard Parser
//!
//! Converts a textual workflow document (YAML, or JSON as a YAML subset) into
//! a [`WorkflowDefinition`] and a list of structural diagnostics.
//!
//! Parsing never fails: a malformed document still produces a (possibly
//! partial) definition together with error diagnostics, and the caller
//! decides whether to continue.
//!
//! The parser checks structure only: required fields, unique step ids and
//! transitions that name existing steps. Whole-graph analysis such as cycle
//! detection belongs to `switchyard-validator`.
//!
//! # Usage
//!
//! ```ignore
//! let result = switchyard_parser::parse(&document);
//! for diagnostic in &result.diagnostics {
//!   eprintln!("{}", diagnostic);
//! }
//! if result.is_valid() {
//!   // hand result.workflow to the validator
//! }
//! ```

pub mod codes;
mod parser;

use serde::{Deserialize, Serialize};
use switchyard_definition::{Diagnostics, WorkflowDefinition};

pub use parser::parse;

/// Output of [`parse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
  pub workflow: WorkflowDefinition,
  pub diagnostics: Diagnostics,
}

impl ParseResult {
  /// Error messages, in report order.
  pub fn errors(&self) -> Vec<String> {
    self.diagnostics.error_messages()
  }

  /// Warning messages, in report order.
  pub fn warnings(&self) -> Vec<String> {
    self.diagnostics.warning_messages()
  }

  /// True if no error-severity diagnostic was reported.
  pub fn is_valid(&self) -> bool {
    !self.diagnostics.has_errors()
  }
}
