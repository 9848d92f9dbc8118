//! Diagnostics shared by the parser, validator and compiler.
//!
//! Every stage reports problems as values instead of failing: callers decide
//! whether warnings are acceptable. Any error-severity diagnostic makes the
//! stage's output unusable downstream.

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  Error,
  Warning,
}

impl std::fmt::Display for Severity {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Severity::Error => f.write_str("error"),
      Severity::Warning => f.write_str("warning"),
    }
  }
}

/// A single structured problem report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
  pub severity: Severity,
  /// Stable code, e.g. `P004` (parser), `V001` (validator), `C002` (compiler).
  pub code: String,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub step_id: Option<String>,
}

impl Diagnostic {
  pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      severity: Severity::Error,
      code: code.into(),
      message: message.into(),
      step_id: None,
    }
  }

  pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      severity: Severity::Warning,
      code: code.into(),
      message: message.into(),
      step_id: None,
    }
  }

  /// Attach the step this diagnostic is about.
  pub fn for_step(mut self, step_id: impl Into<String>) -> Self {
    self.step_id = Some(step_id.into());
    self
  }

  pub fn is_error(&self) -> bool {
    self.severity == Severity::Error
  }
}

impl std::fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
  }
}

/// An ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
  pub fn new() -> Self {
    Self(Vec::new())
  }

  pub fn push(&mut self, diagnostic: Diagnostic) {
    self.0.push(diagnostic);
  }

  pub fn extend(&mut self, other: Diagnostics) {
    self.0.extend(other.0);
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
    self.0.iter()
  }

  /// Error-severity diagnostics, in report order.
  pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
    self.0.iter().filter(|d| d.severity == Severity::Error)
  }

  /// Warning-severity diagnostics, in report order.
  pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
    self.0.iter().filter(|d| d.severity == Severity::Warning)
  }

  pub fn has_errors(&self) -> bool {
    self.0.iter().any(Diagnostic::is_error)
  }

  /// Error messages only.
  pub fn error_messages(&self) -> Vec<String> {
    self.errors().map(|d| d.message.clone()).collect()
  }

  /// Warning messages only.
  pub fn warning_messages(&self) -> Vec<String> {
    self.warnings().map(|d| d.message.clone()).collect()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn into_vec(self) -> Vec<Diagnostic> {
    self.0
  }
}

impl From<Vec<Diagnostic>> for Diagnostics {
  fn from(diagnostics: Vec<Diagnostic>) -> Self {
    Self(diagnostics)
  }
}

impl<'a> IntoIterator for &'a Diagnostics {
  type Item = &'a Diagnostic;
  type IntoIter = std::slice::Iter<'a, Diagnostic>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}
