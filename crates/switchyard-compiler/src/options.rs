//! Compiler options.

use serde::{Deserialize, Serialize};

use crate::codes;

/// Name of the generated trigger registration function.
pub(crate) const REGISTER_TRIGGERS: &str = "register_triggers";

/// Items every generated module defines or imports.
const GENERATED_ITEMS: &[&str] = &[
  "WORKFLOW_ID",
  "WORKFLOW_VERSION",
  "ExecutionError",
  "Invocation",
  "WorkflowContext",
];

/// Items only present when trigger registration is emitted.
const TRIGGER_ITEMS: &[&str] = &[REGISTER_TRIGGERS, "TriggerRegistry"];

const KEYWORDS: &[&str] = &[
  "Self", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
  "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if",
  "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
  "ref", "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
  "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Options controlling code generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
  /// Name of the generated async entry function.
  pub entry_name: String,
  /// Generate a `register_triggers` function.
  pub emit_triggers: bool,
  /// Generate the "do not edit" header comment.
  pub emit_header: bool,
}

impl Default for CompileOptions {
  fn default() -> Self {
    Self {
      entry_name: "run".to_string(),
      emit_triggers: true,
      emit_header: true,
    }
  }
}

impl CompileOptions {
  /// Check that the options can produce a well-formed module.
  pub fn check(&self) -> Result<(), CompileOptionsError> {
    let name = &self.entry_name;
    if !is_identifier(name) {
      return Err(CompileOptionsError::InvalidIdentifier { name: name.clone() });
    }
    if KEYWORDS.contains(&name.as_str()) {
      return Err(CompileOptionsError::Keyword { name: name.clone() });
    }
    let collides = GENERATED_ITEMS.contains(&name.as_str())
      || (self.emit_triggers && TRIGGER_ITEMS.contains(&name.as_str()));
    if collides {
      return Err(CompileOptionsError::Collision { name: name.clone() });
    }
    Ok(())
  }
}

/// Problems with [`CompileOptions`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileOptionsError {
  #[error("entry name '{name}' is not a valid identifier")]
  InvalidIdentifier { name: String },

  #[error("entry name '{name}' is a reserved keyword")]
  Keyword { name: String },

  #[error("entry name '{name}' collides with a generated item")]
  Collision { name: String },
}

impl CompileOptionsError {
  /// Diagnostic code reported for this error.
  pub fn code(&self) -> &'static str {
    match self {
      Self::InvalidIdentifier { .. } | Self::Keyword { .. } => codes::INVALID_ENTRY_NAME,
      Self::Collision { .. } => codes::ENTRY_COLLISION,
    }
  }
}

fn is_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  let Some(first) = chars.next() else {
    return false;
  };
  if name == "_" || !(first == '_' || first.is_ascii_alphabetic()) {
    return false;
  }
  chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
