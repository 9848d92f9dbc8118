//! Switchyard Definition
//!
//! This crate contains the typed, in-memory representation of a Switchyard
//! workflow: its triggers, its steps and the success/error transitions
//! between them. It has no behaviour beyond inspection helpers.
//!
//! Definitions are produced by `switchyard-parser`, checked by
//! `switchyard-validator` and lowered by `switchyard-compiler`. None of those
//! stages mutate a definition once it has been parsed.
//!
//! The [`Diagnostic`] types shared by every stage also live here so that the
//! parser, validator and compiler report problems the same way.

mod diagnostic;
mod graph;
mod input;
mod step;
mod trigger;
mod workflow;

pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use graph::{Transition, TransitionGraph};
pub use input::InputValue;
pub use step::Step;
pub use trigger::Trigger;
pub use workflow::{WORKFLOW_KIND, WorkflowDefinition};
