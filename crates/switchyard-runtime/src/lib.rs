//! Switchyard Runtime
//!
//! Executes compiled workflows. The pieces, outermost first:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ Runtime                                                     │
//! │  - registry of executables by name (last write wins)        │
//! │  - execute(name, event, config, proxy) -> ExecutionResult   │
//! │  - wall-clock timeout, panic capture, execution events      │
//! ├────────────────────────────────────────────────────────────┤
//! │ Executable                                                  │
//! │  - compiled `run` functions, closures, WorkflowMachine      │
//! ├────────────────────────────────────────────────────────────┤
//! │ WorkflowContext                                             │
//! │  - input rendering via minijinja                            │
//! │  - step outputs, last error, final output                   │
//! ├────────────────────────────────────────────────────────────┤
//! │ ServiceProxy                                                │
//! │  - resolves opaque action ids (`$.Orders.validate`)         │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timeouts stop the runtime from waiting, they do not stop the executable.
//! A timed-out executable keeps running on the tokio runtime and is told
//! about the timeout only through its invocation's cancellation token.

mod context;
mod error;
mod events;
mod executable;
mod machine;
mod proxy;
mod result;
mod runtime;
mod triggers;

pub use context::WorkflowContext;
pub use error::{ActionError, ExecutionError};
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use executable::{Executable, Invocation};
pub use machine::WorkflowMachine;
pub use proxy::{ActionHandler, EchoProxy, ServiceProxy, ServiceRegistry};
pub use result::{ExecutionFailure, ExecutionResult, ExecutionStatus};
pub use runtime::{Runtime, RuntimeConfig};
pub use triggers::{TriggerBinding, TriggerRegistry, TriggerTable};
