//! The callable unit the runtime registers and executes.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::ExecutionError;
use crate::proxy::ServiceProxy;

/// Everything an executable receives for one run.
#[derive(Clone)]
pub struct Invocation {
  /// Execution ID assigned by the runtime.
  pub execution_id: String,
  /// The triggering event payload.
  pub event: Value,
  /// Per-execution configuration.
  pub config: Value,
  /// Resolves action identifiers to behaviour.
  pub proxy: Arc<dyn ServiceProxy>,
  /// Cancelled by the runtime when it stops waiting. Observing it is
  /// optional.
  pub cancel: CancellationToken,
}

impl Invocation {
  /// Build an invocation outside the runtime, with a fresh execution id and
  /// cancellation token.
  pub fn new(event: Value, config: Value, proxy: Arc<dyn ServiceProxy>) -> Self {
    Self {
      execution_id: uuid::Uuid::new_v4().to_string(),
      event,
      config,
      proxy,
      cancel: CancellationToken::new(),
    }
  }
}

/// A registered workflow implementation.
///
/// Implemented for plain async functions and closures taking an
/// [`Invocation`], so a compiled workflow's `run` function registers directly.
#[async_trait]
pub trait Executable: Send + Sync + 'static {
  async fn execute(&self, invocation: Invocation) -> Result<Value, ExecutionError>;
}

#[async_trait]
impl<F, Fut> Executable for F
where
  F: Fn(Invocation) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Value, ExecutionError>> + Send + 'static,
{
  async fn execute(&self, invocation: Invocation) -> Result<Value, ExecutionError> {
    (self)(invocation).await
  }
}
