//! Service proxies resolve opaque action identifiers to behaviour.
//!
//! Workflows name actions with namespaced strings such as
//! `$.Orders.validate`. The runtime never interprets them: it hands the
//! identifier and the rendered input to the [`ServiceProxy`] passed to
//! `execute`. [`ServiceRegistry`] is the stock proxy, a map from identifier
//! to a typed [`ActionHandler`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ActionError;

/// Dispatches an action identifier plus JSON input to an implementation.
#[async_trait]
pub trait ServiceProxy: Send + Sync {
  async fn call(&self, action: &str, input: Value) -> Result<Value, ActionError>;
}

/// A strongly-typed action implementation.
///
/// Input is decoded from the rendered step input, output is encoded back to
/// JSON and recorded as the step's output.
#[async_trait]
pub trait ActionHandler: Send + Sync + 'static {
  type Input: DeserializeOwned + Send;
  type Output: Serialize + Send;

  async fn handle(&self, input: Self::Input) -> Result<Self::Output, ActionError>;
}

/// Object-safe view over any [`ActionHandler`].
#[async_trait]
trait ErasedHandler: Send + Sync {
  async fn call(&self, action: &str, input: Value) -> Result<Value, ActionError>;
}

#[async_trait]
impl<H: ActionHandler> ErasedHandler for H {
  async fn call(&self, action: &str, input: Value) -> Result<Value, ActionError> {
    let input: H::Input =
      serde_json::from_value(input).map_err(|source| ActionError::InvalidInput {
        action: action.to_string(),
        source,
      })?;
    let output = self.handle(input).await?;
    serde_json::to_value(output)
      .map_err(|e| ActionError::failed(action, format!("output is not serializable: {}", e)))
  }
}

/// Adapts an untyped async closure into an [`ActionHandler`].
struct FnHandler<F> {
  f: F,
}

#[async_trait]
impl<F> ActionHandler for FnHandler<F>
where
  F: Fn(Value) -> BoxFuture<'static, Result<Value, ActionError>> + Send + Sync + 'static,
{
  type Input = Value;
  type Output = Value;

  async fn handle(&self, input: Value) -> Result<Value, ActionError> {
    (self.f)(input).await
  }
}

/// A [`ServiceProxy`] backed by a map of registered handlers.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
  handlers: HashMap<String, Arc<dyn ErasedHandler>>,
}

impl ServiceRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a typed handler. Re-registering an action replaces it.
  pub fn register<H: ActionHandler>(&mut self, action: impl Into<String>, handler: H) {
    self.handlers.insert(action.into(), Arc::new(handler));
  }

  /// Register an untyped async closure over JSON values.
  pub fn register_fn<F, Fut>(&mut self, action: impl Into<String>, f: F)
  where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ActionError>> + Send + 'static,
  {
    let handler = FnHandler {
      f: move |input: Value| -> BoxFuture<'static, Result<Value, ActionError>> {
        Box::pin(f(input))
      },
    };
    self.register(action, handler);
  }

  pub fn contains(&self, action: &str) -> bool {
    self.handlers.contains_key(action)
  }

  /// Registered action identifiers, sorted.
  pub fn actions(&self) -> Vec<String> {
    let mut actions: Vec<String> = self.handlers.keys().cloned().collect();
    actions.sort();
    actions
  }
}

#[async_trait]
impl ServiceProxy for ServiceRegistry {
  async fn call(&self, action: &str, input: Value) -> Result<Value, ActionError> {
    let handler = self
      .handlers
      .get(action)
      .ok_or_else(|| ActionError::UnknownAction {
        action: action.to_string(),
      })?;
    handler.call(action, input).await
  }
}

/// A proxy that answers every action with its own input.
///
/// Used by `switchyard run` to dry-run a workflow without real services.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoProxy;

#[async_trait]
impl ServiceProxy for EchoProxy {
  async fn call(&self, _action: &str, input: Value) -> Result<Value, ActionError> {
    Ok(input)
  }
}
