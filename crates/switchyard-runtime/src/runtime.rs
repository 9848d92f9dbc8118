//! Workflow runtime.
//!
//! The [`Runtime`] is a long-lived registry of executables keyed by name.
//! `execute(name, event, config, proxy)` runs one of them with a fresh
//! execution id and folds every outcome, including panics and timeouts, into
//! an [`ExecutionResult`].

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ExecutionError;
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::executable::{Executable, Invocation};
use crate::proxy::ServiceProxy;
use crate::result::ExecutionResult;

/// Configuration for the runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
  /// Default wall-clock limit per execution. `None` waits indefinitely.
  #[serde(default)]
  pub timeout_ms: Option<u64>,
}

#[derive(Clone)]
struct Registration {
  executable: Arc<dyn Executable>,
  /// Overrides [`RuntimeConfig::timeout_ms`] when set.
  timeout_ms: Option<u64>,
}

/// Registry and executor for workflow executables.
///
/// Registration takes `&self` so a runtime can be shared behind an `Arc`
/// while executions are in flight. An execution resolves its executable once,
/// when `execute` is called; later registrations do not affect it.
pub struct Runtime {
  registry: RwLock<HashMap<String, Registration>>,
  config: RuntimeConfig,
  notifier: Arc<dyn ExecutionNotifier>,
}

impl Runtime {
  pub fn new(config: RuntimeConfig) -> Self {
    Self {
      registry: RwLock::new(HashMap::new()),
      config,
      notifier: Arc::new(NoopNotifier),
    }
  }

  /// Replace the notifier that receives execution events.
  pub fn with_notifier(mut self, notifier: impl ExecutionNotifier + 'static) -> Self {
    self.notifier = Arc::new(notifier);
    self
  }

  pub fn config(&self) -> &RuntimeConfig {
    &self.config
  }

  /// Register an executable under `name`. The last registration wins.
  pub fn register(&self, name: impl Into<String>, executable: impl Executable) {
    self.insert(name.into(), Arc::new(executable), None);
  }

  /// Register with a timeout that overrides the runtime default.
  pub fn register_with_timeout(
    &self,
    name: impl Into<String>,
    executable: impl Executable,
    timeout_ms: u64,
  ) {
    self.insert(name.into(), Arc::new(executable), Some(timeout_ms));
  }

  /// Remove a registration. Returns whether one existed.
  pub fn unregister(&self, name: &str) -> bool {
    let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
    registry.remove(name).is_some()
  }

  pub fn is_registered(&self, name: &str) -> bool {
    let registry = self.registry.read().unwrap_or_else(|e| e.into_inner());
    registry.contains_key(name)
  }

  /// Registered names, sorted.
  pub fn names(&self) -> Vec<String> {
    let registry = self.registry.read().unwrap_or_else(|e| e.into_inner());
    let mut names: Vec<String> = registry.keys().cloned().collect();
    names.sort();
    names
  }

  fn insert(&self, name: String, executable: Arc<dyn Executable>, timeout_ms: Option<u64>) {
    let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
    if registry
      .insert(
        name.clone(),
        Registration {
          executable,
          timeout_ms,
        },
      )
      .is_some()
    {
      info!(workflow = %name, "executable_replaced");
    } else {
      info!(workflow = %name, "executable_registered");
    }
  }

  fn lookup(&self, name: &str) -> Option<Registration> {
    let registry = self.registry.read().unwrap_or_else(|e| e.into_inner());
    registry.get(name).cloned()
  }

  /// Execute a registered workflow against an event.
  ///
  /// Never panics and never returns an error: an unregistered name, a failing
  /// or panicking executable and a timeout all produce a failed result.
  ///
  /// On timeout the executable is not stopped. It keeps running on the tokio
  /// runtime; its invocation's cancellation token is cancelled and its
  /// eventual outcome is discarded.
  #[instrument(
    name = "runtime_execute",
    skip(self, event, config, proxy),
    fields(workflow = %name)
  )]
  pub async fn execute(
    &self,
    name: &str,
    event: Value,
    config: Value,
    proxy: Arc<dyn ServiceProxy>,
  ) -> ExecutionResult {
    let execution_id = uuid::Uuid::new_v4().to_string();
    let started = Instant::now();

    let Some(registration) = self.lookup(name) else {
      let err = ExecutionError::NotRegistered {
        name: name.to_string(),
      };
      warn!(execution_id = %execution_id, "workflow_not_registered");
      self.notifier.notify(ExecutionEvent::ExecutionFailed {
        execution_id: execution_id.clone(),
        workflow: name.to_string(),
        error: err.to_string(),
      });
      return ExecutionResult::failed(execution_id, started.elapsed(), &err);
    };

    info!(execution_id = %execution_id, workflow = %name, "execution_started");
    debug!(execution_id = %execution_id, event = %event, "execution_payload");
    self.notifier.notify(ExecutionEvent::ExecutionStarted {
      execution_id: execution_id.clone(),
      workflow: name.to_string(),
    });

    let cancel = CancellationToken::new();
    let invocation = Invocation {
      execution_id: execution_id.clone(),
      event,
      config,
      proxy,
      cancel: cancel.clone(),
    };

    let executable = registration.executable;
    let handle = tokio::spawn(async move { executable.execute(invocation).await });

    let timeout_ms = registration.timeout_ms.or(self.config.timeout_ms);
    let outcome = match timeout_ms {
      Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), handle).await {
        Ok(joined) => settle(joined),
        Err(_) => {
          // Dropping the handle detaches the task; it runs to completion.
          cancel.cancel();
          Err(ExecutionError::Timeout { timeout_ms: ms })
        }
      },
      None => settle(handle.await),
    };

    let duration = started.elapsed();
    match outcome {
      Ok(output) => {
        let result = ExecutionResult::succeeded(execution_id.clone(), duration, output);
        info!(
          execution_id = %execution_id,
          duration_ms = result.duration_ms,
          "execution_succeeded"
        );
        self.notifier.notify(ExecutionEvent::ExecutionSucceeded {
          execution_id,
          workflow: name.to_string(),
          duration_ms: result.duration_ms,
        });
        result
      }
      Err(err) => {
        let result = ExecutionResult::failed(execution_id.clone(), duration, &err);
        if let ExecutionError::Timeout { timeout_ms } = err {
          warn!(execution_id = %execution_id, timeout_ms, "execution_timed_out");
          self.notifier.notify(ExecutionEvent::ExecutionTimedOut {
            execution_id,
            workflow: name.to_string(),
            timeout_ms,
          });
        } else {
          error!(execution_id = %execution_id, error = %err, "execution_failed");
          self.notifier.notify(ExecutionEvent::ExecutionFailed {
            execution_id,
            workflow: name.to_string(),
            error: err.to_string(),
          });
        }
        result
      }
    }
  }
}

impl Default for Runtime {
  fn default() -> Self {
    Self::new(RuntimeConfig::default())
  }
}

/// Flatten a joined task into the executable's own result.
fn settle(joined: Result<Result<Value, ExecutionError>, JoinError>) -> Result<Value, ExecutionError> {
  match joined {
    Ok(result) => result,
    Err(e) if e.is_panic() => Err(ExecutionError::Panicked {
      message: panic_message(e.into_panic()),
    }),
    Err(_) => Err(ExecutionError::Cancelled),
  }
}

fn panic_message(payload: Box<dyn Any + Send + 'static>) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    message.to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "unknown panic payload".to_string()
  }
}
