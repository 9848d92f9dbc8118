// Generated by switchyard-compiler from workflow "refund" version "2".
// Do not edit by hand.

use switchyard_runtime::{ExecutionError, Invocation, TriggerRegistry, WorkflowContext};

pub const WORKFLOW_ID: &str = "refund";
pub const WORKFLOW_VERSION: &str = "2";

pub fn register_triggers(registry: &mut dyn TriggerRegistry) {
    registry.on_event(WORKFLOW_ID, "refund.requested");
}

pub async fn run(invocation: Invocation) -> Result<serde_json::Value, ExecutionError> {
    let mut ctx = WorkflowContext::new(WORKFLOW_ID, invocation);
    let mut current: Option<&'static str> = Some("check");

    while let Some(step) = current {
        current = match step {
            "check" => match ctx.invoke_json("check", "$.Refunds.check", "{\"orderId\":\"{{ event.orderId }}\"}").await {
                Ok(_) => Some("pay"),
                Err(_) => Some("reject"),
            },
            "pay" => match ctx.invoke_json("pay", "$.Payments.refund", "{\"amount\":\"{{ steps.check.amount }}\",\"reason\":\"customer request\"}").await {
                Ok(_) => None,
                Err(err) => return Err(err),
            },
            "reject" => match ctx.invoke_json("reject", "$.Email.send", "{\"template\":\"refund-rejected\"}").await {
                Ok(_) => None,
                Err(err) => return Err(err),
            },
            other => {
                return Err(ExecutionError::UnknownStep {
                    step_id: other.to_string(),
                });
            }
        };
    }

    Ok(ctx.into_output())
}
