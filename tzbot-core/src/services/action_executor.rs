// File: tzbot-core/src/services/action_executor.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use tzbot_common::models::{ChatMessage, MessageRef, ModerationAction};
use tzbot_common::traits::ChatGateway;

pub fn warning_text(allowed: &[String]) -> String {
    format!("⚠️ Only these are allowed: {}", allowed.join(", "))
}

/// What the executor did on the platform for one action.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub sent: Vec<MessageRef>,
    pub deleted: Vec<MessageRef>,
    /// Task that removes the restriction warning once the delay elapses.
    pub warning_cleanup: Option<JoinHandle<()>>,
}

/// Carries out pipeline actions against a `ChatGateway`. Delete failures are
/// logged and swallowed; send failures are logged as errors. Nothing here
/// returns an error to the caller.
pub struct ActionExecutor {
    gateway: Arc<dyn ChatGateway>,
    warning_delay: Duration,
}

impl ActionExecutor {
    pub fn new(gateway: Arc<dyn ChatGateway>, warning_delay: Duration) -> Self {
        Self { gateway, warning_delay }
    }

    pub async fn send(&self, channel_id: &str, text: &str, report: &mut ExecutionReport) {
        match self.gateway.send_message(channel_id, text).await {
            Ok(sent) => report.sent.push(sent),
            Err(e) => error!(channel = %channel_id, "failed to send message: {e}"),
        }
    }

    pub async fn execute(&self, message: &ChatMessage, action: &ModerationAction) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        match action {
            ModerationAction::Ignore | ModerationAction::Allow => {}
            ModerationAction::InvokeCommand(inv) => {
                debug!(command = %inv.name, "command actions are run by the command handlers");
            }
            ModerationAction::SendCustomResponse(response) => {
                self.send(&message.channel_id, response, &mut report).await;
            }
            ModerationAction::DeleteAndWarn(allowed) => {
                self.delete_and_warn(message, allowed, &mut report).await;
            }
        }
        report
    }

    async fn delete_and_warn(&self, message: &ChatMessage, allowed: &[String], report: &mut ExecutionReport) {
        let original = message.message_ref();
        if let Err(e) = self.gateway.delete_message(&original).await {
            warn!(
                channel = %message.channel_id,
                message = %message.message_id,
                "could not delete disallowed message; skipping warning: {e}"
            );
            return;
        }
        report.deleted.push(original);

        let warning = match self.gateway.send_message(&message.channel_id, &warning_text(allowed)).await {
            Ok(w) => w,
            Err(e) => {
                error!(channel = %message.channel_id, "failed to send restriction warning: {e}");
                return;
            }
        };
        report.sent.push(warning.clone());

        let gateway = Arc::clone(&self.gateway);
        let delay = self.warning_delay;
        report.warning_cleanup = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = gateway.delete_message(&warning).await {
                debug!(message = %warning.message_id, "warning already gone or not deletable: {e}");
            }
        }));
    }
}
