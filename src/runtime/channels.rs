//! Channel-backed confirmation dialog
//!
//! Lets a UI running elsewhere (a TUI task, a websocket session) answer
//! permission prompts:
//! - **Request channel** (mpsc): the manager side sends `PendingConfirmation`s
//! - **Responder** (oneshot): one per request, carries the user's answer back

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::core::CancelSignal;
use crate::permissions::{Dialog, DialogRequest, DialogResponse};
use crate::tools::{ToolAnnotations, ToolCall};

/// Default buffer size for the request channel
pub const CONFIRMATION_CHANNEL_SIZE: usize = 32;

/// Sender half of the request channel (used by `ChannelDialog`)
pub type ConfirmationSender = mpsc::Sender<PendingConfirmation>;

/// Receiver half of the request channel (used by the UI)
pub type ConfirmationReceiver = mpsc::Receiver<PendingConfirmation>;

/// A permission prompt waiting for the user
#[derive(Debug)]
pub struct PendingConfirmation {
    pub id: Uuid,
    pub requested_at: DateTime<Utc>,
    pub title: String,
    pub message: String,
    pub tool_name: String,
    pub annotations: ToolAnnotations,
    pub call: ToolCall,
    responder: oneshot::Sender<DialogResponse>,
}

impl PendingConfirmation {
    /// Send the user's answer
    ///
    /// Returns false if the evaluation stopped waiting (cancelled or dropped).
    pub fn respond(self, response: DialogResponse) -> bool {
        let id = self.id;
        let delivered = self.responder.send(response).is_ok();
        if !delivered {
            tracing::debug!("[Confirmation] {} answered after the evaluation ended", id);
        }
        delivered
    }

    pub fn allow(self) -> bool {
        self.respond(DialogResponse::allow())
    }

    pub fn deny(self) -> bool {
        self.respond(DialogResponse::deny())
    }

    pub fn allow_session(self) -> bool {
        self.respond(DialogResponse::allow_session())
    }

    pub fn feedback(self, text: impl Into<String>) -> bool {
        self.respond(DialogResponse::feedback(text))
    }

    /// Whether the evaluation has stopped waiting for this prompt
    ///
    /// A UI should skip closed prompts instead of showing them.
    pub fn is_closed(&self) -> bool {
        self.responder.is_closed()
    }
}

/// `Dialog` that forwards prompts over a channel
///
/// Cancellation is honoured while queueing and while waiting: a cancelled
/// evaluation never enqueues a prompt, and a prompt already queued reports
/// `is_closed()` once the evaluation gives up.
#[derive(Debug, Clone)]
pub struct ChannelDialog {
    tx: ConfirmationSender,
}

impl ChannelDialog {
    pub fn new(tx: ConfirmationSender) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Dialog for ChannelDialog {
    async fn show(
        &self,
        cancel: &CancelSignal,
        request: DialogRequest<'_>,
    ) -> anyhow::Result<DialogResponse> {
        if cancel.is_cancelled() {
            return Ok(DialogResponse::canceled());
        }

        let (responder, response) = oneshot::channel();
        let id = Uuid::new_v4();

        let pending = PendingConfirmation {
            id,
            requested_at: Utc::now(),
            title: request.title,
            message: request.message,
            tool_name: request.tool.name().to_string(),
            annotations: request.tool.annotations(),
            call: request.call.clone(),
            responder,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(DialogResponse::canceled()),
            sent = self.tx.send(pending) => {
                sent.map_err(|_| anyhow::anyhow!("Confirmation receiver closed"))?;
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("[Confirmation] {} cancelled before an answer", id);
                Ok(DialogResponse::canceled())
            }
            answer = response => answer
                .map_err(|_| anyhow::anyhow!("Confirmation {} dropped without a response", id)),
        }
    }
}

/// Create a confirmation channel
///
/// Returns the dialog to hand to a `PermissionManager` and the receiver the
/// UI reads prompts from.
pub fn confirmation_channel() -> (ChannelDialog, ConfirmationReceiver) {
    let (tx, rx) = mpsc::channel(CONFIRMATION_CHANNEL_SIZE);
    (ChannelDialog::new(tx), rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PermissionError;
    use crate::permissions::{PermissionConfig, PermissionManager, Rule};
    use crate::tools::NamedTool;
    use std::sync::Arc;
    use std::time::Duration;

    fn manager(dialog: ChannelDialog) -> Arc<PermissionManager> {
        let config = PermissionConfig::default().with_rule(Rule::ask("Bash", "Run this command?"));
        Arc::new(PermissionManager::with_dialog(config, dialog))
    }

    fn spawn_evaluation(
        manager: &Arc<PermissionManager>,
        cancel: &CancelSignal,
    ) -> tokio::task::JoinHandle<Result<(), PermissionError>> {
        let manager = Arc::clone(manager);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let bash = NamedTool::new("Bash");
            let call = ToolCall::new("toolu_1", "Bash", r#"{"command":"make"}"#);
            manager.evaluate_tool_use(&cancel, &bash, &call).await
        })
    }

    #[tokio::test]
    async fn test_request_reaches_ui_and_response_returns() {
        let (dialog, mut rx) = confirmation_channel();
        let manager = manager(dialog);
        let task = spawn_evaluation(&manager, &CancelSignal::new());

        let pending = rx.recv().await.unwrap();
        assert_eq!(pending.title, "Bash");
        assert_eq!(pending.message, "Run this command?");
        assert_eq!(pending.tool_name, "Bash");
        assert_eq!(pending.call.id, "toolu_1");
        assert!(pending.requested_at <= Utc::now());

        assert!(pending.allow_session());
        assert!(task.await.unwrap().is_ok());
        assert!(manager.is_session_allowed("bash"));
    }

    #[tokio::test]
    async fn test_feedback_response() {
        let (dialog, mut rx) = confirmation_channel();
        let task = spawn_evaluation(&manager(dialog), &CancelSignal::new());

        rx.recv().await.unwrap().feedback("run make check instead");
        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err.feedback(), Some("run make check instead"));
    }

    #[tokio::test]
    async fn test_dropped_responder_is_an_error() {
        let (dialog, mut rx) = confirmation_channel();
        let task = spawn_evaluation(&manager(dialog), &CancelSignal::new());

        drop(rx.recv().await.unwrap());
        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, PermissionError::Dialog(_)));
        assert!(err.to_string().contains("dropped without a response"));
    }

    #[tokio::test]
    async fn test_closed_receiver_is_an_error() {
        let (dialog, rx) = confirmation_channel();
        drop(rx);

        let err = spawn_evaluation(&manager(dialog), &CancelSignal::new())
            .await
            .unwrap()
            .unwrap_err();
        assert!(err.to_string().contains("receiver closed"));
    }

    #[tokio::test]
    async fn test_cancel_while_waiting() {
        let (dialog, mut rx) = confirmation_channel();
        let cancel = CancelSignal::new();
        let task = spawn_evaluation(&manager(dialog), &cancel);

        let pending = rx.recv().await.unwrap();
        cancel.cancel("session closed");

        let result = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(PermissionError::Cancelled(_))));

        // The evaluation is gone, so the late answer goes nowhere
        assert!(pending.is_closed());
        assert!(!pending.allow());
    }

    #[tokio::test]
    async fn test_cancelled_signal_queues_nothing() {
        let (dialog, mut rx) = confirmation_channel();
        let cancel = CancelSignal::new();
        cancel.cancel("session closed");

        let bash = NamedTool::new("Bash");
        let call = ToolCall::new("toolu_2", "Bash", r#"{"command":"make"}"#);
        let response = dialog
            .show(&cancel, DialogRequest::confirmation(&bash, &call, "Run?"))
            .await
            .unwrap();

        assert!(response.canceled);
        assert!(!response.confirmed);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_closes_queued_prompt() {
        let (dialog, mut rx) = confirmation_channel();
        let cancel = CancelSignal::new();

        let show = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let bash = NamedTool::new("Bash");
                let call = ToolCall::new("toolu_3", "Bash", r#"{"command":"make"}"#);
                dialog
                    .show(&cancel, DialogRequest::confirmation(&bash, &call, "Run?"))
                    .await
            })
        };

        let pending = rx.recv().await.unwrap();
        assert!(!pending.is_closed());
        cancel.cancel("session closed");

        let response = tokio::time::timeout(Duration::from_secs(1), show)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(response.canceled);
        assert!(pending.is_closed());
    }
}
