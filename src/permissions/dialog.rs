//! Confirmation dialog contract
//!
//! The engine never renders UI. When a call needs a human decision it hands a
//! `DialogRequest` to a `Dialog` and interprets the `DialogResponse`.

use async_trait::async_trait;

use crate::core::CancelSignal;
use crate::tools::{Tool, ToolCall};

/// What to present to the user
pub struct DialogRequest<'a> {
    /// Yes/no confirmation (always true for permission prompts)
    pub is_confirmation: bool,
    /// Short heading, the tool name
    pub title: String,
    /// Prompt text, e.g. an ask rule's message (may be empty)
    pub message: String,
    /// The tool requesting permission
    pub tool: &'a dyn Tool,
    /// The pending call
    pub call: &'a ToolCall,
}

impl<'a> DialogRequest<'a> {
    /// Build a confirmation request for a tool call
    pub fn confirmation(
        tool: &'a dyn Tool,
        call: &'a ToolCall,
        message: impl Into<String>,
    ) -> Self {
        Self {
            is_confirmation: true,
            title: tool.name().to_string(),
            message: message.into(),
            tool,
            call,
        }
    }
}

impl std::fmt::Debug for DialogRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogRequest")
            .field("is_confirmation", &self.is_confirmation)
            .field("title", &self.title)
            .field("message", &self.message)
            .field("call", &self.call)
            .finish()
    }
}

/// The user's answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogResponse {
    /// The user approved this call
    pub confirmed: bool,
    /// The user dismissed the dialog
    pub canceled: bool,
    /// Approve this call and its whole category for the rest of the session
    pub allow_session: bool,
    /// Free-text redirection; a non-empty value always denies
    pub feedback: String,
}

impl DialogResponse {
    pub fn allow() -> Self {
        Self {
            confirmed: true,
            ..Default::default()
        }
    }

    pub fn deny() -> Self {
        Self::default()
    }

    pub fn allow_session() -> Self {
        Self {
            confirmed: true,
            allow_session: true,
            ..Default::default()
        }
    }

    pub fn canceled() -> Self {
        Self {
            canceled: true,
            ..Default::default()
        }
    }

    pub fn feedback(text: impl Into<String>) -> Self {
        Self {
            feedback: text.into(),
            ..Default::default()
        }
    }
}

/// Renders a confirmation prompt and returns the user's decision
///
/// Implementations may watch `cancel` to tear down their UI early; the manager
/// stops waiting as soon as it fires either way.
#[async_trait]
pub trait Dialog: Send + Sync {
    async fn show(
        &self,
        cancel: &CancelSignal,
        request: DialogRequest<'_>,
    ) -> anyhow::Result<DialogResponse>;
}

/// Approves every request
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApproveDialog;

#[async_trait]
impl Dialog for AutoApproveDialog {
    async fn show(
        &self,
        _cancel: &CancelSignal,
        _request: DialogRequest<'_>,
    ) -> anyhow::Result<DialogResponse> {
        Ok(DialogResponse::allow())
    }
}

/// Denies every request
///
/// Supply this for fail-closed behavior in non-interactive runs that still
/// want ask rules and the default mode to reach a decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllDialog;

#[async_trait]
impl Dialog for DenyAllDialog {
    async fn show(
        &self,
        _cancel: &CancelSignal,
        _request: DialogRequest<'_>,
    ) -> anyhow::Result<DialogResponse> {
        Ok(DialogResponse::deny())
    }
}
