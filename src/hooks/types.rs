//! Hook Types
//!
//! Core types for the pre-tool-use hook chain:
//! - `PreToolUseContext` - The tool and call about to execute
//! - `PreToolUseHook` - Async hook that may veto a call

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::CancelSignal;
use crate::tools::{Tool, ToolCall};

/// Context passed to pre-tool-use hooks
///
/// Both fields are optional because agent loops sometimes invoke hooks for
/// calls that could not be resolved to a tool. Hooks decide how to treat the
/// gaps; the permission hook refuses them.
#[derive(Clone, Default)]
pub struct PreToolUseContext {
    /// Tool about to run
    pub tool: Option<Arc<dyn Tool>>,

    /// The call the model produced
    pub call: Option<ToolCall>,
}

impl PreToolUseContext {
    /// Create a context for a resolved call
    pub fn new(tool: Arc<dyn Tool>, call: ToolCall) -> Self {
        Self {
            tool: Some(tool),
            call: Some(call),
        }
    }

    /// Name of the tool, falling back to the name on the call
    pub fn tool_name(&self) -> Option<&str> {
        self.tool
            .as_deref()
            .map(|tool| tool.name())
            .or_else(|| self.call.as_ref().map(|call| call.name.as_str()))
    }
}

impl std::fmt::Debug for PreToolUseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreToolUseContext")
            .field("tool", &self.tool.as_deref().map(|tool| tool.name()))
            .field("call", &self.call)
            .finish()
    }
}

/// Runs before a tool executes
///
/// Returning `Err` blocks the call; the error is reported back to the model.
/// Use `crate::core::user_feedback` to tell a user redirection apart from a
/// plain denial.
#[async_trait]
pub trait PreToolUseHook: Send + Sync {
    async fn before_tool_use(
        &self,
        cancel: &CancelSignal,
        ctx: &PreToolUseContext,
    ) -> anyhow::Result<()>;
}

/// Synchronous closures work as hooks
#[async_trait]
impl<F> PreToolUseHook for F
where
    F: Fn(&PreToolUseContext) -> anyhow::Result<()> + Send + Sync,
{
    async fn before_tool_use(
        &self,
        _cancel: &CancelSignal,
        ctx: &PreToolUseContext,
    ) -> anyhow::Result<()> {
        (self)(ctx)
    }
}
