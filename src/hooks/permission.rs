//! Permission and audit hooks
//!
//! `PermissionHook` plugs a `PermissionManager` into the hook chain.
//! `AuditHook` observes every call and never blocks.

use std::sync::Arc;

use async_trait::async_trait;

use super::types::{PreToolUseContext, PreToolUseHook};
use crate::core::{CancelSignal, PermissionError};
use crate::permissions::{CheckResult, Dialog, PermissionConfig, PermissionManager};
use crate::tools::ToolCall;

type AllowCallback = Arc<dyn Fn(&PreToolUseContext) + Send + Sync>;
type DenyCallback = Arc<dyn Fn(&PreToolUseContext, &str) + Send + Sync>;
type AskCallback = Arc<dyn Fn(&PreToolUseContext, &str) + Send + Sync>;
type AuditLogger = Arc<dyn Fn(&str, &str) + Send + Sync>;

const MISSING_CALL: &str = "Permission check requires a tool and a tool call";

/// Blocks tool calls the permission manager rejects
#[derive(Clone)]
pub struct PermissionHook {
    manager: Arc<PermissionManager>,
    on_allow: Option<AllowCallback>,
    on_deny: Option<DenyCallback>,
    on_ask: Option<AskCallback>,
}

impl PermissionHook {
    /// Create a hook with its own manager
    pub fn new(config: PermissionConfig, dialog: Option<Arc<dyn Dialog>>) -> Self {
        Self::from_manager(Arc::new(PermissionManager::new(config, dialog)))
    }

    /// Create a hook around an existing manager
    ///
    /// Use this to keep a handle for runtime mode changes or to share session
    /// approvals with other hooks.
    pub fn from_manager(manager: Arc<PermissionManager>) -> Self {
        Self {
            manager,
            on_allow: None,
            on_deny: None,
            on_ask: None,
        }
    }

    /// Called after a call is allowed
    pub fn on_allow<F>(mut self, callback: F) -> Self
    where
        F: Fn(&PreToolUseContext) + Send + Sync + 'static,
    {
        self.on_allow = Some(Arc::new(callback));
        self
    }

    /// Called with the reason after a call is denied
    pub fn on_deny<F>(mut self, callback: F) -> Self
    where
        F: Fn(&PreToolUseContext, &str) + Send + Sync + 'static,
    {
        self.on_deny = Some(Arc::new(callback));
        self
    }

    /// Called with the prompt message before the dialog is shown
    ///
    /// The message is empty when the mode, not a rule, asked.
    pub fn on_ask<F>(mut self, callback: F) -> Self
    where
        F: Fn(&PreToolUseContext, &str) + Send + Sync + 'static,
    {
        self.on_ask = Some(Arc::new(callback));
        self
    }

    /// The underlying manager
    pub fn manager(&self) -> &Arc<PermissionManager> {
        &self.manager
    }

    fn denied(&self, ctx: &PreToolUseContext, err: &PermissionError) {
        if let Some(callback) = &self.on_deny {
            callback(ctx, &err.to_string());
        }
    }
}

#[async_trait]
impl PreToolUseHook for PermissionHook {
    async fn before_tool_use(
        &self,
        cancel: &CancelSignal,
        ctx: &PreToolUseContext,
    ) -> anyhow::Result<()> {
        let (Some(tool), Some(call)) = (ctx.tool.as_deref(), ctx.call.as_ref()) else {
            tracing::warn!("[PermissionHook] Rejecting call without tool or call data");
            let err = PermissionError::denied(MISSING_CALL);
            self.denied(ctx, &err);
            return Err(err.into());
        };

        let result = match self.manager.check(tool, call) {
            CheckResult::Allowed => Ok(()),
            CheckResult::Denied(reason) => {
                tracing::info!("[PermissionHook] Denied {}: {}", tool.name(), reason);
                Err(PermissionError::Denied(reason))
            }
            CheckResult::AskUser(message) => {
                if let Some(callback) = &self.on_ask {
                    callback(ctx, &message);
                }
                self.manager.confirm(cancel, tool, call, message).await
            }
        };

        match result {
            Ok(()) => {
                if let Some(callback) = &self.on_allow {
                    callback(ctx);
                }
                Ok(())
            }
            Err(err) => {
                self.denied(ctx, &err);
                Err(err.into())
            }
        }
    }
}

impl std::fmt::Debug for PermissionHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionHook")
            .field("manager", &self.manager)
            .finish()
    }
}

/// Reports every tool call to a logger and never blocks
#[derive(Clone)]
pub struct AuditHook {
    logger: Option<AuditLogger>,
}

impl AuditHook {
    /// Forward `(tool name, raw input)` to a logger
    ///
    /// The name is `"unknown"` when the context has no tool; the input is
    /// empty when it has no call.
    pub fn new<F>(logger: F) -> Self
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        Self {
            logger: Some(Arc::new(logger)),
        }
    }

    /// Log calls through `tracing`
    pub fn tracing() -> Self {
        Self::new(|tool_name, input| {
            tracing::info!(tool = tool_name, input = input, "[Audit] Tool call");
        })
    }

    /// An audit hook with no logger
    pub fn silent() -> Self {
        Self { logger: None }
    }
}

#[async_trait]
impl PreToolUseHook for AuditHook {
    async fn before_tool_use(
        &self,
        _cancel: &CancelSignal,
        ctx: &PreToolUseContext,
    ) -> anyhow::Result<()> {
        if let Some(logger) = &self.logger {
            let tool_name = ctx.tool.as_deref().map_or("unknown", |tool| tool.name());
            let input = ctx.call.as_ref().map_or("", |call: &ToolCall| call.input.as_str());
            logger(tool_name, input);
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuditHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditHook")
            .field("logger", &self.logger.is_some())
            .finish()
    }
}
