pub mod core;
pub mod permissions;
pub mod tools;

// Hooks for intercepting tool calls
pub mod hooks;

// Project settings (.shadow/settings.json)
pub mod settings;

// Optional components
pub mod cli;
pub mod logging;
pub mod runtime;

pub use crate::core::{user_feedback, CancelSignal, PermissionError, PermissionResult};
pub use crate::hooks::{AuditHook, HookRegistry, PermissionHook, PreToolUseContext, PreToolUseHook};
pub use crate::permissions::{
    Dialog, DialogRequest, DialogResponse, PermissionConfig, PermissionManager, PermissionMode,
    Rule, RuleKind,
};
pub use crate::tools::{Tool, ToolAnnotations, ToolCall};
