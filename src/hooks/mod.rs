//! Hooks Module
//!
//! Intercept tool calls before they execute.
//!
//! # Overview
//!
//! Hooks let you:
//! - Enforce permission policy before a tool runs
//! - Block dangerous operations with ad hoc checks
//! - Log and audit tool calls
//!
//! # Example
//!
//! ```ignore
//! use shadow_agent_policy::hooks::{AuditHook, HookRegistry, PermissionHook, PreToolUseContext};
//!
//! let mut hooks = HookRegistry::new();
//!
//! hooks.add(AuditHook::tracing());
//! hooks.add(PermissionHook::new(config, Some(Arc::new(ConsoleDialog::new()))));
//!
//! // In the agent loop, before executing a tool:
//! if let Err(e) = hooks.run_pre_tool_use(&cancel, &ctx).await {
//!     match user_feedback(&e) {
//!         Some(feedback) => { /* pass the user's redirection back to the model */ }
//!         None => { /* report the denial */ }
//!     }
//! }
//! ```
//!
//! # Outcomes
//!
//! | Result | Effect |
//! |--------|--------|
//! | `Ok(())` | Continue; the next hook runs |
//! | `Err(e)` | Block the tool; remaining hooks are skipped |

mod permission;
mod registry;
mod types;

pub use permission::{AuditHook, PermissionHook};
pub use registry::{ArcHook, HookMatcher, HookRegistry};
pub use types::{PreToolUseContext, PreToolUseHook};
