//! Permission system for tool execution
//!
//! Every tool call is evaluated in a fixed order:
//! - **Session**: categories the user approved for the rest of the session
//! - **Rules**: deny, then allow, then ask (first match within each kind)
//! - **Mode**: `default`, `plan`, `acceptEdits`, `bypassPermissions`, `dontAsk`
//! - **Dialog**: the user confirms, denies, or redirects with feedback
//!
//! ## Example
//!
//! ```rust,ignore
//! use shadow_agent_policy::permissions::{
//!     PermissionConfig, PermissionManager, PermissionMode, Rule,
//! };
//!
//! let config = PermissionConfig::new(PermissionMode::Default)
//!     .with_rule(Rule::deny_specifier("Bash", "rm -rf*", "No recursive deletes"))
//!     .with_rule(Rule::allow("Read"));
//! let manager = PermissionManager::with_dialog(config, my_dialog);
//!
//! manager.evaluate_tool_use(&cancel, &tool, &call).await?;
//! ```

mod category;
mod config;
mod dialog;
mod manager;
mod matching;
mod modes;
mod rules;
mod specifier;

pub use category::{category, is_edit_tool, Category};
pub use config::PermissionConfig;
pub use dialog::{AutoApproveDialog, DenyAllDialog, Dialog, DialogRequest, DialogResponse};
pub use manager::{CheckResult, PermissionManager};
pub use matching::{match_domain, match_glob, match_path};
pub use modes::PermissionMode;
pub use rules::{parse_rule, InputMatchFn, InputPredicate, Rule, RuleKind};
pub use specifier::{default_fields, extract_specifier, file_fields, path_fields, shell_fields};
