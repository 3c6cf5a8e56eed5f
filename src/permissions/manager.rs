//! Permission manager implementation
//!
//! Evaluates a tool call in strict order, stopping at the first decision:
//! 1. Session allow-list (by tool category)
//! 2. Rules: deny, then allow, then ask
//! 3. Permission mode
//! 4. Confirmation dialog
//!
//! State (config and session allow-list) lives behind one `RwLock`. Only a
//! snapshot of the config is taken under the lock, so a pending confirmation
//! never blocks other evaluations or mode changes.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use super::category::{category, is_edit_tool, Category};
use super::config::PermissionConfig;
use super::dialog::{Dialog, DialogRequest, DialogResponse};
use super::modes::PermissionMode;
use super::rules::{Rule, RuleKind};
use crate::core::{CancelSignal, PermissionError, PermissionResult};
use crate::tools::{Tool, ToolCall};

const USER_DENIED: &str = "User denied tool call";
const PLAN_MODE_DENIED: &str = "Only read-only tools are allowed in plan mode";
const DONT_ASK_DENIED: &str = "Tool not explicitly allowed (dontAsk mode)";

/// Decision reached without asking the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    /// Allowed by the session allow-list, a rule, or the mode
    Allowed,
    /// Denied by a rule or the mode
    Denied(String),
    /// Needs confirmation; carries the prompt message (may be empty)
    AskUser(String),
}

#[derive(Debug, Default)]
struct ManagerState {
    config: Arc<PermissionConfig>,
    session_allowed: HashSet<String>,
}

/// Per-session permission manager
///
/// Share it behind an `Arc` between concurrent tool invocations. Create one
/// manager per agent session so session approvals never leak across sessions.
pub struct PermissionManager {
    state: RwLock<ManagerState>,
    /// Confirmation collaborator; without one, unresolved calls are allowed
    dialog: Option<Arc<dyn Dialog>>,
}

impl PermissionManager {
    /// Create a new permission manager
    pub fn new(config: PermissionConfig, dialog: Option<Arc<dyn Dialog>>) -> Self {
        Self {
            state: RwLock::new(ManagerState {
                config: Arc::new(config),
                session_allowed: HashSet::new(),
            }),
            dialog,
        }
    }

    /// Create a manager with a confirmation dialog
    pub fn with_dialog(config: PermissionConfig, dialog: impl Dialog + 'static) -> Self {
        Self::new(config, Some(Arc::new(dialog)))
    }

    /// Create a manager without a dialog
    ///
    /// Calls that would need confirmation are allowed. Use `DontAsk` mode or a
    /// `DenyAllDialog` when unattended runs must fail closed.
    pub fn headless(config: PermissionConfig) -> Self {
        Self::new(config, None)
    }

    fn read(&self) -> RwLockReadGuard<'_, ManagerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ManagerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the full evaluation, asking the user if needed
    ///
    /// Returns `Ok(())` if the call may proceed. Denials come back as
    /// `Denied`, `Cancelled` or `UserFeedback`; a failing dialog as `Dialog`.
    pub async fn evaluate_tool_use(
        &self,
        cancel: &CancelSignal,
        tool: &dyn Tool,
        call: &ToolCall,
    ) -> PermissionResult<()> {
        match self.check(tool, call) {
            CheckResult::Allowed => Ok(()),
            CheckResult::Denied(reason) => {
                tracing::info!("[Permissions] Denied {}: {}", tool.name(), reason);
                Err(PermissionError::Denied(reason))
            }
            CheckResult::AskUser(message) => self.confirm(cancel, tool, call, message).await,
        }
    }

    /// Evaluate session allow-list, rules and mode without prompting
    pub fn check(&self, tool: &dyn Tool, call: &ToolCall) -> CheckResult {
        let tool_name = tool.name();
        let key = category(tool_name).key;

        let config = {
            let state = self.read();
            if state.session_allowed.contains(&key) {
                tracing::debug!("[Permissions] {} allowed by session category {}", tool_name, key);
                return CheckResult::Allowed;
            }
            Arc::clone(&state.config)
        };

        if let Some(result) = evaluate_rules(&config, tool_name, call) {
            return result;
        }

        evaluate_mode(config.mode, tool)
    }

    /// Ask the dialog about a call `check` returned `AskUser` for
    ///
    /// Without a dialog the call is allowed. Cancellation wins over a pending
    /// answer.
    pub async fn confirm(
        &self,
        cancel: &CancelSignal,
        tool: &dyn Tool,
        call: &ToolCall,
        message: String,
    ) -> PermissionResult<()> {
        let Some(dialog) = self.dialog.as_ref() else {
            tracing::debug!(
                "[Permissions] No dialog configured, allowing {}",
                tool.name()
            );
            return Ok(());
        };

        tracing::info!("[Permissions] Asking user for permission: {}", tool.name());
        let request = DialogRequest::confirmation(tool, call, message);

        let response = tokio::select! {
            biased;
            reason = cancel.cancelled() => {
                tracing::info!("[Permissions] Cancelled while waiting for permission: {}", reason);
                return Err(PermissionError::Cancelled(reason));
            }
            result = dialog.show(cancel, request) => result.map_err(PermissionError::Dialog)?,
        };

        self.apply_response(tool, response)
    }

    fn apply_response(&self, tool: &dyn Tool, response: DialogResponse) -> PermissionResult<()> {
        if response.allow_session {
            // Category comes from the tool, not from whichever rule asked
            let category = category(tool.name());
            self.allow_category_for_session(&category);
            return Ok(());
        }

        if !response.feedback.is_empty() {
            tracing::info!("[Permissions] User redirected {}", tool.name());
            return Err(PermissionError::UserFeedback(response.feedback));
        }

        if response.canceled || !response.confirmed {
            tracing::info!("[Permissions] User denied {}", tool.name());
            return Err(PermissionError::denied(USER_DENIED));
        }

        tracing::info!("[Permissions] User allowed {}", tool.name());
        Ok(())
    }

    /// Current permission mode
    pub fn mode(&self) -> PermissionMode {
        self.read().config.mode
    }

    /// Change the permission mode
    pub fn set_mode(&self, mode: PermissionMode) {
        let mut state = self.write();
        tracing::info!("[Permissions] Mode {} -> {}", state.config.mode, mode);
        Arc::make_mut(&mut state.config).mode = mode;
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> Arc<PermissionConfig> {
        Arc::clone(&self.read().config)
    }

    /// Replace the whole configuration
    pub fn set_config(&self, config: PermissionConfig) -> PermissionResult<()> {
        config.validate()?;
        self.write().config = Arc::new(config);
        Ok(())
    }

    /// All configured rules, in declaration order
    pub fn rules(&self) -> Vec<Rule> {
        self.read().config.rules.clone()
    }

    /// Append a rule
    pub fn add_rule(&self, rule: Rule) -> PermissionResult<()> {
        rule.validate()?;
        tracing::info!("[Permissions] Adding rule {}", rule);
        Arc::make_mut(&mut self.write().config).rules.push(rule);
        Ok(())
    }

    /// Allow a tool category for the rest of this session
    pub fn allow_for_session(&self, category_key: &str) {
        let mut state = self.write();
        if state.session_allowed.insert(category_key.to_string()) {
            tracing::info!("[Permissions] Allowing '{}' for this session", category_key);
        }
    }

    /// Allow a category for the rest of this session
    pub fn allow_category_for_session(&self, category: &Category) {
        self.allow_for_session(&category.key);
    }

    /// Whether a category is allowed for this session
    pub fn is_session_allowed(&self, category_key: &str) -> bool {
        self.read().session_allowed.contains(category_key)
    }

    /// All session-allowed category keys, sorted
    pub fn session_allowed_categories(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().session_allowed.iter().cloned().collect();
        keys.sort();
        keys
    }

    /// Forget every session approval
    pub fn clear_session_allowlist(&self) {
        self.write().session_allowed.clear();
        tracing::info!("[Permissions] Session allow-list cleared");
    }

    /// Whether a confirmation dialog is configured
    pub fn is_interactive(&self) -> bool {
        self.dialog.is_some()
    }
}

impl std::fmt::Debug for PermissionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("PermissionManager")
            .field("mode", &state.config.mode)
            .field("rules", &state.config.rules.len())
            .field("session_allowed", &state.session_allowed)
            .field("interactive", &self.dialog.is_some())
            .finish()
    }
}

fn evaluate_rules(
    config: &PermissionConfig,
    tool_name: &str,
    call: &ToolCall,
) -> Option<CheckResult> {
    let input = call.decode_input();
    let matching = |kind: RuleKind| first_match(config, kind, tool_name, input.as_ref());

    if let Some(rule) = matching(RuleKind::Deny) {
        tracing::debug!("[Permissions] {} matched {}", tool_name, rule);
        return Some(CheckResult::Denied(rule.denial_reason()));
    }
    if let Some(rule) = matching(RuleKind::Allow) {
        tracing::debug!("[Permissions] {} matched {}", tool_name, rule);
        return Some(CheckResult::Allowed);
    }
    if let Some(rule) = matching(RuleKind::Ask) {
        tracing::debug!("[Permissions] {} matched {}", tool_name, rule);
        return Some(CheckResult::AskUser(
            rule.message().unwrap_or_default().to_string(),
        ));
    }
    None
}

fn first_match<'a>(
    config: &'a PermissionConfig,
    kind: RuleKind,
    tool_name: &str,
    input: Option<&Value>,
) -> Option<&'a Rule> {
    config
        .rules
        .iter()
        .filter(|rule| rule.kind() == kind)
        .find(|rule| rule.matches(tool_name, input, &config.specifier_fields))
}

fn evaluate_mode(mode: PermissionMode, tool: &dyn Tool) -> CheckResult {
    if mode.allows_all() {
        return CheckResult::Allowed;
    }
    if mode.is_read_only() {
        return if tool.annotations().read_only {
            CheckResult::Allowed
        } else {
            CheckResult::Denied(PLAN_MODE_DENIED.to_string())
        };
    }
    if mode.auto_approves_edits() && (tool.annotations().edit || is_edit_tool(tool.name())) {
        return CheckResult::Allowed;
    }
    if mode.denies_unmatched() {
        return CheckResult::Denied(DONT_ASK_DENIED.to_string());
    }
    CheckResult::AskUser(String::new())
}
