//! Hook Registry
//!
//! Contains:
//! - `HookMatcher` - scopes a hook to tools by glob pattern
//! - `HookRegistry` - stores and runs hooks in order

use std::sync::Arc;

use async_trait::async_trait;

use super::types::{PreToolUseContext, PreToolUseHook};
use crate::core::CancelSignal;
use crate::permissions::match_glob;

/// Type alias for stored hooks
pub type ArcHook = Arc<dyn PreToolUseHook>;

/// Matches tools by name pattern and runs a hook
pub struct HookMatcher {
    /// Glob over tool names (None = match all)
    pattern: Option<String>,

    /// The hook to run
    hook: ArcHook,
}

impl HookMatcher {
    /// Create a matcher that matches all tools
    pub fn new<H: PreToolUseHook + 'static>(hook: H) -> Self {
        Self {
            pattern: None,
            hook: Arc::new(hook),
        }
    }

    /// Create a matcher with a tool name glob
    ///
    /// Pattern examples:
    /// - `"Bash"` - match only Bash
    /// - `"{Read,Write,Edit}"` - match file tools
    /// - `"mcp__*"` - match all MCP tools
    pub fn with_pattern<H: PreToolUseHook + 'static>(pattern: impl Into<String>, hook: H) -> Self {
        Self {
            pattern: Some(pattern.into()),
            hook: Arc::new(hook),
        }
    }

    /// Check if this matcher applies to a tool
    ///
    /// Scoped matchers never apply when the tool name is unknown.
    pub fn matches(&self, tool_name: Option<&str>) -> bool {
        match (&self.pattern, tool_name) {
            (None, _) => true,
            (Some(pattern), Some(name)) => match_glob(pattern, name),
            (Some(_), None) => false,
        }
    }

    /// Run the hook
    pub async fn run(&self, cancel: &CancelSignal, ctx: &PreToolUseContext) -> anyhow::Result<()> {
        self.hook.before_tool_use(cancel, ctx).await
    }
}

impl std::fmt::Debug for HookMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookMatcher")
            .field("pattern", &self.pattern)
            .finish()
    }
}

/// Ordered list of pre-tool-use hooks
///
/// # Example
///
/// ```ignore
/// let mut hooks = HookRegistry::new();
///
/// hooks.add(AuditHook::tracing());
/// hooks.add_with_pattern("Bash", |ctx: &PreToolUseContext| {
///     let cmd = ctx.call.as_ref().map(|c| c.input.as_str()).unwrap_or("");
///     if cmd.contains("rm -rf") {
///         anyhow::bail!("Dangerous command blocked");
///     }
///     Ok(())
/// });
/// hooks.add(PermissionHook::from_manager(manager));
///
/// hooks.run_pre_tool_use(&cancel, &ctx).await?;
/// ```
#[derive(Default)]
pub struct HookRegistry {
    hooks: Vec<HookMatcher>,
}

impl HookRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook that matches all tools
    pub fn add<H: PreToolUseHook + 'static>(&mut self, hook: H) -> &mut Self {
        self.hooks.push(HookMatcher::new(hook));
        self
    }

    /// Add a hook scoped to a tool name glob
    pub fn add_with_pattern<H: PreToolUseHook + 'static>(
        &mut self,
        pattern: impl Into<String>,
        hook: H,
    ) -> &mut Self {
        self.hooks.push(HookMatcher::with_pattern(pattern, hook));
        self
    }

    /// Number of registered hooks
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run all matching hooks in registration order
    ///
    /// Stops at the first hook that returns an error and returns that error.
    pub async fn run_pre_tool_use(
        &self,
        cancel: &CancelSignal,
        ctx: &PreToolUseContext,
    ) -> anyhow::Result<()> {
        let tool_name = ctx.tool_name();

        for matcher in &self.hooks {
            if !matcher.matches(tool_name) {
                continue;
            }

            if let Err(e) = matcher.run(cancel, ctx).await {
                tracing::debug!(
                    "[HookRegistry] {} blocked by hook: {}",
                    tool_name.unwrap_or("unknown"),
                    e
                );
                return Err(e);
            }
        }

        Ok(())
    }
}

/// A registry is itself a hook, so registries nest
#[async_trait]
impl PreToolUseHook for HookRegistry {
    async fn before_tool_use(
        &self,
        cancel: &CancelSignal,
        ctx: &PreToolUseContext,
    ) -> anyhow::Result<()> {
        self.run_pre_tool_use(cancel, ctx).await
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.hooks).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{NamedTool, ToolCall};
    use std::sync::Mutex;

    fn ctx(tool: &str) -> PreToolUseContext {
        PreToolUseContext::new(Arc::new(NamedTool::new(tool)), ToolCall::new("1", tool, "{}"))
    }

    /// Hook that records its label and optionally fails
    fn recorder(
        log: &Arc<Mutex<Vec<&'static str>>>,
        label: &'static str,
        fail: bool,
    ) -> impl Fn(&PreToolUseContext) -> anyhow::Result<()> + Send + Sync {
        let log = Arc::clone(log);
        move |_ctx: &PreToolUseContext| {
            log.lock().unwrap().push(label);
            if fail {
                anyhow::bail!("{} failed", label);
            }
            Ok(())
        }
    }

    #[test]
    fn test_hook_matcher_pattern() {
        let ok = |_: &PreToolUseContext| -> anyhow::Result<()> { Ok(()) };
        let matcher = HookMatcher::with_pattern("{Bash,Shell}", ok);

        assert!(matcher.matches(Some("Bash")));
        assert!(matcher.matches(Some("Shell")));
        assert!(!matcher.matches(Some("Read")));
        assert!(!matcher.matches(None));
    }

    #[test]
    fn test_hook_matcher_no_pattern() {
        let matcher = HookMatcher::new(|_: &PreToolUseContext| -> anyhow::Result<()> { Ok(()) });

        assert!(matcher.matches(Some("Bash")));
        assert!(matcher.matches(Some("anything")));
        assert!(matcher.matches(None));
    }

    #[tokio::test]
    async fn test_runs_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();
        registry
            .add(recorder(&log, "first", false))
            .add(recorder(&log, "second", false));

        registry
            .run_pre_tool_use(&CancelSignal::new(), &ctx("Read"))
            .await
            .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_stops_at_first_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();
        registry
            .add(recorder(&log, "first", false))
            .add(recorder(&log, "blocker", true))
            .add(recorder(&log, "never", false));

        let err = registry
            .run_pre_tool_use(&CancelSignal::new(), &ctx("Bash"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "blocker failed");
        assert_eq!(*log.lock().unwrap(), vec!["first", "blocker"]);
    }

    #[tokio::test]
    async fn test_skips_non_matching_patterns() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();
        registry
            .add_with_pattern("Bash", recorder(&log, "bash-only", true))
            .add(recorder(&log, "all", false));
        assert_eq!(registry.len(), 2);

        registry
            .run_pre_tool_use(&CancelSignal::new(), &ctx("Read"))
            .await
            .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["all"]);

        assert!(registry
            .run_pre_tool_use(&CancelSignal::new(), &ctx("Bash"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_nested_registry() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut inner = HookRegistry::new();
        inner.add(recorder(&log, "inner", false));

        let mut outer = HookRegistry::new();
        outer.add_with_pattern("Write", inner);
        assert!(!outer.is_empty());

        outer
            .run_pre_tool_use(&CancelSignal::new(), &ctx("Write"))
            .await
            .unwrap();
        outer
            .run_pre_tool_use(&CancelSignal::new(), &ctx("Read"))
            .await
            .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["inner"]);
    }
}
