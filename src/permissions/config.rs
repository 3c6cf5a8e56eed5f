//! Permission configuration
//!
//! ```json
//! {
//!   "mode": "dontAsk",
//!   "rules": [
//!     {"kind": "deny", "tool": "Bash", "specifier": "rm -rf*", "message": "No recursive deletes"},
//!     {"kind": "allow", "tool": "Read"}
//!   ],
//!   "specifierFields": {"RunScript": ["source"]}
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::modes::PermissionMode;
use super::rules::Rule;
use crate::core::PermissionResult;

/// Mode, rules and specifier overrides for one manager
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionConfig {
    /// Fallback policy when no rule matches
    #[serde(default)]
    pub mode: PermissionMode,

    /// Ordered rules; order matters within each kind
    #[serde(default)]
    pub rules: Vec<Rule>,

    /// Per-tool input fields checked for the specifier, replacing the defaults
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub specifier_fields: HashMap<String, Vec<String>>,
}

impl PermissionConfig {
    /// Create an empty configuration in the given mode
    pub fn new(mode: PermissionMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Add a rule
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add several rules, preserving order
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Override the specifier fields checked for a tool
    pub fn with_specifier_fields<I, S>(mut self, tool_name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specifier_fields
            .insert(tool_name.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    /// Check every rule for empty patterns
    pub fn validate(&self) -> PermissionResult<()> {
        self.rules.iter().try_for_each(Rule::validate)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> PermissionResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> PermissionResult<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PermissionError;
    use crate::permissions::RuleKind;
    use std::io::Write;

    #[test]
    fn test_from_json() {
        let config = PermissionConfig::from_json(
            r#"{
                "mode": "dontAsk",
                "rules": [
                    {"kind": "deny", "tool": "Bash", "specifier": "rm -rf*", "message": "No"},
                    {"kind": "allow", "tool": "Read"}
                ],
                "specifierFields": {"RunScript": ["source"]}
            }"#,
        )
        .unwrap();

        assert_eq!(config.mode, PermissionMode::DontAsk);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].kind(), RuleKind::Deny);
        assert_eq!(config.rules[1].to_string(), "allow:Read");
        assert_eq!(config.specifier_fields["RunScript"], vec!["source"]);
    }

    #[test]
    fn test_defaults() {
        let config = PermissionConfig::from_json("{}").unwrap();
        assert_eq!(config.mode, PermissionMode::Default);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_invalid_rule_rejected() {
        let err = PermissionConfig::from_json(r#"{"rules": [{"kind": "allow", "tool": ""}]}"#)
            .unwrap_err();
        assert!(matches!(err, PermissionError::Serialization(_)));
    }

    #[test]
    fn test_validate_programmatic_rules() {
        let config = PermissionConfig::default().with_rule(Rule::allow_specifier("Bash", ""));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"mode": "plan", "rules": [{{"kind": "ask", "tool": "Bash"}}]}}"#
        )
        .unwrap();

        let config = PermissionConfig::load(file.path()).unwrap();
        assert_eq!(config.mode, PermissionMode::Plan);
        assert_eq!(config.rules[0].kind(), RuleKind::Ask);
    }

    #[test]
    fn test_builder() {
        let config = PermissionConfig::new(PermissionMode::AcceptEdits)
            .with_rules([Rule::allow("Read"), Rule::deny("Bash", "no")])
            .with_specifier_fields("Deploy", ["target"]);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.specifier_fields["Deploy"], vec!["target".to_string()]);
    }
}
