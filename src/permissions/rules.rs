//! Declarative permission rules
//!
//! A rule pairs a decision (`allow`, `deny`, `ask`) with a tool-name glob and,
//! optionally, a specifier glob and an input predicate. All criteria present
//! must match for the rule to apply.
//!
//! Rules can be written as text: `Read`, `mcp__*`, `Bash(go test *)`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::matching::{match_domain, match_glob, match_path};
use super::specifier::{extract_specifier, first_string_field, path_fields, shell_fields};
use crate::core::{PermissionError, PermissionResult};

/// What a rule does when it matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Allow,
    Deny,
    Ask,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Allow => write!(f, "allow"),
            RuleKind::Deny => write!(f, "deny"),
            RuleKind::Ask => write!(f, "ask"),
        }
    }
}

impl FromStr for RuleKind {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(RuleKind::Allow),
            "deny" => Ok(RuleKind::Deny),
            "ask" => Ok(RuleKind::Ask),
            other => Err(PermissionError::parse(format!("unknown rule kind: {}", other))),
        }
    }
}

/// Callback signature for custom input predicates
pub type InputMatchFn = dyn Fn(&Value) -> bool + Send + Sync;

/// A condition over a tool call's decoded input
#[derive(Clone)]
pub enum InputPredicate {
    /// A top-level field equals a value
    FieldEquals { field: String, value: Value },
    /// A top-level string field starts with a prefix
    FieldPrefix { field: String, prefix: String },
    /// The command line (`command`, `cmd`, `script` or `code`) starts with a prefix
    CommandPrefix(String),
    /// The first non-empty string among `fields` matches a path glob
    PathGlob { fields: Vec<String>, pattern: String },
    /// A URL field's host is `domain` or one of its subdomains
    Domain { field: String, domain: String },
    /// The serialized input contains a substring
    Contains(String),
    /// Arbitrary callback
    Custom(Arc<InputMatchFn>),
}

impl InputPredicate {
    pub fn field_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        InputPredicate::FieldEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn field_prefix(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        InputPredicate::FieldPrefix {
            field: field.into(),
            prefix: prefix.into(),
        }
    }

    pub fn command_prefix(prefix: impl Into<String>) -> Self {
        InputPredicate::CommandPrefix(prefix.into())
    }

    pub fn path_glob<I, S>(fields: I, pattern: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        InputPredicate::PathGlob {
            fields: fields.into_iter().map(Into::into).collect(),
            pattern: pattern.into(),
        }
    }

    pub fn domain(field: impl Into<String>, domain: impl Into<String>) -> Self {
        InputPredicate::Domain {
            field: field.into(),
            domain: domain.into(),
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        InputPredicate::Custom(Arc::new(f))
    }

    /// Evaluate the predicate against a decoded input
    pub fn evaluate(&self, input: &Value) -> bool {
        match self {
            InputPredicate::FieldEquals { field, value } => input.get(field) == Some(value),
            InputPredicate::FieldPrefix { field, prefix } => input
                .get(field)
                .and_then(Value::as_str)
                .map(|s| s.starts_with(prefix.as_str()))
                .unwrap_or(false),
            InputPredicate::CommandPrefix(prefix) => {
                first_string_field(input, shell_fields().iter().copied())
                    .map(|command| command.starts_with(prefix.as_str()))
                    .unwrap_or(false)
            }
            InputPredicate::PathGlob { fields, pattern } => {
                first_string_field(input, fields.iter().map(String::as_str))
                    .map(|path| match_path(pattern, &path))
                    .unwrap_or(false)
            }
            InputPredicate::Domain { field, domain } => input
                .get(field)
                .and_then(Value::as_str)
                .map(|url| match_domain(url, domain))
                .unwrap_or(false),
            InputPredicate::Contains(needle) => serde_json::to_string(input)
                .map(|s| s.contains(needle.as_str()))
                .unwrap_or(false),
            InputPredicate::Custom(f) => f(input),
        }
    }
}

impl fmt::Debug for InputPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputPredicate::FieldEquals { field, value } => f
                .debug_struct("FieldEquals")
                .field("field", field)
                .field("value", value)
                .finish(),
            InputPredicate::FieldPrefix { field, prefix } => f
                .debug_struct("FieldPrefix")
                .field("field", field)
                .field("prefix", prefix)
                .finish(),
            InputPredicate::CommandPrefix(prefix) => {
                f.debug_tuple("CommandPrefix").field(prefix).finish()
            }
            InputPredicate::PathGlob { fields, pattern } => f
                .debug_struct("PathGlob")
                .field("fields", fields)
                .field("pattern", pattern)
                .finish(),
            InputPredicate::Domain { field, domain } => f
                .debug_struct("Domain")
                .field("field", field)
                .field("domain", domain)
                .finish(),
            InputPredicate::Contains(needle) => f.debug_tuple("Contains").field(needle).finish(),
            InputPredicate::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A permission rule
///
/// Serializes as `{kind, tool, specifier?, message?}`. Input predicates are
/// programmatic only and are not serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RuleDecl", into = "RuleDecl")]
pub struct Rule {
    kind: RuleKind,
    tool: String,
    specifier: Option<String>,
    message: Option<String>,
    predicate: Option<InputPredicate>,
}

impl Rule {
    /// Create a rule matching a tool pattern
    pub fn new(kind: RuleKind, tool: impl Into<String>) -> Self {
        Self {
            kind,
            tool: tool.into(),
            specifier: None,
            message: None,
            predicate: None,
        }
    }

    /// Create a rule with a specifier pattern, without parsing
    pub fn with_specifier(
        kind: RuleKind,
        tool: impl Into<String>,
        specifier: impl Into<String>,
    ) -> Self {
        Self {
            specifier: Some(specifier.into()),
            ..Self::new(kind, tool)
        }
    }

    pub fn allow(tool: impl Into<String>) -> Self {
        Self::new(RuleKind::Allow, tool)
    }

    pub fn deny(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(RuleKind::Deny, tool).with_message(message)
    }

    pub fn ask(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(RuleKind::Ask, tool).with_message(message)
    }

    pub fn allow_specifier(tool: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self::with_specifier(RuleKind::Allow, tool, specifier)
    }

    pub fn deny_specifier(
        tool: impl Into<String>,
        specifier: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::with_specifier(RuleKind::Deny, tool, specifier).with_message(message)
    }

    pub fn ask_specifier(
        tool: impl Into<String>,
        specifier: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::with_specifier(RuleKind::Ask, tool, specifier).with_message(message)
    }

    /// Allow commands starting with `prefix`, e.g. `"go test"`
    ///
    /// A plain prefix check: `"git status"` also admits `"git status; rm x"`.
    /// Prefer a specifier glob when chained commands matter.
    pub fn allow_command_prefix(tool: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::allow(tool).with_predicate(InputPredicate::command_prefix(prefix))
    }

    pub fn deny_command_prefix(
        tool: impl Into<String>,
        prefix: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::deny(tool, message).with_predicate(InputPredicate::command_prefix(prefix))
    }

    /// Allow calls whose path (`path`, `file_path`, `filePath`, `filename`,
    /// `file`) matches a path glob
    pub fn allow_path(tool: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::allow(tool)
            .with_predicate(InputPredicate::path_glob(path_fields().iter().copied(), pattern))
    }

    pub fn deny_path(
        tool: impl Into<String>,
        pattern: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::deny(tool, message)
            .with_predicate(InputPredicate::path_glob(path_fields().iter().copied(), pattern))
    }

    pub fn ask_path(
        tool: impl Into<String>,
        pattern: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ask(tool, message)
            .with_predicate(InputPredicate::path_glob(path_fields().iter().copied(), pattern))
    }

    /// Attach a message; an empty message is treated as none
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.message = (!message.is_empty()).then_some(message);
        self
    }

    /// Attach an input predicate
    pub fn with_predicate(mut self, predicate: InputPredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn specifier(&self) -> Option<&str> {
        self.specifier.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn predicate(&self) -> Option<&InputPredicate> {
        self.predicate.as_ref()
    }

    /// Reject empty tool or specifier patterns
    pub fn validate(&self) -> PermissionResult<()> {
        if self.tool.trim().is_empty() {
            return Err(PermissionError::parse(format!(
                "{} rule has an empty tool pattern",
                self.kind
            )));
        }
        if matches!(&self.specifier, Some(s) if s.trim().is_empty()) {
            return Err(PermissionError::parse(format!(
                "empty specifier in rule for {}",
                self.tool
            )));
        }
        Ok(())
    }

    /// Check if this rule matches a tool call
    ///
    /// `input` is the decoded call input, or `None` if it did not decode.
    /// Rules that need the input never match an undecodable call.
    pub fn matches(
        &self,
        tool_name: &str,
        input: Option<&Value>,
        specifier_fields: &HashMap<String, Vec<String>>,
    ) -> bool {
        if !match_glob(&self.tool, tool_name) {
            return false;
        }

        if let Some(pattern) = &self.specifier {
            let specifier =
                input.and_then(|value| extract_specifier(tool_name, value, specifier_fields));
            match specifier {
                Some(s) if match_glob(pattern, &s) => {}
                _ => return false,
            }
        }

        if let Some(predicate) = &self.predicate {
            match input {
                Some(value) if predicate.evaluate(value) => {}
                _ => return false,
            }
        }

        true
    }

    /// Reason reported when this rule denies a call
    pub fn denial_reason(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| format!("Tool use denied by rule {}", self))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.tool)?;
        if let Some(specifier) = &self.specifier {
            write!(f, "({})", specifier)?;
        }
        Ok(())
    }
}

/// Parses the canonical `kind:spec` form produced by `Display`
impl FromStr for Rule {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, spec) = s
            .split_once(':')
            .ok_or_else(|| PermissionError::parse(format!("missing rule kind in {:?}", s)))?;
        parse_rule(kind.parse()?, spec)
    }
}

/// Parse `ToolPattern` or `ToolPattern(specifier)` into a rule
///
/// Whitespace around both parts is trimmed. A spec starting with `(` is a
/// literal tool pattern.
pub fn parse_rule(kind: RuleKind, spec: &str) -> PermissionResult<Rule> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(PermissionError::parse("empty rule spec"));
    }

    if let Some(open) = spec.find('(') {
        if open > 0 && spec.ends_with(')') {
            let tool = spec[..open].trim();
            let specifier = spec[open + 1..spec.len() - 1].trim();
            if specifier.is_empty() {
                return Err(PermissionError::parse(format!(
                    "empty specifier in {:?}",
                    spec
                )));
            }
            return Ok(Rule::with_specifier(kind, tool, specifier));
        }
    }

    Ok(Rule::new(kind, spec))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleDecl {
    kind: RuleKind,
    tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    specifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl TryFrom<RuleDecl> for Rule {
    type Error = PermissionError;

    fn try_from(decl: RuleDecl) -> Result<Self, Self::Error> {
        let mut rule = Rule::new(decl.kind, decl.tool.trim());
        rule.specifier = decl.specifier.map(|s| s.trim().to_string());
        let rule = rule.with_message(decl.message.unwrap_or_default());
        rule.validate()?;
        Ok(rule)
    }
}

impl From<Rule> for RuleDecl {
    fn from(rule: Rule) -> Self {
        Self {
            kind: rule.kind,
            tool: rule.tool,
            specifier: rule.specifier,
            message: rule.message,
        }
    }
}
