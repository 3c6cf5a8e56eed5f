//! Project settings
//!
//! Loads permission rules from `<dir>/.shadow/settings.local.json`, falling
//! back to `<dir>/.shadow/settings.json`:
//!
//! ```json
//! {
//!   "permissions": {
//!     "allow": ["Read", "Bash(go build:*)", "WebFetch(domain:docs.rs)"],
//!     "deny": ["Read(//etc/**)"],
//!     "ask": ["Bash(git push:*)"],
//!     "defaultMode": "acceptEdits"
//!   }
//! }
//! ```
//!
//! Pattern forms:
//! - `Tool` or `Tool(specifier)` - regular rule syntax
//! - `Bash(cmd:*)` - command prefix; `Shell` and `Command` are aliases
//! - `Read(path)`, `Write(path)`, `Edit(path)` - path glob; `//abs` means `/abs`
//! - `WebFetch(domain:host)` - host or subdomain; `WebFetch(glob)` matches the URL
//! - `Other(text)` - the serialized input contains `text`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{PermissionError, PermissionResult};
use crate::permissions::{
    file_fields, parse_rule, InputPredicate, PermissionConfig, PermissionMode, Rule, RuleKind,
};

/// Directory holding project settings
pub const SETTINGS_DIR: &str = ".shadow";

/// Settings files, in precedence order
pub const SETTINGS_FILES: [&str; 2] = ["settings.local.json", "settings.json"];

/// Project settings file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub permissions: SettingsPermissions,

    /// File the settings were read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Permission section of the settings file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPermissions {
    #[serde(default)]
    pub allow: Vec<String>,

    #[serde(default)]
    pub deny: Vec<String>,

    #[serde(default)]
    pub ask: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<String>,
}

impl Settings {
    /// Load settings for a project directory
    ///
    /// Missing files yield empty settings. Unreadable or malformed files are
    /// errors.
    pub fn load(dir: impl AsRef<Path>) -> PermissionResult<Self> {
        let settings_dir = dir.as_ref().join(SETTINGS_DIR);

        for filename in SETTINGS_FILES {
            let path = settings_dir.join(filename);
            let data = match std::fs::read_to_string(&path) {
                Ok(data) => data,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            let mut settings: Settings = serde_json::from_str(&data)?;
            tracing::debug!("[Settings] Loaded {}", path.display());
            settings.source = Some(path);
            return Ok(settings);
        }

        Ok(Self::default())
    }

    /// The configured default mode, if any
    pub fn default_mode(&self) -> PermissionResult<Option<PermissionMode>> {
        self.permissions
            .default_mode
            .as_deref()
            .map(|mode| mode.parse().map_err(PermissionError::InvalidConfig))
            .transpose()
    }

    /// Translate every pattern into rules: deny, then allow, then ask
    ///
    /// Patterns that cannot be translated are skipped with a warning.
    pub fn to_rules(&self) -> Vec<Rule> {
        let groups = [
            (RuleKind::Deny, &self.permissions.deny),
            (RuleKind::Allow, &self.permissions.allow),
            (RuleKind::Ask, &self.permissions.ask),
        ];

        groups
            .into_iter()
            .flat_map(|(kind, patterns)| patterns.iter().map(move |p| (kind, p)))
            .filter_map(|(kind, pattern)| match parse_pattern(kind, pattern) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    tracing::warn!("[Settings] Skipping {} pattern {:?}: {}", kind, pattern, e);
                    None
                }
            })
            .collect()
    }

    /// Build a permission config from these settings
    ///
    /// The mode falls back to `default` when the file does not set one.
    pub fn to_config(&self) -> PermissionResult<PermissionConfig> {
        let mode = self.default_mode()?.unwrap_or_default();
        Ok(PermissionConfig::new(mode).with_rules(self.to_rules()))
    }
}

/// Translate one settings pattern into a rule
pub fn parse_pattern(kind: RuleKind, pattern: &str) -> PermissionResult<Rule> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Err(PermissionError::parse("empty pattern"));
    }

    if let Some(open) = pattern.find('(') {
        if open > 0 && pattern.ends_with(')') {
            let tool = &pattern[..open];
            let args = &pattern[open + 1..pattern.len() - 1];
            return parse_parameterized(kind, tool, args);
        }
    }

    parse_rule(kind, pattern)
}

fn parse_parameterized(kind: RuleKind, tool: &str, args: &str) -> PermissionResult<Rule> {
    let rule = match tool.to_lowercase().as_str() {
        "bash" | "shell" | "command" => {
            let specifier = match args.strip_suffix(":*") {
                Some(prefix) => format!("{}*", prefix),
                None => args.to_string(),
            };
            Rule::with_specifier(kind, "Bash", specifier)
        }
        "read" | "read_file" => path_rule(kind, "Read", args)?,
        "write" | "write_file" => path_rule(kind, "Write", args)?,
        "edit" => path_rule(kind, "Edit", args)?,
        "webfetch" | "web_fetch" => web_fetch_rule(kind, args)?,
        _ => {
            if args.is_empty() {
                return Err(PermissionError::parse(format!("empty arguments for {}", tool)));
            }
            Rule::new(kind, tool).with_predicate(InputPredicate::Contains(args.to_string()))
        }
    };

    rule.validate()?;
    Ok(rule)
}

fn path_rule(kind: RuleKind, tool: &str, pattern: &str) -> PermissionResult<Rule> {
    if pattern.is_empty() {
        return Err(PermissionError::parse(format!("empty path pattern for {}", tool)));
    }
    let pattern = match pattern.strip_prefix("//") {
        Some(rest) => format!("/{}", rest),
        None => pattern.to_string(),
    };
    Ok(Rule::new(kind, tool).with_predicate(InputPredicate::path_glob(
        file_fields().iter().copied(),
        pattern,
    )))
}

fn web_fetch_rule(kind: RuleKind, args: &str) -> PermissionResult<Rule> {
    let predicate = match args.strip_prefix("domain:") {
        Some(domain) if !domain.is_empty() => InputPredicate::domain("url", domain),
        Some(_) => return Err(PermissionError::parse("empty domain for WebFetch")),
        None if args.is_empty() => {
            return Err(PermissionError::parse("empty URL pattern for WebFetch"))
        }
        None => InputPredicate::path_glob(["url"], args),
    };
    Ok(Rule::new(kind, "WebFetch").with_predicate(predicate))
}
