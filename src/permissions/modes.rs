//! Global permission modes
//!
//! The mode is the fallback policy applied when no rule matches a tool call.

use serde::{Deserialize, Serialize};

/// Permission mode that determines the fallback behavior for unmatched calls
///
/// # Modes
///
/// - **Default**: No fallback decision; the user is asked.
/// - **Plan**: Read-only. Tools annotated read-only are allowed, everything
///   else is denied.
/// - **AcceptEdits**: File edits are allowed without asking; other tools fall
///   through to confirmation.
/// - **BypassPermissions**: Everything is allowed.
/// - **DontAsk**: Anything not explicitly allowed by a rule is denied. The
///   user is never asked, which suits headless runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    #[default]
    Default,
    Plan,
    AcceptEdits,
    BypassPermissions,
    DontAsk,
}

impl PermissionMode {
    pub fn allows_all(&self) -> bool {
        matches!(self, PermissionMode::BypassPermissions)
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, PermissionMode::Plan)
    }

    pub fn auto_approves_edits(&self) -> bool {
        matches!(self, PermissionMode::AcceptEdits)
    }

    /// Whether calls no rule covers are denied instead of confirmed
    pub fn denies_unmatched(&self) -> bool {
        matches!(self, PermissionMode::DontAsk)
    }

    pub fn description(&self) -> &'static str {
        match self {
            PermissionMode::Default => "Ask before running tools not covered by a rule",
            PermissionMode::Plan => "Read-only mode",
            PermissionMode::AcceptEdits => "Auto-approve file edits",
            PermissionMode::BypassPermissions => "Allow all operations (dangerous)",
            PermissionMode::DontAsk => "Deny anything not explicitly allowed",
        }
    }
}

impl std::fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionMode::Default => write!(f, "default"),
            PermissionMode::Plan => write!(f, "plan"),
            PermissionMode::AcceptEdits => write!(f, "acceptEdits"),
            PermissionMode::BypassPermissions => write!(f, "bypassPermissions"),
            PermissionMode::DontAsk => write!(f, "dontAsk"),
        }
    }
}

impl std::str::FromStr for PermissionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(PermissionMode::Default),
            "plan" | "readonly" | "read-only" | "read_only" => Ok(PermissionMode::Plan),
            "acceptedits" | "accept-edits" | "accept_edits" => Ok(PermissionMode::AcceptEdits),
            "bypasspermissions" | "bypass-permissions" | "bypass_permissions" | "bypass" => {
                Ok(PermissionMode::BypassPermissions)
            }
            "dontask" | "dont-ask" | "dont_ask" => Ok(PermissionMode::DontAsk),
            _ => Err(format!("Unknown permission mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode() {
        let mode = PermissionMode::default();
        assert_eq!(mode, PermissionMode::Default);
        assert!(!mode.allows_all());
        assert!(!mode.is_read_only());
        assert!(!mode.auto_approves_edits());
        assert!(!mode.denies_unmatched());
    }

    #[test]
    fn test_mode_predicates_are_exclusive() {
        let modes = [
            PermissionMode::Plan,
            PermissionMode::AcceptEdits,
            PermissionMode::BypassPermissions,
            PermissionMode::DontAsk,
        ];
        for mode in modes {
            let set = [
                mode.allows_all(),
                mode.is_read_only(),
                mode.auto_approves_edits(),
                mode.denies_unmatched(),
            ];
            assert_eq!(set.iter().filter(|b| **b).count(), 1, "{}", mode);
        }
        assert!(PermissionMode::Plan.is_read_only());
        assert!(PermissionMode::AcceptEdits.auto_approves_edits());
        assert!(PermissionMode::DontAsk.denies_unmatched());
    }

    #[test]
    fn test_display() {
        assert_eq!(PermissionMode::Default.to_string(), "default");
        assert_eq!(PermissionMode::AcceptEdits.to_string(), "acceptEdits");
        assert_eq!(
            PermissionMode::BypassPermissions.to_string(),
            "bypassPermissions"
        );
        assert_eq!(PermissionMode::Plan.to_string(), "plan");
        assert_eq!(PermissionMode::DontAsk.to_string(), "dontAsk");
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "acceptEdits".parse::<PermissionMode>().unwrap(),
            PermissionMode::AcceptEdits
        );
        assert_eq!(
            "bypass".parse::<PermissionMode>().unwrap(),
            PermissionMode::BypassPermissions
        );
        assert_eq!(
            "dontAsk".parse::<PermissionMode>().unwrap(),
            PermissionMode::DontAsk
        );
        assert_eq!(
            "dont-ask".parse::<PermissionMode>().unwrap(),
            PermissionMode::DontAsk
        );
        assert!("sometimes".parse::<PermissionMode>().is_err());
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&PermissionMode::DontAsk).unwrap();
        assert_eq!(json, "\"dontAsk\"");

        let parsed: PermissionMode = serde_json::from_str("\"bypassPermissions\"").unwrap();
        assert_eq!(parsed, PermissionMode::BypassPermissions);
    }
}
