//! Permission error types

use thiserror::Error;

/// Errors produced while loading policy or evaluating a tool call
#[derive(Error, Debug)]
pub enum PermissionError {
    /// Malformed rule text or an invalid rule
    #[error("Invalid permission rule: {0}")]
    Parse(String),

    /// Tool call denied by a rule, the permission mode, or the user
    #[error("{0}")]
    Denied(String),

    /// Tool call denied because the caller cancelled while a confirmation was pending
    #[error("Tool call cancelled: {0}")]
    Cancelled(String),

    /// Tool call denied with free-text redirection from the user
    #[error("{0}")]
    UserFeedback(String),

    /// The confirmation dialog failed
    #[error(transparent)]
    Dialog(anyhow::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PermissionError {
    /// Create a parse error from a string
    pub fn parse(msg: impl Into<String>) -> Self {
        PermissionError::Parse(msg.into())
    }

    /// Create a plain denial
    pub fn denied(reason: impl Into<String>) -> Self {
        PermissionError::Denied(reason.into())
    }

    /// Whether this error is a policy decision rather than a failure
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            PermissionError::Denied(_)
                | PermissionError::Cancelled(_)
                | PermissionError::UserFeedback(_)
        )
    }

    /// The user's feedback text, if this denial carries any
    pub fn feedback(&self) -> Option<&str> {
        match self {
            PermissionError::UserFeedback(text) => Some(text),
            _ => None,
        }
    }
}

/// Extract user feedback from an error returned through a hook
///
/// Agent loops use this to relay the text back to the model as a redirection
/// instead of reporting a generic failure.
pub fn user_feedback(err: &anyhow::Error) -> Option<&str> {
    err.downcast_ref::<PermissionError>()
        .and_then(PermissionError::feedback)
}

/// Result type alias for permission operations
pub type PermissionResult<T> = Result<T, PermissionError>;
