//! Cooperative cancellation for permission evaluation
//!
//! A `CancelSignal` is handed to every evaluation. When it fires while a
//! confirmation dialog is open, the evaluation returns a denial carrying the
//! cancellation reason instead of waiting for the user.

use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

const DEFAULT_REASON: &str = "cancelled";

/// Cloneable cancellation signal with an optional reason
#[derive(Clone, Debug, Default)]
pub struct CancelSignal {
    token: CancellationToken,
    reason: Arc<Mutex<Option<String>>>,
}

impl CancelSignal {
    /// Create a signal that has not fired
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing token (e.g. one owned by the agent runtime)
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            reason: Arc::default(),
        }
    }

    /// Fire the signal, recording why
    ///
    /// Only the first reason is kept.
    pub fn cancel(&self, reason: impl Into<String>) {
        {
            let mut guard = self.reason.lock().unwrap_or_else(PoisonError::into_inner);
            if guard.is_none() {
                *guard = Some(reason.into());
            }
        }
        self.token.cancel();
    }

    /// Whether the signal has fired
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The recorded reason, if one was given
    pub fn reason(&self) -> Option<String> {
        self.reason
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait until the signal fires and return the reason
    pub async fn cancelled(&self) -> String {
        self.token.cancelled().await;
        self.reason().unwrap_or_else(|| DEFAULT_REASON.to_string())
    }

    /// The underlying token
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}
