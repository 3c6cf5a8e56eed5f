//! Core types shared across the crate
//!
//! - `PermissionError` / `PermissionResult` - Error types
//! - `CancelSignal` - Cancellation passed into every evaluation

pub mod cancel;
pub mod error;

pub use cancel::CancelSignal;
pub use error::{user_feedback, PermissionError, PermissionResult};
