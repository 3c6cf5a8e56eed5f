//! Runtime plumbing for interactive confirmation
//!
//! - `ChannelDialog` - `Dialog` that forwards prompts to another task
//! - `PendingConfirmation` - a prompt the UI answers via `respond`
//!
//! The permission manager awaits the answer while the UI task renders the
//! prompt however it likes.

pub mod channels;

pub use channels::{
    confirmation_channel, ChannelDialog, ConfirmationReceiver, ConfirmationSender,
    PendingConfirmation,
};
