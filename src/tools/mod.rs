//! Tool metadata seen by the permission engine
//!
//! - `Tool` trait - name and capability annotations
//! - `ToolCall` - a pending invocation with raw JSON input
//! - `NamedTool` - a `Tool` built from plain metadata

mod tool;

pub use tool::{NamedTool, Tool, ToolAnnotations, ToolCall};
