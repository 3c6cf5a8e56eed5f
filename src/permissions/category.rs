//! Tool categories for session-scoped approval
//!
//! "Allow for this session" applies to a category of tools rather than one
//! exact tool name, so approving `Write` also covers `Edit`.

use super::matching::match_glob;

/// A coarse grouping of tool names
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    pub key: String,
    pub label: String,
}

impl Category {
    fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }

    pub fn bash() -> Self {
        Self::new("bash", "bash commands")
    }

    pub fn edit() -> Self {
        Self::new("edit", "file edits")
    }

    pub fn read() -> Self {
        Self::new("read", "file reads")
    }

    pub fn search() -> Self {
        Self::new("search", "searches")
    }
}

const BASH_PATTERN: &str = "*{Bash,Command,Shell,Exec,Run}*";
const EDIT_PATTERN: &str = "*{Edit,Write,Create,Mkdir,Touch}*";
const READ_PATTERN: &str = "*Read*";
const SEARCH_PATTERN: &str = "*{Glob,Grep,Search}*";

/// Determine the category of a tool from its name
pub fn category(tool_name: &str) -> Category {
    if match_glob(BASH_PATTERN, tool_name) {
        Category::bash()
    } else if match_glob(EDIT_PATTERN, tool_name) {
        Category::edit()
    } else if match_glob(READ_PATTERN, tool_name) {
        Category::read()
    } else if match_glob(SEARCH_PATTERN, tool_name) {
        Category::search()
    } else {
        Category {
            key: tool_name.to_string(),
            label: format!("{} operations", tool_name),
        }
    }
}

/// Whether a tool name looks like a file mutation
pub fn is_edit_tool(tool_name: &str) -> bool {
    match_glob(EDIT_PATTERN, tool_name)
}
