//! Specifier extraction
//!
//! A specifier is the one string inside a tool call's input that rules compare
//! against: a command line for shells, a path for file tools, a URL for
//! fetches. Deployments can override the checked fields per tool.

use std::collections::HashMap;

use serde_json::Value;

const SHELL_FIELDS: &[&str] = &["command", "cmd", "script", "code"];
const FILE_FIELDS: &[&str] = &["file_path", "filePath", "path"];
const URL_FIELDS: &[&str] = &["url"];
const PATH_FIELDS: &[&str] = &["path", "file_path", "filePath", "filename", "file"];

/// Built-in fields checked for a tool, in order
pub fn default_fields(tool_name: &str) -> Option<&'static [&'static str]> {
    match tool_name {
        "Bash" => Some(SHELL_FIELDS),
        "Read" | "Write" | "Edit" => Some(FILE_FIELDS),
        "WebFetch" => Some(URL_FIELDS),
        _ => None,
    }
}

/// Fields that carry a file path in file tool inputs
pub fn file_fields() -> &'static [&'static str] {
    FILE_FIELDS
}

/// Fields that carry a command line in shell-like tool inputs
pub fn shell_fields() -> &'static [&'static str] {
    SHELL_FIELDS
}

/// Fields checked by path rules, for any tool
pub fn path_fields() -> &'static [&'static str] {
    PATH_FIELDS
}

/// Extract a specifier from a decoded tool input
///
/// Fields from `overrides` replace the built-in list for that tool. The first
/// non-empty string field wins. Returns `None` when the tool has no known
/// fields or none of them hold a string.
pub fn extract_specifier(
    tool_name: &str,
    input: &Value,
    overrides: &HashMap<String, Vec<String>>,
) -> Option<String> {
    match overrides.get(tool_name) {
        Some(fields) => first_string_field(input, fields.iter().map(String::as_str)),
        None => first_string_field(input, default_fields(tool_name)?.iter().copied()),
    }
}

/// Return the first non-empty string among `fields` in a JSON object
pub fn first_string_field<'a>(
    input: &Value,
    fields: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    let object = input.as_object()?;
    fields
        .into_iter()
        .filter_map(|field| object.get(field).and_then(Value::as_str))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}
