use colored::*;
use std::io::{self, BufRead, Write};

use async_trait::async_trait;

use crate::core::{CancelSignal, PermissionError};
use crate::permissions::{
    category, CheckResult, Dialog, DialogRequest, DialogResponse, PermissionMode,
};

/// Longest input preview shown in a prompt
const INPUT_PREVIEW_LEN: usize = 500;

/// Console handles terminal I/O with colored formatting
pub struct Console {
    tool_color: Color,
}

impl Console {
    /// Create a new Console with default colors
    pub fn new() -> Self {
        Self {
            tool_color: Color::Magenta,
        }
    }

    /// Create a new Console with a custom tool color
    pub fn with_tool_color(tool_color: Color) -> Self {
        Self { tool_color }
    }

    /// Print a system message (info, mode changes, etc.)
    pub fn print_system(&self, message: &str) {
        println!("{} {}", "System:".yellow().bold(), message);
    }

    /// Print an error message
    pub fn print_error(&self, error: &str) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }

    /// Print the active permission mode
    pub fn print_mode(&self, mode: PermissionMode) {
        println!(
            "{} {} ({})",
            "Mode:".bright_blue().bold(),
            mode.to_string().bright_blue(),
            mode.description().bright_black()
        );
    }

    /// Print the outcome of a permission check
    pub fn print_decision(&self, tool_name: &str, result: &Result<(), PermissionError>) {
        let tool = format!("[{}]", tool_name).color(self.tool_color);
        match result {
            Ok(()) => println!("{} {}", "✓ Allowed".green().bold(), tool),
            Err(PermissionError::UserFeedback(feedback)) => {
                println!("{} {}", "↻ Redirected".yellow().bold(), tool);
                println!("  {}", feedback);
            }
            Err(e) => println!("{} {} {}", "✗ Denied".red().bold(), tool, e),
        }
    }

    /// Print a decision preview without prompting
    pub fn print_check(&self, tool_name: &str, result: &CheckResult) {
        let tool = format!("[{}]", tool_name).color(self.tool_color);
        match result {
            CheckResult::Allowed => println!("{} {}", "✓ Allowed".green().bold(), tool),
            CheckResult::Denied(reason) => {
                println!("{} {} {}", "✗ Denied".red().bold(), tool, reason)
            }
            CheckResult::AskUser(message) if message.is_empty() => {
                println!("{} {}", "? Needs confirmation".yellow().bold(), tool)
            }
            CheckResult::AskUser(message) => {
                println!("{} {} {}", "? Needs confirmation".yellow().bold(), tool, message)
            }
        }
    }

    /// Ask for permission to execute a tool
    ///
    /// Blocks on stdin. Returns the user's decision:
    /// - `y` allow once
    /// - `n` (or empty) deny
    /// - `a` allow the tool's category for this session
    /// - anything else is sent back to the agent as feedback
    pub fn ask_permission(&self, request: &DialogRequest<'_>) -> io::Result<DialogResponse> {
        self.print_request(request)?;
        let stdin = io::stdin();
        let response = read_response(&mut stdin.lock())?;
        self.print_response(&response, request.tool.name());
        Ok(response)
    }

    fn print_request(&self, request: &DialogRequest<'_>) -> io::Result<()> {
        let category = category(request.tool.name());

        println!();
        println!("{}", "─".repeat(60).yellow());
        println!(
            "{} The agent wants to use tool: {}",
            "⚠️ Permission Required".yellow().bold(),
            request.title.color(self.tool_color).bold()
        );
        println!();
        if !request.message.is_empty() {
            println!("  {}", request.message);
        }
        println!("  {}", preview(&request.call.input).bright_black());
        println!();
        println!("{}", "Options:".yellow());
        println!("  [y] Allow this action");
        println!("  [n] Deny this action");
        println!("  [a] Allow all {} for this session", category.label);
        println!("  Or type feedback to tell the agent what to do instead");
        println!("{}", "─".repeat(60).yellow());
        print!("{} ", "Your choice (y/n/a):".yellow().bold());
        io::stdout().flush()
    }

    fn print_response(&self, response: &DialogResponse, tool_name: &str) {
        if response.allow_session {
            let category = category(tool_name);
            println!(
                "{}",
                format!("✓ Allowing {} for this session", category.label).green()
            );
        } else if !response.feedback.is_empty() {
            println!("{}", "↻ Sending feedback to the agent".yellow());
        } else if response.confirmed {
            println!("{}", "✓ Allowed".green());
        } else {
            println!("{}", "✗ Denied".red());
        }
        println!();
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// Read one answer line and turn it into a response
///
/// End of input counts as a denial.
pub fn read_response(reader: &mut impl BufRead) -> io::Result<DialogResponse> {
    let mut input = String::new();
    if reader.read_line(&mut input)? == 0 {
        return Ok(DialogResponse::deny());
    }
    Ok(parse_choice(&input))
}

/// Map a typed answer to a dialog response
pub fn parse_choice(input: &str) -> DialogResponse {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "y" | "yes" => DialogResponse::allow(),
        "" | "n" | "no" => DialogResponse::deny(),
        "a" | "always" => DialogResponse::allow_session(),
        _ => DialogResponse::feedback(input),
    }
}

fn preview(input: &str) -> String {
    match input.char_indices().nth(INPUT_PREVIEW_LEN) {
        Some((end, _)) => format!("{}...", &input[..end]),
        None => input.to_string(),
    }
}

/// `Dialog` that prompts on the terminal
///
/// The prompt blocks on stdin, so it runs on the blocking thread pool. If the
/// evaluation is cancelled the prompt is abandoned; the pending line read
/// finishes in the background.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleDialog;

impl ConsoleDialog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Dialog for ConsoleDialog {
    async fn show(
        &self,
        _cancel: &CancelSignal,
        request: DialogRequest<'_>,
    ) -> anyhow::Result<DialogResponse> {
        let console = Console::new();
        console.print_request(&request)?;

        let tool_name = request.tool.name().to_string();
        let response = tokio::task::spawn_blocking(move || {
            let stdin = io::stdin();
            let response = read_response(&mut stdin.lock())?;
            console.print_response(&response, &tool_name);
            Ok::<_, io::Error>(response)
        })
        .await??;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("y\n"), DialogResponse::allow());
        assert_eq!(parse_choice("YES"), DialogResponse::allow());
        assert_eq!(parse_choice("n"), DialogResponse::deny());
        assert_eq!(parse_choice("  \n"), DialogResponse::deny());
        assert_eq!(parse_choice("a"), DialogResponse::allow_session());
        assert_eq!(
            parse_choice("use the staging database\n"),
            DialogResponse::feedback("use the staging database")
        );
    }

    #[test]
    fn test_read_response() {
        let mut input = io::Cursor::new("always\n");
        assert!(read_response(&mut input).unwrap().allow_session);

        let mut eof = io::Cursor::new("");
        assert_eq!(read_response(&mut eof).unwrap(), DialogResponse::deny());
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(INPUT_PREVIEW_LEN + 10);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), INPUT_PREVIEW_LEN + 3);
        assert_eq!(preview("{}"), "{}");
    }
}
