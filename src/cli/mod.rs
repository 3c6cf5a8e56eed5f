//! Terminal front end
//!
//! - `Console` - colored output and the blocking permission prompt
//! - `ConsoleDialog` - `Dialog` implementation backed by `Console`

mod console;

pub use console::{parse_choice, read_response, Console, ConsoleDialog};
