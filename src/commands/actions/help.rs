//! Help command handler.
//!
//! Lists every declared command with its description. Stateless.

use log::debug;

use crate::commands::{
    CommandResult, Response, command::COMMANDS, markdown_response::format_help,
};

/// Returns the list of available commands, written with `prefix`.
pub fn handle_help(prefix: char) -> CommandResult {
    debug!("handling help command");

    CommandResult {
        response: Response::Markdown(format_help(COMMANDS, prefix)),
    }
}
