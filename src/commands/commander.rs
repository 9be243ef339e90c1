//! Command orchestration and execution.
//!
//! The [`Commander`] is the entry point of the commands module. It works in
//! two phases:
//!
//! ```text
//! Matrix Message → parse() → Command → parse_command() → CommandResult
//! ```

use command_parser::Parser;
use log::{Level, log};

use crate::{
    changelog::ChangelogError,
    commands::{
        CommandContext, CommandParseError, CommandResult, Response,
        actions::{handle_help, handle_updates},
        command::{Command, format_command_error},
        markdown_response::format_changelog_error,
    },
};

/// Command orchestrator for parsing and executing bot commands.
///
/// Messages that do not start with the configured prefix, or whose command is
/// not declared, are ignored (returning [`CommandParseError::NotForBot`]).
pub struct Commander {
    /// Command parser for processing user commands
    parser: Parser,
    /// Character starting every command
    prefix: char,
}

impl Commander {
    /// Creates a Commander recognizing commands starting with `prefix`.
    pub fn new(prefix: char) -> Self {
        let parser = Parser::new(prefix, '-');
        Commander { parser, prefix }
    }

    /// Parses a Matrix message body into a structured command.
    ///
    /// # Returns
    ///
    /// * `Ok(Command)` - Successfully parsed and validated command
    /// * `Err(CommandParseError::NotForBot)` - Regular chat or command of another bot
    /// * `Err(CommandParseError::InvalidCommand)` - Known command used wrongly
    pub fn parse(&self, body: &str) -> Result<Command, CommandParseError> {
        Command::parse(&self.parser, body).map_err(|error| {
            match format_command_error(error, self.prefix) {
                Some(message) => CommandParseError::InvalidCommand(message),
                None => CommandParseError::NotForBot,
            }
        })
    }

    /// Executes a parsed command and returns the response to send.
    ///
    /// Changelog failures of the `updates` command are logged and answered
    /// with a short error message instead of the update.
    pub async fn parse_command(&self, command: &Command, context: &CommandContext) -> CommandResult {
        match command {
            Command::Help => handle_help(self.prefix),
            Command::Updates => match handle_updates(context).await {
                Ok(result) => result,
                Err(e) => {
                    log!(changelog_error_level(&e), "failed to render changelog: {}", e);
                    CommandResult {
                        response: Response::Markdown(format_changelog_error(&e)),
                    }
                }
            },
        }
    }
}

/// Log level of a changelog failure.
///
/// An empty changelog is a normal state before the first release; the other
/// failures mean the file or its latest entry needs fixing.
fn changelog_error_level(error: &ChangelogError) -> Level {
    match error {
        ChangelogError::EmptyChangelog => Level::Info,
        ChangelogError::MissingField { .. }
        | ChangelogError::Io { .. }
        | ChangelogError::Parse { .. } => Level::Error,
    }
}
