//! Command declarations and parsing.
//!
//! This module converts message text into structured [`Command`] enums and
//! holds the static table of commands the bot answers to.

use command_parser::Parser;
use log::debug;

use crate::commands::markdown_response::format_invalid_updates;

/// Name and description of a user invocable command.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// Every command the bot answers to, in help order.
pub const COMMANDS: &[CommandInfo] = &[
    CommandInfo {
        name: "updates",
        description: "Shows the bot's latest updates.",
    },
    CommandInfo {
        name: "help",
        description: "Lists the available commands.",
    },
];

/// A parsed bot command.
#[derive(Debug, Hash, PartialEq, Eq)]
pub enum Command {
    /// Display the declared commands
    Help,
    /// Display the latest changelog entry
    Updates,
}

/// Errors that can occur during command parsing.
#[derive(Debug)]
pub enum CommandParsingError {
    /// The message could not be parsed as a command
    UnableToParse,
    /// The command is not one of ours
    NotForBot,
    /// The updates command was given arguments
    InvalidUpdates,
}

impl Command {
    /// Parses a message body into a Command.
    ///
    /// Only the command names of [`COMMANDS`] are recognized; the prefix is
    /// the one the `parser` was built with.
    ///
    /// # Arguments
    ///
    /// * `parser` - The command parser configured with the bot prefix
    /// * `body` - The message text to parse
    ///
    /// # Returns
    ///
    /// * `Ok(Command)` - If the message is a valid bot command
    /// * `Err(CommandParsingError)` - If the message is not for the bot or is invalid
    ///
    /// # Errors
    ///
    /// - [`CommandParsingError::UnableToParse`] if the message is not a command
    /// - [`CommandParsingError::NotForBot`] if the command name is not in [`COMMANDS`]
    /// - [`CommandParsingError::InvalidUpdates`] if `updates` has arguments
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let parser = Parser::new('!', '-');
    /// assert!(matches!(Command::parse(&parser, "!updates"), Ok(Command::Updates)));
    /// assert!(matches!(
    ///     Command::parse(&parser, "!updates all"),
    ///     Err(CommandParsingError::InvalidUpdates)
    /// ));
    /// ```
    pub fn parse(parser: &Parser, body: &str) -> Result<Self, CommandParsingError> {
        // The parser drops the last word of the message, so a dummy one is appended
        let body = body.to_string() + " dummy";

        // Failing is expected for regular chat messages
        let command = match parser.parse(&body) {
            Ok(cmd) => cmd,
            Err(_) => return Err(CommandParsingError::UnableToParse),
        };

        debug!("Parsing command: {:?}", command);

        match &command.name[..] {
            "updates" => {
                if !command.arguments.is_empty() {
                    return Err(CommandParsingError::InvalidUpdates);
                }
                Ok(Command::Updates)
            }
            "help" => Ok(Command::Help),
            _ => Err(CommandParsingError::NotForBot),
        }
    }
}

/// Formats a command error into a user-friendly message.
///
/// Returns `None` for errors that must not produce a response.
pub fn format_command_error(error: CommandParsingError, prefix: char) -> Option<String> {
    match error {
        CommandParsingError::InvalidUpdates => Some(format_invalid_updates(prefix)),
        CommandParsingError::UnableToParse | CommandParsingError::NotForBot => None,
    }
}
