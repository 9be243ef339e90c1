//! Bot command parsing and execution.
//!
//! # Overview
//!
//! The commands module turns a chat message into a [`CommandResult`]:
//! 1. **Parsing** - Converting the message into a structured [`command::Command`]
//! 2. **Execution** - Routing the command to its action handler
//! 3. **Response** - Producing either a Markdown text or a rendered update
//!
//! ```text
//! Matrix Message
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Commander  │  ← parse() + parse_command()
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────────────┐      ┌────────────────────────┐
//! │ Action Handlers     │ ───▶ │ CommandResult          │
//! │  - handle_help      │      │  - Response::Markdown  │
//! │  - handle_updates   │      │  - Response::Update    │
//! └─────────────────────┘      └────────────────────────┘
//! ```
//!
//! # Available Commands
//!
//! | Command | Arguments | Description |
//! |---------|-----------|-------------|
//! | `updates` | None | Shows the bot's latest updates. |
//! | `help` | None | Lists the available commands. |
//!
//! Commands start with the configured prefix, `!` by default: `!updates`.
//!
//! # Error Handling
//!
//! - **Silent Errors** ([`CommandParseError::NotForBot`]): regular chat and
//!   commands of other bots. No response is sent.
//! - **User Errors** ([`CommandParseError::InvalidCommand`]): wrong usage of a
//!   known command, answered with a usage message.

mod actions;
mod command;
mod commander;
mod markdown_response;

pub use crate::commands::commander::Commander;
use crate::changelog::{ChangelogLoader, RenderedUpdate};

/// Runtime context for command execution.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Loader of the changelog published by the `updates` command
    pub changelog: ChangelogLoader,
}

/// Message to send back for a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Markdown text
    Markdown(String),
    /// Latest changelog entry, sent as an embed
    Update(RenderedUpdate),
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Message to reply with
    pub response: Response,
}

/// Errors that can occur during command parsing.
///
/// # Variants
///
/// * `NotForBot` - Message is not a command of this bot, handled silently.
/// * `InvalidCommand` - Known command used wrongly, with a message for the user.
#[derive(Debug)]
pub enum CommandParseError {
    /// Message is not for this bot (silent error)
    NotForBot,
    /// Invalid command syntax with error message
    InvalidCommand(String),
}
