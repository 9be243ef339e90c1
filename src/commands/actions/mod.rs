//! Command action handlers.
//!
//! Individual handler functions for each bot command. Each handler receives
//! what it needs from the [`CommandContext`](crate::commands::CommandContext)
//! and returns a [`CommandResult`](crate::commands::CommandResult).
//!
//! - [`handle_help`] - List the declared commands
//! - [`handle_updates`] - Render the latest changelog entry

mod help;
mod updates;

pub use crate::commands::actions::{help::handle_help, updates::handle_updates};
