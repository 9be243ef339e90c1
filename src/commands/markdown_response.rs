//! Markdown response formatters for bot commands.
//!
//! These are the text replies of the bot; the changelog itself is sent as an
//! embed, see [`crate::matrix`].

use crate::{changelog::ChangelogError, commands::command::CommandInfo};

/// Formats the help message listing `commands`.
///
/// ```ignore
/// let help = format_help(COMMANDS, '!');
/// assert!(help.contains("`!updates`"));
/// ```
pub fn format_help(commands: &[CommandInfo], prefix: char) -> String {
    let commands_md = commands
        .iter()
        .map(|c| format!("- `{}{}`: {}", prefix, c.name, c.description))
        .collect::<Vec<String>>()
        .join("\n");

    format!("Commands:\n{}", commands_md)
}

/// Formats an error response for an `updates` command with arguments.
pub fn format_invalid_updates(prefix: char) -> String {
    format!(
        "Invalid updates command. Usage: `{}updates` (no arguments)",
        prefix
    )
}

/// Formats the reply sent when the changelog cannot be rendered.
///
/// File paths and parser details stay in the logs, the user only learns
/// what kind of problem occurred.
pub fn format_changelog_error(error: &ChangelogError) -> String {
    match error {
        ChangelogError::EmptyChangelog => "No update has been published yet.".to_owned(),
        ChangelogError::MissingField { field } => {
            format!("The latest update is malformed: its `{}` is missing.", field)
        }
        ChangelogError::Io { .. } | ChangelogError::Parse { .. } => {
            "Error: the changelog is unavailable right now.".to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::command::COMMANDS;

    #[test]
    fn test_format_help_lists_commands_with_prefix() {
        let help = format_help(COMMANDS, '!');

        assert_eq!(
            help,
            "Commands:\n\
             - `!updates`: Shows the bot's latest updates.\n\
             - `!help`: Lists the available commands."
        );
    }

    #[test]
    fn test_format_invalid_updates() {
        assert_eq!(
            format_invalid_updates('?'),
            "Invalid updates command. Usage: `?updates` (no arguments)"
        );
    }

    #[test]
    fn test_format_changelog_error_empty() {
        assert_eq!(
            format_changelog_error(&ChangelogError::EmptyChangelog),
            "No update has been published yet."
        );
    }

    #[test]
    fn test_format_changelog_error_missing_field() {
        let message = format_changelog_error(&ChangelogError::MissingField { field: "title" });
        assert!(message.contains("`title`"));
    }

    #[test]
    fn test_format_changelog_error_hides_path() {
        let error = ChangelogError::Io {
            path: "/secret/changelog.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };

        let message = format_changelog_error(&error);
        assert!(!message.contains("/secret"));
    }
}
