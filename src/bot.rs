//! Bot module wiring the Matrix client to the commands.
//!
//! # Command Processing Flow
//!
//! ```text
//! Matrix Message → Parse Command → Execute → Reply
//! ```
//!
//! Each message is handled in its own task. Tasks share only immutable state,
//! so concurrent invocations of `updates` never interact.

use std::sync::Arc;

use anyhow::Context;
use log::{debug, error, info, warn};
use tokio::fs;

use crate::{
    Args,
    changelog::{ChangelogLoader, render},
    commands::{CommandContext, CommandParseError, Commander, Response},
    config::Config,
    matrix::{IncomingMessage, MatrixClient, Profile, Replier, UserCredentials},
    utils::get_path,
};

/// Main bot structure.
///
/// Holds the Matrix client, the command handler and the changelog loader;
/// [`Bot::start`] runs the Matrix sync loop until the process stops.
pub struct Bot {
    /// Matrix client for receiving messages and sending replies
    matrix_client: Arc<MatrixClient>,
    /// Command parser and executor, stateless
    commander: Arc<Commander>,
    /// Loader of the published changelog
    changelog: ChangelogLoader,
}

impl Bot {
    /// Creates a new Bot from the configuration and the command line arguments.
    ///
    /// Logs in to Matrix (or restores the session stored in the data
    /// directory) and checks once that the changelog can be rendered. A
    /// changelog that cannot be rendered is only reported: the file may be
    /// fixed while the bot runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the avatar cannot be read or if the Matrix client
    /// cannot be set up.
    pub async fn new(config: Config, args: &Args) -> Result<Self, anyhow::Error> {
        let changelog = ChangelogLoader::new(&config.changelog.path);
        check_changelog(&changelog).await;

        let avatar = match &config.matrix.avatar {
            Some(path) => Some(
                fs::read(path)
                    .await
                    .with_context(|| format!("failed to read avatar {}", path))?,
            ),
            None => None,
        };

        let matrix_client = Arc::new(
            MatrixClient::new(
                &UserCredentials {
                    user_id: config.matrix.user_id,
                    password: config.matrix.password,
                    passphrase: config.matrix.passphrase,
                },
                &get_path(&args.data, "session"),
                &Profile {
                    display_name: config.matrix.display_name,
                    avatar,
                },
            )
            .await?,
        );

        Ok(Bot {
            matrix_client,
            commander: Arc::new(Commander::new(config.bot.prefix)),
            changelog,
        })
    }

    /// Runs the Matrix sync loop, answering commands, until the process stops.
    ///
    /// # Errors
    ///
    /// Returns the error which stopped the sync loop.
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let matrix_client = Arc::clone(&self.matrix_client);
        let commander = Arc::clone(&self.commander);
        let changelog = self.changelog.clone();

        let on_message = move |message: IncomingMessage| {
            let matrix_client = Arc::clone(&matrix_client);
            let commander = Arc::clone(&commander);
            let context = CommandContext {
                changelog: changelog.clone(),
            };

            tokio::spawn(async move {
                if let Err(e) = respond(&commander, &context, matrix_client.as_ref(), &message).await {
                    error!(
                        "failed to reply to {} in {}: {}",
                        message.target.event_id, message.target.room_id, e
                    );
                }
            });
        };

        self.matrix_client.sync(on_message).await
    }
}

/// Answers `message` if it is a command for the bot.
///
/// Messages which are not for the bot get no reply. Usage errors are answered
/// with a usage message.
///
/// # Errors
///
/// Returns the delivery error of the reply, which is not retried.
async fn respond<R: Replier>(
    commander: &Commander,
    context: &CommandContext,
    replier: &R,
    message: &IncomingMessage,
) -> Result<(), anyhow::Error> {
    let response = match commander.parse(&message.body) {
        Ok(command) => {
            debug!("{} invoked {:?}", message.target.sender_id, command);
            commander.parse_command(&command, context).await.response
        }
        Err(CommandParseError::NotForBot) => return Ok(()),
        Err(CommandParseError::InvalidCommand(usage)) => Response::Markdown(usage),
    };

    replier.reply(&message.target, &response).await?;
    Ok(())
}

/// Logs whether the changelog currently renders.
async fn check_changelog(changelog: &ChangelogLoader) {
    match changelog.load().await.and_then(|document| render(&document)) {
        Ok(update) => info!("changelog {} ready: {}", changelog.path(), update.title),
        Err(e) => warn!("changelog {} cannot be rendered yet: {}", changelog.path(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{DeliveryError, MockReplier, ReplyTarget};
    use tempfile::NamedTempFile;

    fn create_message(body: &str) -> IncomingMessage {
        IncomingMessage {
            body: body.to_string(),
            target: ReplyTarget {
                room_id: "!room:example.com".to_string(),
                sender_id: "@user:example.com".to_string(),
                event_id: "$event:example.com".to_string(),
            },
        }
    }

    fn create_changelog() -> (NamedTempFile, CommandContext) {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(
            temp_file.path(),
            r#"{"updates": [{"version": "1.2", "title": "Fast Mode", "date": "2024-01-01", "features": ["Speed boost"]}]}"#,
        )
        .unwrap();
        let context = CommandContext {
            changelog: ChangelogLoader::new(temp_file.path().to_str().unwrap()),
        };
        (temp_file, context)
    }

    #[tokio::test]
    async fn test_respond_updates_replies_with_rendered_update() {
        let (_file, context) = create_changelog();
        let commander = Commander::new('!');
        let mut replier = MockReplier::new();
        replier
            .expect_reply()
            .withf(|target, response| {
                target.event_id == "$event:example.com"
                    && matches!(
                        response,
                        Response::Update(update)
                            if update.title == "🎉 Atualização v1.2: Fast Mode"
                                && update.body
                                    == "*Publicado em: 2024-01-01*\n\n✨ Novas Features\n• Speed boost"
                    )
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let result = respond(&commander, &context, &replier, &create_message("!updates")).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_respond_ignores_regular_messages() {
        let (_file, context) = create_changelog();
        let commander = Commander::new('!');
        let mut replier = MockReplier::new();
        replier.expect_reply().never();

        let result = respond(&commander, &context, &replier, &create_message("hello there")).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_respond_invalid_command_replies_with_usage() {
        let (_file, context) = create_changelog();
        let commander = Commander::new('!');
        let mut replier = MockReplier::new();
        replier
            .expect_reply()
            .withf(|_, response| {
                matches!(response, Response::Markdown(text) if text.contains("Usage: `!updates`"))
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let result = respond(&commander, &context, &replier, &create_message("!updates please")).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_respond_reports_delivery_failure() {
        let (_file, context) = create_changelog();
        let commander = Commander::new('!');
        let mut replier = MockReplier::new();
        replier
            .expect_reply()
            .times(1)
            .returning(|target, _| Err(DeliveryError::RoomNotFound(target.room_id.clone())));

        let result = respond(&commander, &context, &replier, &create_message("!updates")).await;

        let error = result.unwrap_err();
        assert!(error.to_string().contains("room !room:example.com not found"));
    }
}
