//! Updates command handler.
//!
//! Loads the changelog file and renders its latest entry. Every invocation
//! reads the file again, so the reply always reflects the changelog on disk.

use log::debug;

use crate::{
    changelog::{ChangelogError, render},
    commands::{CommandContext, CommandResult, Response},
};

/// Renders the latest changelog entry of the context's changelog.
///
/// # Errors
///
/// Returns the [`ChangelogError`] raised by loading or rendering, untouched.
pub async fn handle_updates(context: &CommandContext) -> Result<CommandResult, ChangelogError> {
    debug!("handling updates command");

    let document = context.changelog.load().await?;
    let update = render(&document)?;

    debug!("rendered update {:?}", update.title);

    Ok(CommandResult {
        response: Response::Update(update),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::ChangelogLoader;
    use tempfile::NamedTempFile;

    fn context_with_changelog(content: &str) -> (NamedTempFile, CommandContext) {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), content).unwrap();
        let context = CommandContext {
            changelog: ChangelogLoader::new(temp_file.path().to_str().unwrap()),
        };
        (temp_file, context)
    }

    #[tokio::test]
    async fn test_handle_updates_renders_latest_entry() {
        let (_file, context) = context_with_changelog(
            r#"{"updates": [
                {"version": "1.2", "title": "Fast Mode", "date": "2024-01-01", "features": ["Speed boost"]},
                {"version": "1.1", "title": "Older", "date": "2023-01-01"}
            ]}"#,
        );

        let result = handle_updates(&context).await.unwrap();

        let Response::Update(update) = result.response else {
            panic!("Expected an update response");
        };
        assert_eq!(update.title, "🎉 Atualização v1.2: Fast Mode");
        assert_eq!(
            update.body,
            "*Publicado em: 2024-01-01*\n\n✨ Novas Features\n• Speed boost"
        );
    }

    #[tokio::test]
    async fn test_handle_updates_empty_changelog() {
        let (_file, context) = context_with_changelog(r#"{"updates": []}"#);

        let result = handle_updates(&context).await;
        assert!(matches!(result, Err(ChangelogError::EmptyChangelog)));
    }

    #[tokio::test]
    async fn test_handle_updates_missing_file() {
        let context = CommandContext {
            changelog: ChangelogLoader::new("missing_changelog.json"),
        };

        let result = handle_updates(&context).await;
        assert!(matches!(result, Err(ChangelogError::Io { .. })));
    }
}
