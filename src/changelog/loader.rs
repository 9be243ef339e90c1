//! Loading of the changelog file.
//!
//! This module provides the [`ChangelogLoader`], the explicit load-and-validate
//! step between the JSON file on disk and the typed [`ChangelogDocument`].

use log::debug;
use tokio::fs;

use crate::changelog::{document::ChangelogDocument, error::ChangelogError};

/// Reads and validates the changelog file.
///
/// The loader holds only the path: each call to [`ChangelogLoader::load`] reads
/// the file again, so a changelog edited while the bot runs is picked up on the
/// next command.
#[derive(Debug, Clone)]
pub struct ChangelogLoader {
    /// Path to the JSON changelog file
    path: String,
}

impl ChangelogLoader {
    /// Creates a loader for the changelog at `path`.
    pub fn new(path: &str) -> Self {
        ChangelogLoader {
            path: path.to_owned(),
        }
    }

    /// Path of the changelog file.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Loads the changelog document from disk.
    ///
    /// # Errors
    ///
    /// - [`ChangelogError::Io`] if the file cannot be read
    /// - [`ChangelogError::Parse`] if the content is not a changelog document
    pub async fn load(&self) -> Result<ChangelogDocument, ChangelogError> {
        debug!("loading changelog from {}", self.path);

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|source| ChangelogError::Io {
                path: self.path.clone(),
                source,
            })?;

        let document: ChangelogDocument =
            serde_json::from_str(&content).map_err(|source| ChangelogError::Parse {
                path: self.path.clone(),
                source,
            })?;

        debug!("loaded {} changelog entries", document.updates.len());

        Ok(document)
    }
}
