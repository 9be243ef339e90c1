//! Typed changelog document.
//!
//! The changelog file is a JSON object holding an `updates` array ordered
//! newest first:
//!
//! ```json
//! {
//!   "updates": [
//!     {
//!       "version": "1.2",
//!       "title": "Fast Mode",
//!       "date": "2024-01-01",
//!       "features": ["Speed boost"],
//!       "fixes": [],
//!       "backend": []
//!     }
//!   ]
//! }
//! ```

use serde::Deserialize;

use crate::changelog::error::ChangelogError;

/// The whole changelog, as read from disk.
///
/// Read-only once loaded. Entries are kept in file order, so index 0 is the
/// most recent release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChangelogDocument {
    /// Release entries, newest first
    pub updates: Vec<UpdateEntry>,
}

/// One release of the changelog.
///
/// The scalar fields are optional at load time and only required when the
/// entry is rendered, through [`UpdateEntry::version`], [`UpdateEntry::title`]
/// and [`UpdateEntry::date`]. Missing lists are read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateEntry {
    version: Option<String>,
    title: Option<String>,
    /// Publication date, displayed as is
    date: Option<String>,
    /// New features of the release
    #[serde(default)]
    pub features: Vec<String>,
    /// Bug fixes of the release
    #[serde(default)]
    pub fixes: Vec<String>,
    /// Backend and miscellaneous changes of the release
    #[serde(default)]
    pub backend: Vec<String>,
}

impl ChangelogDocument {
    /// Returns the most recent entry of the changelog.
    ///
    /// The first entry is the latest one; no comparison of versions or dates
    /// is done.
    ///
    /// # Errors
    ///
    /// Returns [`ChangelogError::EmptyChangelog`] if the document has no entry.
    pub fn latest_entry(&self) -> Result<&UpdateEntry, ChangelogError> {
        self.updates.first().ok_or(ChangelogError::EmptyChangelog)
    }
}

impl UpdateEntry {
    /// Creates an entry with all its fields set.
    #[cfg(test)]
    pub fn new(version: &str, title: &str, date: &str) -> Self {
        UpdateEntry {
            version: Some(version.to_owned()),
            title: Some(title.to_owned()),
            date: Some(date.to_owned()),
            ..Default::default()
        }
    }

    /// Version label of the release, e.g. `1.4.0`.
    pub fn version(&self) -> Result<&str, ChangelogError> {
        required(&self.version, "version")
    }

    /// Short title of the release.
    pub fn title(&self) -> Result<&str, ChangelogError> {
        required(&self.title, "title")
    }

    /// Publication date label of the release.
    pub fn date(&self) -> Result<&str, ChangelogError> {
        required(&self.date, "date")
    }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ChangelogError> {
    value
        .as_deref()
        .ok_or(ChangelogError::MissingField { field })
}
