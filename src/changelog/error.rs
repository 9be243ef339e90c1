//! Errors raised while loading or rendering a changelog.

use std::{error::Error, fmt};

/// Everything that can go wrong between the changelog file and a rendered update.
///
/// The renderer never logs or recovers from these: they are returned to the
/// caller, which decides what the user sees.
#[derive(Debug)]
pub enum ChangelogError {
    /// The document has no update entry, so there is no latest entry to render.
    EmptyChangelog,
    /// A required scalar of the selected entry is absent.
    MissingField {
        /// Name of the absent field (`version`, `title` or `date`)
        field: &'static str,
    },
    /// The changelog file could not be read.
    Io {
        path: String,
        source: std::io::Error,
    },
    /// The changelog file is not a valid changelog document.
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for ChangelogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangelogError::EmptyChangelog => write!(f, "the changelog has no update entry"),
            ChangelogError::MissingField { field } => {
                write!(f, "the latest update entry has no `{}` field", field)
            }
            ChangelogError::Io { path, source } => {
                write!(f, "failed to read changelog {}: {}", path, source)
            }
            ChangelogError::Parse { path, source } => {
                write!(f, "invalid changelog {}: {}", path, source)
            }
        }
    }
}

impl Error for ChangelogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ChangelogError::Io { source, .. } => Some(source),
            ChangelogError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}
