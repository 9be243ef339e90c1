//! Rendering of the latest changelog entry.
//!
//! [`render`] turns a [`ChangelogDocument`] into a [`RenderedUpdate`]: a title,
//! a bounded body, a color and a timestamp. The body format is:
//!
//! ```text
//! *Publicado em: 2024-01-01*
//!
//! ✨ Novas Features
//! • Speed boost
//!
//! 🐛 Correções de Bugs
//! • Crash on start
//! ```
//!
//! A section only appears when its list is not empty and sections always come
//! in the order features, fixes, backend.

use chrono::{DateTime, Utc};

use crate::changelog::{
    document::{ChangelogDocument, UpdateEntry},
    error::ChangelogError,
};

/// Maximum length of a rendered body, in characters.
pub const MAX_BODY_LENGTH: usize = 4096;

/// Marker appended to a truncated body.
const ELLIPSIS: &str = "...";

/// Display color of every rendered update (`#57F287`).
pub const UPDATE_COLOR: u32 = 0x57F287;

const FEATURES_HEADER: &str = "✨ Novas Features";
const FIXES_HEADER: &str = "🐛 Correções de Bugs";
const BACKEND_HEADER: &str = "⚙️ Backend/Outros";

/// The latest changelog entry, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedUpdate {
    /// `🎉 Atualização v<version>: <title>`
    pub title: String,
    /// Publication line and change sections, at most [`MAX_BODY_LENGTH`] characters
    pub body: String,
    /// Always [`UPDATE_COLOR`]
    pub color: u32,
    /// Time of rendering
    pub timestamp: DateTime<Utc>,
}

/// Renders the latest entry of `document`, stamped with the current time.
///
/// Only the first entry is read; the other entries may be incomplete.
///
/// # Examples
///
/// ```ignore
/// let document = ChangelogLoader::new("changelog.json").load().await?;
/// let update = render(&document)?;
/// assert!(update.title.starts_with("🎉 Atualização v"));
/// assert!(update.body.chars().count() <= MAX_BODY_LENGTH);
/// ```
///
/// # Errors
///
/// - [`ChangelogError::EmptyChangelog`] if the document has no entry
/// - [`ChangelogError::MissingField`] if the latest entry has no version, title or date
pub fn render(document: &ChangelogDocument) -> Result<RenderedUpdate, ChangelogError> {
    render_at(document, Utc::now())
}

/// Same as [`render`] with a given timestamp.
pub fn render_at(
    document: &ChangelogDocument,
    timestamp: DateTime<Utc>,
) -> Result<RenderedUpdate, ChangelogError> {
    let entry = document.latest_entry()?;

    Ok(RenderedUpdate {
        title: format_title(entry)?,
        body: truncate(format_body(entry)?),
        color: UPDATE_COLOR,
        timestamp,
    })
}

fn format_title(entry: &UpdateEntry) -> Result<String, ChangelogError> {
    Ok(format!(
        "🎉 Atualização v{}: {}",
        entry.version()?,
        entry.title()?
    ))
}

fn format_body(entry: &UpdateEntry) -> Result<String, ChangelogError> {
    let sections = [
        (FEATURES_HEADER, &entry.features),
        (FIXES_HEADER, &entry.fixes),
        (BACKEND_HEADER, &entry.backend),
    ]
    .iter()
    .filter(|(_, items)| !items.is_empty())
    .map(|(header, items)| format_section(header, items))
    .collect::<Vec<String>>()
    .join("\n");

    Ok(format!("*Publicado em: {}*\n{}", entry.date()?, sections))
}

fn format_section(header: &str, items: &[String]) -> String {
    let items = items
        .iter()
        .map(|item| format!("• {}", item))
        .collect::<Vec<String>>()
        .join("\n");

    format!("\n{}\n{}", header, items)
}

/// Clamps `body` to [`MAX_BODY_LENGTH`] characters, ending with [`ELLIPSIS`] when cut.
fn truncate(body: String) -> String {
    if body.chars().count() <= MAX_BODY_LENGTH {
        return body;
    }

    let kept: String = body
        .chars()
        .take(MAX_BODY_LENGTH - ELLIPSIS.chars().count())
        .collect();
    kept + ELLIPSIS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_vec(items: &[&str]) -> Vec<String> {
        items.iter().map(|i| i.to_string()).collect()
    }

    fn entry_with(features: &[&str], fixes: &[&str], backend: &[&str]) -> UpdateEntry {
        let mut entry = UpdateEntry::new("1.2", "Fast Mode", "2024-01-01");
        entry.features = to_vec(features);
        entry.fixes = to_vec(fixes);
        entry.backend = to_vec(backend);
        entry
    }

    fn document_with(entries: Vec<UpdateEntry>) -> ChangelogDocument {
        ChangelogDocument { updates: entries }
    }

    #[test]
    fn test_render_single_feature() {
        let document = document_with(vec![entry_with(&["Speed boost"], &[], &[])]);

        let rendered = render(&document).unwrap();

        assert_eq!(rendered.title, "🎉 Atualização v1.2: Fast Mode");
        assert_eq!(
            rendered.body,
            "*Publicado em: 2024-01-01*\n\n✨ Novas Features\n• Speed boost"
        );
        assert_eq!(rendered.color, UPDATE_COLOR);
    }

    #[test]
    fn test_render_all_sections_in_order() {
        let document = document_with(vec![entry_with(
            &["Feature A", "Feature B"],
            &["Fix A"],
            &["Backend A"],
        )]);

        let rendered = render(&document).unwrap();

        assert_eq!(
            rendered.body,
            "*Publicado em: 2024-01-01*\n\
             \n✨ Novas Features\n• Feature A\n• Feature B\n\
             \n🐛 Correções de Bugs\n• Fix A\n\
             \n⚙️ Backend/Outros\n• Backend A"
        );
    }

    #[test]
    fn test_render_skips_empty_sections() {
        let document = document_with(vec![entry_with(&[], &[], &["Backend A"])]);

        let rendered = render(&document).unwrap();

        assert!(!rendered.body.contains(FEATURES_HEADER));
        assert!(!rendered.body.contains(FIXES_HEADER));
        assert_eq!(
            rendered.body,
            "*Publicado em: 2024-01-01*\n\n⚙️ Backend/Outros\n• Backend A"
        );
    }

    #[test]
    fn test_render_fixes_before_backend_without_features() {
        let document = document_with(vec![entry_with(&[], &["Fix A"], &["Backend A"])]);

        let body = render(&document).unwrap().body;

        let fixes = body.find(FIXES_HEADER).unwrap();
        let backend = body.find(BACKEND_HEADER).unwrap();
        assert!(fixes < backend);
    }

    #[test]
    fn test_render_without_changes_only_has_publication_line() {
        let document = document_with(vec![entry_with(&[], &[], &[])]);

        let rendered = render(&document).unwrap();

        assert_eq!(rendered.body, "*Publicado em: 2024-01-01*\n");
    }

    #[test]
    fn test_render_uses_first_entry_only() {
        let document = document_with(vec![
            UpdateEntry::new("2.0", "Latest", "2024-03-01"),
            UpdateEntry::new("9.9", "Not latest", "2025-01-01"),
        ]);

        let rendered = render(&document).unwrap();

        assert_eq!(rendered.title, "🎉 Atualização v2.0: Latest");
        assert!(!rendered.body.contains("2025-01-01"));
    }

    #[test]
    fn test_render_empty_changelog() {
        let result = render(&ChangelogDocument::default());
        assert!(matches!(result, Err(ChangelogError::EmptyChangelog)));
    }

    #[test]
    fn test_render_missing_date() {
        let entry: UpdateEntry =
            serde_json::from_str(r#"{"version": "1.0", "title": "No date"}"#).unwrap();

        let result = render(&document_with(vec![entry]));
        assert!(matches!(
            result,
            Err(ChangelogError::MissingField { field: "date" })
        ));
    }

    #[test]
    fn test_render_is_deterministic() {
        let document = document_with(vec![entry_with(&["A"], &["B"], &["C"])]);
        let timestamp = Utc::now();

        let first = render_at(&document, timestamp).unwrap();
        let second = render_at(&document, timestamp).unwrap();

        assert_eq!(first, second);
        assert_eq!(render(&document).unwrap().body, first.body);
    }

    #[test]
    fn test_render_truncates_long_body() {
        let long_feature = "x".repeat(5000);
        let document = document_with(vec![entry_with(&[&long_feature], &[], &[])]);

        let body = render(&document).unwrap().body;

        assert_eq!(body.chars().count(), MAX_BODY_LENGTH);
        assert!(body.ends_with("..."));
        assert!(body.starts_with("*Publicado em: 2024-01-01*\n\n✨ Novas Features\n• xxx"));
    }

    #[test]
    fn test_truncate_keeps_exactly_4093_characters() {
        let body: String = "é".repeat(5000);

        let truncated = truncate(body.clone());

        let expected: String = body.chars().take(4093).collect::<String>() + "...";
        assert_eq!(truncated, expected);
        assert_eq!(truncated.chars().count(), 4096);
    }

    #[test]
    fn test_truncate_leaves_body_at_limit_untouched() {
        let body = "a".repeat(MAX_BODY_LENGTH);
        assert_eq!(truncate(body.clone()), body);

        let body = "a".repeat(MAX_BODY_LENGTH + 1);
        assert_eq!(truncate(body).chars().count(), MAX_BODY_LENGTH);
    }

    #[test]
    fn test_truncate_reserves_room_for_ellipsis_in_characters() {
        let truncated = truncate("ü".repeat(MAX_BODY_LENGTH + 10));

        let kept = truncated.strip_suffix(ELLIPSIS).unwrap();
        assert_eq!(kept.chars().count(), MAX_BODY_LENGTH - 3);
        assert!(kept.chars().all(|c| c == 'ü'));
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        // 2000 emojis are 8000 bytes but only 2000 characters
        let body = "🎉".repeat(2000);
        assert_eq!(truncate(body.clone()), body);
    }
}
