//! Rendering of a changelog update as a Matrix message.
//!
//! Matrix has no embeds, so the update is sent as a formatted message:
//!
//! ```text
//! <h4><font data-mx-color="#57F287">🎉 Atualização v1.2: Fast Mode</font></h4>
//! <p><em>Publicado em: 2024-01-01</em></p> ...
//! <p><sub>2024-01-01 12:00 UTC</sub></p>
//! ```
//!
//! with a plain text fallback for clients that do not render HTML.

use matrix_sdk::ruma::events::room::message::{FormattedBody, RoomMessageEventContent};

use crate::changelog::RenderedUpdate;

/// Builds the message content of `update`.
pub fn update_content(update: &RenderedUpdate) -> RoomMessageEventContent {
    RoomMessageEventContent::text_html(format_plain(update), format_html(update))
}

/// Plain text version: title, body and timestamp separated by blank lines.
fn format_plain(update: &RenderedUpdate) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        update.title,
        update.body.trim_end(),
        format_timestamp(update)
    )
}

/// HTML version, the title colored with the update color.
///
/// The body is escaped before the Markdown conversion, so markup written in a
/// changelog item is shown as text.
fn format_html(update: &RenderedUpdate) -> String {
    let body = match FormattedBody::markdown(escape_html(&update.body)) {
        Some(formatted) => formatted.body,
        None => format!("<p>{}</p>", escape_html(&update.body).replace('\n', "<br>")),
    };

    format!(
        "<h4><font data-mx-color=\"#{:06X}\">{}</font></h4>\n{}\n<p><sub>{}</sub></p>",
        update.color,
        escape_html(&update.title),
        body,
        format_timestamp(update)
    )
}

fn format_timestamp(update: &RenderedUpdate) -> String {
    update.timestamp.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn create_update(title: &str, body: &str) -> RenderedUpdate {
        RenderedUpdate {
            title: title.to_string(),
            body: body.to_string(),
            color: 0x57F287,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 15, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_format_plain() {
        let update = create_update(
            "🎉 Atualização v1.2: Fast Mode",
            "*Publicado em: 2024-01-01*\n\n✨ Novas Features\n• Speed boost",
        );

        assert_eq!(
            format_plain(&update),
            "🎉 Atualização v1.2: Fast Mode\n\n\
             *Publicado em: 2024-01-01*\n\n✨ Novas Features\n• Speed boost\n\n\
             2024-01-02 15:30 UTC"
        );
    }

    #[test]
    fn test_format_plain_trims_trailing_newline_of_body() {
        let update = create_update("Title", "*Publicado em: 2024-01-01*\n");

        assert_eq!(
            format_plain(&update),
            "Title\n\n*Publicado em: 2024-01-01*\n\n2024-01-02 15:30 UTC"
        );
    }

    #[test]
    fn test_format_html_colors_title() {
        let update = create_update("🎉 Atualização v1.2: Fast Mode", "*Publicado em: 2024-01-01*\n");

        let html = format_html(&update);

        assert!(html.starts_with(
            "<h4><font data-mx-color=\"#57F287\">🎉 Atualização v1.2: Fast Mode</font></h4>"
        ));
        assert!(html.ends_with("<p><sub>2024-01-02 15:30 UTC</sub></p>"));
    }

    #[test]
    fn test_format_html_converts_markdown_body() {
        let update = create_update("Title", "*Publicado em: 2024-01-01*\n\n✨ Novas Features\n• Speed boost");

        let html = format_html(&update);

        assert!(html.contains("<em>Publicado em: 2024-01-01</em>"));
        assert!(html.contains("• Speed boost"));
    }

    #[test]
    fn test_format_html_escapes_title() {
        let update = create_update("v1 <beta> & co", "*date*");

        let html = format_html(&update);

        assert!(html.contains("v1 &lt;beta&gt; &amp; co"));
    }

    #[test]
    fn test_format_html_escapes_markup_in_body() {
        let update = create_update(
            "Title",
            "*Publicado em: 2024-01-01*\n\n✨ Novas Features\n• <img src=x onerror=alert(1)> & Vec<u8>",
        );

        let html = format_html(&update);

        assert!(html.contains("<em>Publicado em: 2024-01-01</em>"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt; &amp; Vec&lt;u8&gt;"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("<u8>"));
    }

    #[test]
    fn test_format_html_body_without_markdown_is_escaped_once() {
        let update = create_update("Title", "Vec<u8> & co");

        let html = format_html(&update);

        assert!(html.contains("Vec&lt;u8&gt; &amp; co"));
        assert!(!html.contains("&amp;lt;"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }
}
