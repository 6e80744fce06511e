//! Message previews for list views, and HTML-to-text reduction.

use crate::config::PreviewConfig;
use crate::model::header::Headers;
use crate::model::message::MessagePreview;
use crate::model::part::MimePart;
use crate::parser::body::{self, BodyKind, ResolveOptions};

/// Build the list-view preview of one message.
///
/// Missing subjects and bodies are replaced by the configured placeholders.
pub fn build_preview(
    id: &str,
    headers: &Headers,
    root: &MimePart,
    options: &ResolveOptions,
    config: &PreviewConfig,
) -> MessagePreview {
    let subject = headers
        .get("subject")
        .filter(|s| !s.is_empty())
        .unwrap_or(config.empty_subject.as_str())
        .to_string();

    let text = match body::resolve_with(root, options) {
        Some(resolved) if resolved.kind == BodyKind::Html && config.strip_html => {
            html_to_text(&resolved.text)
        }
        Some(resolved) => resolved.text,
        None => String::new(),
    };

    let body = if text.is_empty() {
        config.empty_body.clone()
    } else {
        truncate_chars(text, config.max_chars)
    };

    MessagePreview {
        id: id.to_string(),
        subject,
        body,
    }
}

/// Keep at most `max` characters (0 = unlimited), appending `…` when cut.
fn truncate_chars(text: String, max: usize) -> String {
    if max == 0 {
        return text;
    }
    match text.char_indices().nth(max) {
        Some((cut, _)) => {
            let mut out = text[..cut].trim_end().to_string();
            out.push('…');
            out
        }
        None => text,
    }
}

/// Column width previews are wrapped to when HTML is reduced to text.
const HTML_WRAP_WIDTH: usize = 120;

/// Reduce an HTML body to readable text.
///
/// Falls back to the HTML itself if the renderer panics on malformed input.
pub fn html_to_text(html: &str) -> String {
    let rendered = std::panic::catch_unwind(|| {
        html2text::from_read(html.as_bytes(), HTML_WRAP_WIDTH)
    });

    match rendered {
        Ok(text) => text
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
        Err(_) => {
            tracing::warn!("HTML rendering failed, keeping raw HTML in preview");
            html.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_base64url;
    use crate::model::header::MessageHeader;

    fn headers(subject: Option<&str>) -> Headers {
        subject
            .map(|s| MessageHeader::new("Subject", s))
            .into_iter()
            .collect()
    }

    #[test]
    fn test_preview_defaults() {
        let root = MimePart::multipart("multipart/mixed", vec![]);
        let preview = build_preview(
            "m1",
            &headers(None),
            &root,
            &ResolveOptions::default(),
            &PreviewConfig::default(),
        );
        assert_eq!(preview.id, "m1");
        assert_eq!(preview.subject, "No Subject");
        assert_eq!(preview.body, "No body content");
    }

    #[test]
    fn test_preview_plain() {
        let root = MimePart::leaf("text/plain", encode_base64url("See you at 5"));
        let preview = build_preview(
            "m1",
            &headers(Some("Meeting")),
            &root,
            &ResolveOptions::default(),
            &PreviewConfig::default(),
        );
        assert_eq!(preview.subject, "Meeting");
        assert_eq!(preview.body, "See you at 5");
    }

    #[test]
    fn test_preview_html_kept_by_default() {
        let root = MimePart::leaf("text/html", encode_base64url("<p>Hi &amp; bye</p>"));
        let preview = build_preview(
            "m1",
            &headers(Some("x")),
            &root,
            &ResolveOptions::default(),
            &PreviewConfig::default(),
        );
        assert_eq!(preview.body, "<p>Hi &amp; bye</p>");
    }

    #[test]
    fn test_preview_html_stripped_when_configured() {
        let root = MimePart::leaf("text/html", encode_base64url("<p>Hi &amp; bye</p>"));
        let config = PreviewConfig {
            strip_html: true,
            ..PreviewConfig::default()
        };
        let preview = build_preview(
            "m1",
            &headers(Some("x")),
            &root,
            &ResolveOptions::default(),
            &config,
        );
        assert_eq!(preview.body, "Hi & bye");
    }

    #[test]
    fn test_preview_truncates() {
        let root = MimePart::leaf("text/plain", encode_base64url("Zürich is lovely in spring"));
        let config = PreviewConfig {
            max_chars: 10,
            ..PreviewConfig::default()
        };
        let preview = build_preview(
            "m1",
            &headers(None),
            &root,
            &ResolveOptions::default(),
            &config,
        );
        assert_eq!(preview.body, "Zürich is…");
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_chars("short".to_string(), 10), "short");
        assert_eq!(truncate_chars("short".to_string(), 0), "short");
    }

    #[test]
    fn test_html_to_text_paragraphs() {
        let text = html_to_text("<p>Hello world</p><p>Second paragraph</p>");
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines, vec!["Hello world", "Second paragraph"]);
    }

    #[test]
    fn test_html_to_text_entities() {
        assert_eq!(html_to_text("Tom &amp; Jerry &lt;3&gt;"), "Tom & Jerry <3>");
    }

    #[test]
    fn test_html_to_text_plain_input_unchanged() {
        assert_eq!(html_to_text("no markup here"), "no markup here");
    }
}
