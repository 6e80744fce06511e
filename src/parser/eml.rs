//! Adapter for raw RFC 5322 messages (`.eml` files).
//!
//! `mail-parser` does the MIME work. Each text leaf is re-encoded as
//! base64url UTF-8 so body resolution sees the same tree shape the provider
//! adapter produces.

use std::borrow::Cow;

use mail_parser::{Header, HeaderValue, Message, MessageParser, MimeHeaders, PartType};

use crate::codec;
use crate::error::{MailError, Result};
use crate::model::header::{Headers, MessageHeader};
use crate::model::message::OriginalMessageRef;
use crate::model::part::MimePart;

/// Headers whose raw value is kept. `mail-parser` strips the angle brackets
/// from message ids, which threading needs intact.
const ID_HEADERS: [&str; 3] = ["message-id", "in-reply-to", "references"];

/// A loaded message split into the pieces the core works on.
#[derive(Debug, Clone)]
pub struct ParsedMessage {
    pub original: OriginalMessageRef,
    pub root: MimePart,
}

/// Parse raw RFC 5322 message bytes.
///
/// The message id is the `Message-ID` value without angle brackets. The
/// thread id is the root of the `References` chain, else `In-Reply-To`,
/// else the message's own id.
pub fn parse_eml_bytes(data: &[u8]) -> Result<ParsedMessage> {
    let message = MessageParser::default()
        .parse(data)
        .ok_or_else(|| MailError::InvalidMessage("not an RFC 5322 message".into()))?;

    let headers: Headers = message
        .headers()
        .iter()
        .map(|h| MessageHeader::new(h.name.as_str(), header_text(data, h)))
        .collect();

    let root = build_part(&message, 0);

    let id = headers.get("message-id").map(bare_id).unwrap_or_default();

    let thread_id = headers
        .get("references")
        .and_then(|refs| refs.split_whitespace().next())
        .or_else(|| headers.get("in-reply-to"))
        .map(bare_id)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| id.clone());

    tracing::debug!(%id, %thread_id, parts = message.parts.len(), "Parsed raw message");

    Ok(ParsedMessage {
        original: OriginalMessageRef {
            id,
            thread_id,
            headers,
        },
        root,
    })
}

/// Header value as text: decoded for unstructured headers, otherwise the
/// raw value. Either way folded lines are joined.
fn header_text(data: &[u8], header: &Header<'_>) -> String {
    let name = header.name.as_str();
    if let HeaderValue::Text(text) = &header.value {
        if !ID_HEADERS.iter().any(|id| name.eq_ignore_ascii_case(id)) {
            return unfold(text);
        }
    }

    let raw = data
        .get(header.offset_start..header.offset_end)
        .map(String::from_utf8_lossy)
        .unwrap_or(Cow::Borrowed(""));
    unfold(&raw)
}

fn unfold(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A message id without surrounding whitespace or angle brackets.
fn bare_id(value: &str) -> String {
    value
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_string()
}

/// Rebuild the part with index `part_id` (and its children) as a [`MimePart`].
fn build_part(message: &Message<'_>, part_id: usize) -> MimePart {
    let Some(part) = message.parts.get(part_id) else {
        return MimePart::empty_leaf("application/octet-stream");
    };

    let mime_type = part
        .content_type()
        .map(|ct| match ct.subtype() {
            Some(sub) => format!("{}/{}", ct.ctype(), sub),
            None => ct.ctype().to_string(),
        })
        .unwrap_or_else(|| default_mime_type(&part.body).to_string());

    let is_attachment = part
        .content_disposition()
        .is_some_and(|d| d.ctype().eq_ignore_ascii_case("attachment"));

    match &part.body {
        PartType::Multipart(children) => MimePart::Multipart {
            mime_type,
            children: children
                .iter()
                .map(|&child| build_part(message, child))
                .collect(),
        },
        PartType::Text(text) | PartType::Html(text) if !is_attachment => MimePart::Leaf {
            mime_type,
            // mail-parser has already converted the declared charset to UTF-8
            charset: Some("utf-8".to_string()),
            data: Some(codec::encode_base64url(text.as_bytes())),
        },
        _ => MimePart::Leaf {
            mime_type,
            charset: None,
            data: None,
        },
    }
}

fn default_mime_type(body: &PartType<'_>) -> &'static str {
    match body {
        PartType::Text(_) => "text/plain",
        PartType::Html(_) => "text/html",
        PartType::Multipart(_) => "multipart/mixed",
        PartType::Message(_) => "message/rfc822",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::body;

    const ALTERNATIVE: &[u8] = b"From: Alice <alice@example.com>\r\n\
To: bob@example.com\r\n\
Subject: Quarterly numbers\r\n\
Message-ID: <abc123@example.com>\r\n\
References: <root@example.com> <mid@example.com>\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/alternative; boundary=\"XX\"\r\n\
\r\n\
--XX\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<p>Numbers attached</p>\r\n\
--XX\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Numbers attached\r\n\
--XX--\r\n";

    #[test]
    fn test_parse_alternative_tree() {
        let parsed = parse_eml_bytes(ALTERNATIVE).unwrap();
        assert!(parsed.root.is_type("multipart/alternative"));
        assert_eq!(parsed.root.children().len(), 2);
        assert!(body::resolve(&parsed.root).starts_with("Numbers attached"));
    }

    #[test]
    fn test_parse_ids() {
        let parsed = parse_eml_bytes(ALTERNATIVE).unwrap();
        assert_eq!(parsed.original.id, "abc123@example.com");
        assert_eq!(parsed.original.thread_id, "root@example.com");
        assert_eq!(
            parsed.original.headers.get("subject"),
            Some("Quarterly numbers")
        );
    }

    #[test]
    fn test_single_part_without_message_id() {
        let raw = b"From: a@b.com\nSubject: Hi\n\nJust a body\n";
        let parsed = parse_eml_bytes(raw).unwrap();
        assert_eq!(parsed.original.id, "");
        assert_eq!(parsed.original.thread_id, "");
        assert!(body::resolve(&parsed.root).starts_with("Just a body"));
    }

    #[test]
    fn test_encoded_and_folded_headers() {
        let raw = b"From: =?ISO-8859-1?Q?Andr=E9?= <andre@example.com>\r\n\
Subject: =?UTF-8?B?T2zDoSBtdW5kbw==?=\r\n\
References: <a@example.com>\r\n <b@example.com>\r\n\
X-Tracking: one\r\n\ttwo\r\n\
\r\n\
Body\r\n";
        let parsed = parse_eml_bytes(raw).unwrap();
        let headers = &parsed.original.headers;
        assert_eq!(headers.get("subject"), Some("Olá mundo"));
        assert_eq!(
            headers.get("references"),
            Some("<a@example.com> <b@example.com>")
        );
        assert_eq!(headers.get("x-tracking"), Some("one two"));
        assert_eq!(parsed.original.thread_id, "a@example.com");
    }

    #[test]
    fn test_in_reply_to_used_as_thread_when_no_references() {
        let raw = b"Message-ID: <c@x>\nIn-Reply-To: <p@x>\n\nHi\n";
        let parsed = parse_eml_bytes(raw).unwrap();
        assert_eq!(parsed.original.id, "c@x");
        assert_eq!(parsed.original.thread_id, "p@x");
        assert_eq!(parsed.original.headers.get("In-Reply-To"), Some("<p@x>"));
    }

    #[test]
    fn test_unfold() {
        assert_eq!(unfold(" one\r\n\ttwo  three\r\n"), "one two  three");
    }

    #[test]
    fn test_bare_id() {
        assert_eq!(bare_id(" <abc@x> "), "abc@x");
        assert_eq!(bare_id("m1"), "m1");
    }
}
