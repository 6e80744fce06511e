//! Body resolution: pick the best textual rendition out of a MIME part tree.
//!
//! The policy is "first `text/plain` wins, otherwise the last `text/html`".
//! Parts are visited depth-first in document order, so a plain-text part
//! nested in a later `multipart/alternative` still beats HTML seen earlier.
//! HTML is returned untouched; callers that need prose must reduce it
//! themselves (see [`crate::preview::html_to_text`]).

use tracing::{debug, warn};

use crate::codec;
use crate::error::{MailError, Result};
use crate::model::part::MimePart;

/// Knobs for [`resolve_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Reject malformed base64 and fall through to the next candidate part,
    /// instead of decoding it on a best-effort basis.
    pub strict: bool,
}

/// Which kind of part a resolved body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Plain,
    Html,
}

/// A resolved body together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBody {
    pub text: String,
    pub kind: BodyKind,
}

/// Resolve the best textual body of a message with lenient decoding.
///
/// Returns an empty string when the tree holds no `text/plain` or
/// `text/html` leaf with body data.
pub fn resolve(root: &MimePart) -> String {
    resolve_with(root, &ResolveOptions::default())
        .map(|body| body.text)
        .unwrap_or_default()
}

/// Like [`resolve`], but an empty result is an error.
///
/// For call sites (summarization, reply drafting) that cannot proceed
/// without a body.
pub fn resolve_required(root: &MimePart, options: &ResolveOptions) -> Result<String> {
    match resolve_with(root, options) {
        Some(body) if !body.text.is_empty() => Ok(body.text),
        _ => Err(MailError::NoBodyFound),
    }
}

/// Resolve the best textual body, reporting where it came from.
///
/// `None` means no candidate part could be decoded.
pub fn resolve_with(root: &MimePart, options: &ResolveOptions) -> Option<ResolvedBody> {
    let mut html: Option<String> = None;

    // A root without children is scanned as a one-element sequence.
    let mut stack: Vec<std::slice::Iter<'_, MimePart>> = vec![std::slice::from_ref(root).iter()];

    while let Some(level) = stack.last_mut() {
        let Some(part) = level.next() else {
            stack.pop();
            continue;
        };

        if !part.children().is_empty() {
            stack.push(part.children().iter());
            continue;
        }

        let Some(data) = part.body_data() else {
            continue;
        };

        if part.is_type("text/plain") {
            if let Some(text) = decode_part(part, data, options) {
                debug!(depth = stack.len(), "Resolved body from text/plain part");
                return Some(ResolvedBody {
                    text,
                    kind: BodyKind::Plain,
                });
            }
        } else if part.is_type("text/html") {
            if let Some(text) = decode_part(part, data, options) {
                debug!(depth = stack.len(), "Holding text/html part as fallback");
                html = Some(text);
            }
        }
    }

    html.map(|text| ResolvedBody {
        text,
        kind: BodyKind::Html,
    })
}

/// Decode a leaf's payload, or `None` when strict decoding rejects it.
fn decode_part(part: &MimePart, data: &str, options: &ResolveOptions) -> Option<String> {
    let bytes = if options.strict {
        match codec::decode_base64_strict(data) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    mime_type = part.mime_type(),
                    error = %e,
                    "Skipping part with malformed body data"
                );
                return None;
            }
        }
    } else {
        codec::decode_base64(data)
    };

    Some(codec::decode_text(&bytes, part.charset()))
}
