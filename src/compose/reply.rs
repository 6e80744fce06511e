//! Build a threaded plain-text reply to an existing message.
//!
//! The reply is a single `text/plain` part. Its header block is written in a
//! fixed order with CRLF line endings, followed by a blank line and the body
//! verbatim. The whole message is then base64url-encoded for the provider's
//! raw-message send operation.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::codec;
use crate::config::ComposeConfig;
use crate::error::{MailError, Result};
use crate::model::message::{EncodedMessage, OriginalMessageRef, ReplyDraft};

/// Subject used when the original has none.
pub const EMPTY_SUBJECT: &str = "Re: ";

/// How `In-Reply-To` and `References` are filled in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ThreadingMode {
    /// Both headers carry the provider's opaque message id. The provider
    /// threads by `threadId`, so this is what existing clients expect.
    #[default]
    ProviderId,
    /// Thread on the original's `Message-Id` header, appending it to the
    /// original `References` chain. Falls back to the provider id when the
    /// original has no `Message-Id`.
    MessageId,
}

/// Composes replies. Cheap to build; holds no per-message state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyComposer {
    from: String,
    threading: ThreadingMode,
}

impl Default for ReplyComposer {
    fn default() -> Self {
        Self {
            from: "me".to_string(),
            threading: ThreadingMode::ProviderId,
        }
    }
}

impl ReplyComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ComposeConfig) -> Self {
        Self {
            from: config.from.clone(),
            threading: config.threading,
        }
    }

    /// Value written to the `From` header. The provider substitutes the
    /// authenticated account for the literal `me`.
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    pub fn with_threading(mut self, threading: ThreadingMode) -> Self {
        self.threading = threading;
        self
    }

    /// Resolve recipient, subject, and threading for a reply.
    ///
    /// Fails with [`MailError::NoRecipient`] when the original has neither a
    /// non-empty `From` nor `To` header.
    pub fn draft(&self, original: &OriginalMessageRef, reply_body: &str) -> Result<ReplyDraft> {
        let headers = &original.headers;

        // An empty `From` counts as absent; any other value is used as-is.
        let recipient = headers
            .get("from")
            .filter(|v| !v.is_empty())
            .or_else(|| headers.get("to").filter(|v| !v.is_empty()))
            .ok_or(MailError::NoRecipient)?;

        let subject = normalize_subject(headers.get("subject"));

        let (in_reply_to, references) = match self.threading {
            ThreadingMode::ProviderId => (original.id.clone(), original.id.clone()),
            ThreadingMode::MessageId => match non_blank(headers.get("message-id")) {
                Some(message_id) => {
                    let references = match non_blank(headers.get("references")) {
                        Some(chain) => format!("{} {}", chain.trim(), message_id.trim()),
                        None => message_id.trim().to_string(),
                    };
                    (message_id.trim().to_string(), references)
                }
                None => {
                    debug!(id = %original.id, "No Message-Id on original, threading on provider id");
                    (original.id.clone(), original.id.clone())
                }
            },
        };

        Ok(ReplyDraft {
            from: self.from.clone(),
            recipient: recipient.to_string(),
            subject,
            in_reply_to,
            references,
            body_text: reply_body.to_string(),
            thread_id: original.thread_id.clone(),
        })
    }

    /// Compose and encode a reply, ready for the provider's send operation.
    pub fn compose(
        &self,
        original: &OriginalMessageRef,
        reply_body: &str,
    ) -> Result<EncodedMessage> {
        let draft = self.draft(original, reply_body)?;
        let encoded = draft.encode();
        info!(
            id = %original.id,
            thread_id = %encoded.thread_id,
            threading = ?self.threading,
            bytes = encoded.raw.len(),
            "Composed reply"
        );
        Ok(encoded)
    }
}

/// Compose a reply with the default composer (`From: me`, provider-id threading).
pub fn compose(original: &OriginalMessageRef, reply_body: &str) -> Result<EncodedMessage> {
    ReplyComposer::default().compose(original, reply_body)
}

/// Prefix `Re: ` unless the subject already starts with `Re:` (case-sensitive).
///
/// A missing or empty subject becomes `Re: `.
pub fn normalize_subject(subject: Option<&str>) -> String {
    match subject.filter(|s| !s.is_empty()) {
        None => EMPTY_SUBJECT.to_string(),
        Some(s) if s.starts_with("Re:") => s.to_string(),
        Some(s) => format!("Re: {s}"),
    }
}

impl ReplyDraft {
    /// Render the full RFC 5322 message.
    pub fn to_rfc5322(&self) -> String {
        [
            "Content-Type: text/plain; charset=\"UTF-8\"".to_string(),
            "MIME-Version: 1.0".to_string(),
            "Content-Transfer-Encoding: 7bit".to_string(),
            format!("Subject: {}", header_safe(&self.subject)),
            format!("From: {}", header_safe(&self.from)),
            format!("To: {}", header_safe(&self.recipient)),
            format!("In-Reply-To: {}", header_safe(&self.in_reply_to)),
            format!("References: {}", header_safe(&self.references)),
            String::new(),
            self.body_text.clone(),
        ]
        .join("\r\n")
    }

    /// Encode the rendered message for submission.
    pub fn encode(&self) -> EncodedMessage {
        EncodedMessage {
            raw: codec::encode_base64url(self.to_rfc5322()),
            thread_id: self.thread_id.clone(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Replace line breaks so a value cannot start a new header line.
fn header_safe(value: &str) -> Cow<'_, str> {
    if value.contains(['\r', '\n']) {
        Cow::Owned(value.replace("\r\n", " ").replace(['\r', '\n'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
