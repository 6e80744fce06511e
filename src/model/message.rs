//! Original-message references and the artifacts produced when replying.

use serde::{Deserialize, Serialize};

use super::header::Headers;

/// The subset of an existing message needed to build a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalMessageRef {
    /// Opaque provider-assigned message identifier.
    pub id: String,
    /// Opaque identifier of the conversation the message belongs to.
    pub thread_id: String,
    /// Headers of the original message, in provider order.
    #[serde(default)]
    pub headers: Headers,
}

/// A fully resolved reply, before serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyDraft {
    /// Value written to the `From` header.
    pub from: String,
    /// Value written to the `To` header (the original sender).
    pub recipient: String,
    /// `Re:`-normalized subject.
    pub subject: String,
    pub in_reply_to: String,
    pub references: String,
    /// Plain-text body, written verbatim after the header block.
    pub body_text: String,
    /// Conversation to attach the reply to at the provider level.
    pub thread_id: String,
}

/// A raw message encoded for the provider's send operation.
///
/// Serializes to the send-request body: `{"raw": "...", "threadId": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedMessage {
    /// Base64url (no padding) of the full RFC 5322 message.
    pub raw: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub thread_id: String,
}

/// Per-message summary shown in list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePreview {
    pub id: String,
    pub subject: String,
    pub body: String,
}
