//! Adapter for the Gmail API "get full message" document
//! (`users.messages.get` with `format=full`).
//!
//! Only the fields body resolution and reply composition need are modelled;
//! everything else in the document is ignored.

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::model::header::{Headers, MessageHeader};
use crate::model::message::OriginalMessageRef;
use crate::model::part::MimePart;

/// A message as returned by the provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailMessage {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub payload: Option<GmailPayload>,
}

/// One node of the provider's MIME tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailPayload {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub headers: Option<Vec<MessageHeader>>,
    #[serde(default)]
    pub body: Option<GmailBody>,
    #[serde(default)]
    pub parts: Option<Vec<GmailPayload>>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Body of a provider part. `data` is base64url; attachments carry an id instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailBody {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub attachment_id: Option<String>,
}

impl GmailMessage {
    /// Parse a provider JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let msg: Self = serde_json::from_str(json)?;
        debug!(id = %msg.id, thread_id = %msg.thread_id, "Parsed provider message");
        Ok(msg)
    }

    /// Top-level headers of the message.
    pub fn headers(&self) -> Headers {
        self.payload
            .as_ref()
            .and_then(|p| p.headers.clone())
            .map(Headers::from)
            .unwrap_or_default()
    }

    /// The content tree as a [`MimePart`].
    ///
    /// A message without a payload becomes an empty container.
    pub fn root_part(&self) -> MimePart {
        match &self.payload {
            Some(payload) => payload.to_mime_part(),
            None => MimePart::multipart("multipart/mixed", Vec::new()),
        }
    }

    /// Reference used to build a reply to this message.
    pub fn original_ref(&self) -> OriginalMessageRef {
        OriginalMessageRef {
            id: self.id.clone(),
            thread_id: self.thread_id.clone(),
            headers: self.headers(),
        }
    }
}

impl GmailPayload {
    /// Convert this node (and its descendants) into a [`MimePart`].
    pub fn to_mime_part(&self) -> MimePart {
        let mime_type = self.mime_type.clone().unwrap_or_default();

        if let Some(parts) = self.parts.as_ref().filter(|p| !p.is_empty()) {
            return MimePart::Multipart {
                mime_type,
                children: parts.iter().map(Self::to_mime_part).collect(),
            };
        }

        // Attachments never compete as body candidates, even when small
        // enough for the provider to inline their data.
        let data = if self.is_attachment() {
            None
        } else {
            self.body.as_ref().and_then(|b| b.data.clone())
        };

        MimePart::Leaf {
            mime_type,
            charset: self.charset(),
            data,
        }
    }

    /// Whether this part is a file attachment rather than message text.
    pub fn is_attachment(&self) -> bool {
        let has_filename = self.filename.as_deref().is_some_and(|f| !f.is_empty());
        let has_attachment_id = self
            .body
            .as_ref()
            .is_some_and(|b| b.attachment_id.is_some());
        has_filename || has_attachment_id
    }

    /// The `charset` parameter of this part's own Content-Type header.
    fn charset(&self) -> Option<String> {
        let headers = self.headers.as_deref()?;
        let content_type = headers.iter().find(|h| h.is("content-type"))?;
        content_type_param(&content_type.value, "charset")
    }
}

/// Extract a parameter from a Content-Type value, e.g. `charset` from
/// `text/plain; charset="ISO-8859-1"`.
pub fn content_type_param(value: &str, name: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|param| {
        let (key, val) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case(name) {
            Some(val.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}
