//! Load a message file of either supported format.

use std::path::Path;

use tracing::debug;

use crate::error::{MailError, Result};
use crate::parser::eml::{self, ParsedMessage};
use crate::parser::gmail::GmailMessage;

/// On-disk message formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Provider "get full message" JSON document.
    ProviderJson,
    /// Raw RFC 5322 message.
    Raw,
}

/// Guess the format from the file extension, then from the first
/// non-whitespace byte.
pub fn detect_format(path: &Path, data: &[u8]) -> SourceFormat {
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"));
    if by_extension == Some(true) {
        return SourceFormat::ProviderJson;
    }

    match data.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => SourceFormat::ProviderJson,
        _ => SourceFormat::Raw,
    }
}

/// Read and parse a message file.
pub fn load_message(path: impl AsRef<Path>) -> Result<ParsedMessage> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MailError::FileNotFound(path.to_path_buf())
        } else {
            MailError::io(path, e)
        }
    })?;

    let format = detect_format(path, &data);
    debug!(path = %path.display(), ?format, "Loading message");

    match format {
        SourceFormat::ProviderJson => {
            let json = std::str::from_utf8(&data).map_err(|e| {
                MailError::InvalidMessage(format!("{}: not UTF-8: {e}", path.display()))
            })?;
            let msg = GmailMessage::from_json(json)?;
            Ok(ParsedMessage {
                original: msg.original_ref(),
                root: msg.root_part(),
            })
        }
        SourceFormat::Raw => eml::parse_eml_bytes(&data),
    }
}
