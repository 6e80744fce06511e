//! Shared transfer-encoding primitives: base64 body decoding, charset decoding,
//! and base64url encoding of outgoing raw messages.
//!
//! Providers are inconsistent about the alphabet they use for body data (the
//! Gmail API uses base64url, `.eml` bodies use the standard alphabet) and about
//! padding, so decoding accepts both alphabets with or without padding.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

use crate::error::{MailError, Result};

/// Decoder that never rejects padding or stray trailing bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decoder that accepts optional padding but nothing else out of place.
const STRICT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a base64 payload on a best-effort basis.
///
/// Characters outside the base64 alphabets (including whitespace and `=`) are
/// skipped, and a dangling final symbol that cannot form a byte is dropped.
/// The result is whatever bytes the remaining symbols encode; this never fails.
pub fn decode_base64(data: &str) -> Vec<u8> {
    let mut symbols: String = data.chars().filter_map(to_url_safe).collect();
    let skipped = data.chars().filter(|c| !c.is_ascii_whitespace()).count() - symbols.len();

    if symbols.len() % 4 == 1 {
        symbols.pop();
    }
    if skipped > 0 {
        debug!(skipped, "Skipped non-alphabet characters in base64 payload");
    }

    LENIENT.decode(symbols.as_bytes()).unwrap_or_else(|e| {
        warn!(error = %e, "Best-effort base64 decoding failed, using empty payload");
        Vec::new()
    })
}

/// Decode a base64 payload, rejecting anything malformed.
///
/// Whitespace (line wrapping) and trailing padding are allowed; any other
/// character outside the standard or URL-safe alphabet is an error.
pub fn decode_base64_strict(data: &str) -> Result<Vec<u8>> {
    let compact: String = data
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let unpadded = compact.trim_end_matches('=');
    if compact.len() - unpadded.len() > 2 {
        return Err(MailError::Decode("too much padding".into()));
    }

    let mut symbols = String::with_capacity(unpadded.len());
    for (pos, ch) in unpadded.chars().enumerate() {
        match to_url_safe(ch) {
            Some(s) => symbols.push(s),
            None => {
                return Err(MailError::Decode(format!(
                    "invalid character {ch:?} at position {pos}"
                )))
            }
        }
    }

    Ok(STRICT.decode(symbols.as_bytes())?)
}

/// Decode body bytes to text using the declared charset.
///
/// Unknown or missing charsets fall back to UTF-8. Invalid sequences are
/// replaced with U+FFFD rather than rejected.
pub fn decode_text(bytes: &[u8], charset: Option<&str>) -> String {
    let encoding = charset
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(
            encoding = used.name(),
            "Replaced malformed sequences while decoding body"
        );
    }
    text.into_owned()
}

/// Encode bytes as URL-safe base64 without padding or line wrapping.
pub fn encode_base64url(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Map a character of either base64 alphabet to its URL-safe form.
fn to_url_safe(c: char) -> Option<char> {
    match c {
        'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' => Some(c),
        '+' => Some('-'),
        '/' => Some('_'),
        _ => None,
    }
}
