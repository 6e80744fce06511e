//! `mailreply`: body resolution and reply composition for provider mail.
//!
//! This crate extracts the best textual body from an arbitrarily nested MIME
//! part tree, and composes correctly threaded plain-text replies encoded for
//! a mail provider's raw-message send operation. Network access, sign-in and
//! text generation belong to the calling layer.

pub mod codec;
pub mod compose;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod preview;

pub use compose::reply::{compose, ReplyComposer, ThreadingMode};
pub use error::{MailError, Result};
pub use model::header::{Headers, MessageHeader};
pub use model::message::{EncodedMessage, MessagePreview, OriginalMessageRef, ReplyDraft};
pub use model::part::MimePart;
pub use parser::body::{resolve, resolve_required, resolve_with, BodyKind, ResolveOptions};
