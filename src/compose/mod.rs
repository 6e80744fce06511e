//! Reply composition: threading headers, subject normalization, and
//! transport encoding of outgoing replies.

pub mod reply;
