//! Core data model types: MIME part trees, headers, and reply artifacts.

pub mod header;
pub mod message;
pub mod part;
