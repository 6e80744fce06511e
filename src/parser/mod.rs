//! Message parsing: provider JSON and raw `.eml` adapters, file loading,
//! and body resolution.

pub mod body;
pub mod eml;
pub mod gmail;
pub mod source;
