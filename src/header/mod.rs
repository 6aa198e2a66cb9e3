// src/header/mod.rs
//! File and trace header codecs.
//!
//! A SEG-Y file starts with a 3200-byte [`TextHeader`], a 400-byte
//! [`BinaryHeader`] and optional extended text headers. Every trace starts
//! with one or more 240-byte trace header blocks whose fields are located by
//! a [`FieldMap`] and decoded into a [`TraceHeader`].

mod binary;
mod field_map;
mod text;
mod trace_header;

pub use binary::BinaryHeader;
pub use field_map::{FieldLocator, FieldMap, HeaderFieldSpec};
pub use text::TextHeader;
pub use trace_header::TraceHeader;

pub const TEXT_HEADER_SIZE: usize = 3200;
pub const BINARY_HEADER_SIZE: usize = 400;
pub const TRACE_HEADER_SIZE: usize = 240;

/// First bytes of the stanza closing a variable-length run of extended text
/// headers
pub const END_TEXT_STANZA: &str = "((SEG: EndText))";
