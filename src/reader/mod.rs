// src/reader/mod.rs
mod segy_reader;
mod su_reader;
mod streaming;

pub use segy_reader::SegyReader;
pub use su_reader::SuReader;
pub use streaming::{HeaderIter, TraceIter, TraceStream};

use smallvec::SmallVec;
use std::io::{Read, Seek};

/// Trait alias for Read + Seek
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Raw trace header blocks of one trace, inline for a lone standard header
pub(crate) type HeaderBlocks = SmallVec<[u8; 256]>;
