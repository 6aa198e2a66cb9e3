// src/lib.rs
//! # seisio
//!
//! Streaming reader and writer for SEG-Y and Seismic Unix (SU) trace files.
//!
//! ## Features
//!
//! - **SEG-Y rev0/1/2**: EBCDIC text headers, binary header, extended text
//!   headers, additional trace headers and trailer stanzas
//! - **Seismic Unix**: headerless trace files with byte order detection
//! - **All sample formats**: 8/16/32/64-bit integers, IEEE floats and IBM
//!   hexadecimal floats, decoded to `f64`
//! - **Remappable trace headers**: move standard fields or add new ones at
//!   any byte offset and numeric format
//! - **Streaming**: one trace in memory at a time, forward cursor with rewind
//!
//! ## Quick Start
//!
//! ### Reading SEG-Y
//!
//! ```rust,no_run
//! use seisio::*;
//!
//! fn main() -> Result<()> {
//!     let mut reader = SegyReader::open("survey.sgy")?;
//!
//!     for line in reader.text_headers()[0].lines().take(3) {
//!         println!("{}", line);
//!     }
//!
//!     // Inline number stored at a non-standard location
//!     reader.remap_trace_header("iline", 1, 8, NumericFormat::I32)?;
//!
//!     while let Some(trace) = reader.next_trace()? {
//!         let iline = trace.header().get_int("iline")?;
//!         let peak = trace.samples().iter().fold(0.0f64, |m, s| m.max(s.abs()));
//!         println!("inline {} peak {}", iline, peak);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Writing SU
//!
//! ```rust,no_run
//! use seisio::*;
//!
//! fn main() -> Result<()> {
//!     let mut writer = SuWriter::create("shots.su")?;
//!
//!     for i in 0..10 {
//!         let mut trace = Trace::new(1000);
//!         trace.header_mut().set_int("tracl", i + 1);
//!         trace.header_mut().set_int("dt", 4000);
//!         writer.write_trace(&trace)?;
//!     }
//!
//!     writer.close()?;
//!     Ok(())
//! }
//! ```

// Modules
pub mod error;
pub mod header;
pub mod options;
pub mod reader;
pub mod sample;
pub mod trace;
pub mod types;
pub mod utils;
pub mod writer;

// Re-export commonly used types at the crate root for convenience
pub use error::{ErrorCode, Result, SeisError};

pub use types::{HeaderValue, NumericFormat};

pub use header::{BinaryHeader, FieldLocator, FieldMap, HeaderFieldSpec, TextHeader, TraceHeader};

pub use options::{ExtendedFieldPolicy, ReaderOptions};

pub use trace::Trace;

pub use utils::{ascii_to_ebcdic, ebcdic_to_ascii, Endianness};

// Reader exports
pub use reader::{HeaderIter, ReadSeek, SegyReader, SuReader, TraceIter, TraceStream};

// Writer exports
pub use writer::{SegyWriter, SegyWriterBuilder, SuWriter};

// Prelude module for glob imports
pub mod prelude {
    //! Convenient imports for common use cases.
    //!
    //! ```rust
    //! use seisio::prelude::*;
    //! ```

    pub use crate::error::{Result, SeisError};
    pub use crate::header::{BinaryHeader, TextHeader, TraceHeader};
    pub use crate::reader::{SegyReader, SuReader, TraceStream};
    pub use crate::trace::Trace;
    pub use crate::types::{HeaderValue, NumericFormat};
    pub use crate::utils::Endianness;
    pub use crate::writer::{SegyWriter, SuWriter};
}

/// The library version
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!LIBRARY_VERSION.is_empty());
    }

    #[test]
    fn test_format_sizes() {
        assert_eq!(NumericFormat::I8.size(), 1);
        assert_eq!(NumericFormat::U16.size(), 2);
        assert_eq!(NumericFormat::I32.size(), 4);
        assert_eq!(NumericFormat::B64.size(), 4);
        assert_eq!(NumericFormat::F64.size(), 8);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SeisError::UnsupportedFormat(4).code(), Some(ErrorCode::UnsupportedFormat));
        assert_eq!(SeisError::EndOfData.code(), None);
        assert_eq!(SeisError::UnknownField("x".into()).code(), None);
    }

    #[test]
    fn test_header_sizes() {
        assert_eq!(header::TEXT_HEADER_SIZE, 3200);
        assert_eq!(header::BINARY_HEADER_SIZE, 400);
        assert_eq!(header::TRACE_HEADER_SIZE, 240);
        assert_eq!(header::END_TEXT_STANZA, "((SEG: EndText))");
    }

    #[test]
    fn test_ebcdic_reexports() {
        let ebcdic = ascii_to_ebcdic(b"C 1 SEG-Y");
        assert_eq!(ebcdic_to_ascii(&ebcdic), b"C 1 SEG-Y");
    }

    #[test]
    fn test_trace_stream_is_object_safe() {
        let mut writer = SuWriter::from_writer(Vec::new(), Endianness::Little);
        writer.write_trace(&test_helpers::ramp_trace(1.0, 2)).unwrap();
        let bytes = writer.finish().unwrap();

        let mut reader = SuReader::from_reader(std::io::Cursor::new(bytes), ReaderOptions::default()).unwrap();
        let source: &mut dyn TraceStream = &mut reader;
        let traces: Vec<Trace> = TraceIter::new(source).collect::<Result<_>>().unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].samples(), &[1.0, 2.0]);
    }
}
