// src/error.rs
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Numeric status codes reported across the engine boundary.
///
/// The numbering is stable so that bindings can hand it through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    FileOpen = 1,
    FileRead = 2,
    NoMem = 3,
    UnknownEndianness = 4,
    UnsupportedFormat = 5,
    BrokenFile = 6,
    FileWrite = 7,
}

#[derive(Error, Debug)]
pub enum SeisError {
    #[error("cannot open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read error: {0}")]
    FileRead(#[source] io::Error),

    #[error("write error: {0}")]
    FileWrite(#[source] io::Error),

    #[error("out of memory: cannot allocate {0} bytes")]
    NoMem(usize),

    #[error("unknown endianness: {0}")]
    UnknownEndianness(String),

    #[error("unsupported sample format code {0}")]
    UnsupportedFormat(i16),

    #[error("broken file: {0}")]
    BrokenFile(String),

    #[error("unknown trace header field: {0}")]
    UnknownField(String),

    #[error("type mismatch for {field}: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    #[error("value {value} does not fit field {field} ({format})")]
    ValueOutOfRange {
        field: String,
        format: String,
        value: String,
    },

    #[error("invalid locator for {field}: {reason}")]
    InvalidLocator { field: String, reason: String },

    #[error("cannot remap {0}: trace I/O has already started")]
    RemapAfterIo(String),

    #[error("end of data")]
    EndOfData,

    #[error("session closed")]
    SessionClosed,
}

impl SeisError {
    /// Status code of this error, or `None` for caller errors that have no
    /// file-level counterpart.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            SeisError::FileOpen { .. } => Some(ErrorCode::FileOpen),
            SeisError::FileRead(_) => Some(ErrorCode::FileRead),
            SeisError::FileWrite(_) => Some(ErrorCode::FileWrite),
            SeisError::NoMem(_) => Some(ErrorCode::NoMem),
            SeisError::UnknownEndianness(_) => Some(ErrorCode::UnknownEndianness),
            SeisError::UnsupportedFormat(_) => Some(ErrorCode::UnsupportedFormat),
            SeisError::BrokenFile(_) => Some(ErrorCode::BrokenFile),
            _ => None,
        }
    }

    /// Classify an I/O error raised while reading: a short read means the
    /// file is truncated, anything else is a read failure.
    pub(crate) fn read(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            SeisError::BrokenFile("unexpected end of file".to_string())
        } else {
            SeisError::FileRead(err)
        }
    }

    pub(crate) fn broken(msg: impl Into<String>) -> Self {
        SeisError::BrokenFile(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SeisError>;
