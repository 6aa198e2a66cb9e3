// src/sample/reader.rs
use crate::error::{Result, SeisError};
use crate::types::NumericFormat;
use crate::utils::Endianness;
use std::io::Read;

/// Reads sample blocks from a stream and decodes them to `f64`
///
/// Holds a scratch buffer for the raw bytes so that consecutive traces of the
/// same length reuse one allocation.
///
/// # Example
///
/// ```
/// use seisio::sample::SampleReader;
/// use seisio::{Endianness, NumericFormat};
/// use std::io::Cursor;
///
/// let data = vec![0u8, 1, 0, 2, 0xFF, 0xFF];
/// let mut cursor = Cursor::new(data);
///
/// let mut reader = SampleReader::new();
/// let values = reader.read_samples(&mut cursor, NumericFormat::I16, 3, Endianness::Big).unwrap();
/// assert_eq!(values, vec![1.0, 2.0, -1.0]);
/// ```
#[derive(Debug, Default)]
pub struct SampleReader {
    scratch: Vec<u8>,
}

impl SampleReader {
    pub fn new() -> Self {
        SampleReader { scratch: Vec::new() }
    }

    /// Read `count` samples of `format` and decode them
    pub fn read_samples<R: Read>(
        &mut self,
        reader: &mut R,
        format: NumericFormat,
        count: usize,
        endianness: Endianness,
    ) -> Result<Vec<f64>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        self.fill(reader, count, format.size())?;
        super::decode(&self.scratch, format, count, endianness)
    }

    /// Read `count` samples of `format` without decoding them
    pub fn skip_samples<R: Read>(&mut self, reader: &mut R, format: NumericFormat, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        self.fill(reader, count, format.size())
    }

    fn fill<R: Read>(&mut self, reader: &mut R, count: usize, size: usize) -> Result<()> {
        let byte_count = count
            .checked_mul(size)
            .ok_or_else(|| SeisError::broken(format!("sample count {} overflows", count)))?;

        self.scratch.clear();
        self.scratch
            .try_reserve_exact(byte_count)
            .map_err(|_| SeisError::NoMem(byte_count))?;
        self.scratch.resize(byte_count, 0);

        reader.read_exact(&mut self.scratch).map_err(SeisError::read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_short_stream_is_broken_file() {
        let mut cursor = Cursor::new(vec![0u8; 6]);
        let mut reader = SampleReader::new();
        let err = reader
            .read_samples(&mut cursor, NumericFormat::F32, 2, Endianness::Big)
            .unwrap_err();
        assert!(matches!(err, SeisError::BrokenFile(_)));
    }

    #[test]
    fn test_consecutive_blocks() {
        let mut data = Vec::new();
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&(-2.0f32).to_le_bytes());
        let mut cursor = Cursor::new(data);
        let mut reader = SampleReader::new();

        let first = reader.read_samples(&mut cursor, NumericFormat::F32, 1, Endianness::Little).unwrap();
        let second = reader.read_samples(&mut cursor, NumericFormat::F32, 1, Endianness::Little).unwrap();
        assert_eq!(first, vec![1.5]);
        assert_eq!(second, vec![-2.0]);
    }

    #[test]
    fn test_zero_count() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = SampleReader::new();
        let values = reader.read_samples(&mut cursor, NumericFormat::F64, 0, Endianness::Big).unwrap();
        assert!(values.is_empty());
    }
}
