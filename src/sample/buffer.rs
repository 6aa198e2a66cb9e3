// src/sample/buffer.rs
use crate::types::NumericFormat;
use crate::utils::Endianness;
use bytes::BytesMut;
use std::mem;

/// Reusable encoded sample block
///
/// The writers keep one per session and clear it between traces, so
/// steady-state writing does not allocate.
///
/// # Example
///
/// ```
/// use seisio::sample::SampleBuffer;
/// use seisio::{Endianness, NumericFormat};
///
/// let mut buffer = SampleBuffer::new(NumericFormat::I16, Endianness::Big);
/// buffer.write_f64(42.0);
/// buffer.write_slice(&[1.0, 2.0]);
///
/// assert_eq!(buffer.value_count(), 3);
/// assert_eq!(buffer.byte_len(), 6);
/// ```
pub struct SampleBuffer {
    buffer: BytesMut,
    format: NumericFormat,
    endianness: Endianness,
    value_count: u64,
}

impl SampleBuffer {
    /// Create a new buffer with default capacity (8192 bytes)
    pub fn new(format: NumericFormat, endianness: Endianness) -> Self {
        Self::with_capacity(format, endianness, 8192)
    }

    pub fn with_capacity(format: NumericFormat, endianness: Endianness, capacity: usize) -> Self {
        SampleBuffer {
            buffer: BytesMut::with_capacity(capacity),
            format,
            endianness,
            value_count: 0,
        }
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_slice(std::slice::from_ref(&value));
    }

    /// Encode and append a slice of samples
    pub fn write_slice(&mut self, values: &[f64]) {
        super::encode_into(values, self.format, self.endianness, &mut self.buffer);
        self.value_count += values.len() as u64;
    }

    pub fn format(&self) -> NumericFormat {
        self.format
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn value_count(&self) -> u64 {
        self.value_count
    }

    pub fn byte_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Clear the buffer, keeping its allocation
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.value_count = 0;
    }

    /// Take the buffer contents, leaving an empty buffer
    pub fn take(&mut self) -> BytesMut {
        self.value_count = 0;
        mem::take(&mut self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer() {
        let buffer = SampleBuffer::new(NumericFormat::F32, Endianness::Big);
        assert_eq!(buffer.value_count(), 0);
        assert_eq!(buffer.byte_len(), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear_and_reuse() {
        let mut buffer = SampleBuffer::new(NumericFormat::F64, Endianness::Little);
        buffer.write_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(buffer.byte_len(), 24);

        buffer.clear();
        assert!(buffer.is_empty());
        buffer.write_f64(4.0);
        assert_eq!(buffer.value_count(), 1);
        assert_eq!(buffer.as_bytes(), &4.0f64.to_le_bytes());
    }

    #[test]
    fn test_take() {
        let mut buffer = SampleBuffer::new(NumericFormat::B64, Endianness::Big);
        buffer.write_f64(-118.625);
        let bytes = buffer.take();
        assert_eq!(&bytes[..], &[0xC2, 0x76, 0xA0, 0x00]);
        assert!(buffer.is_empty());
        assert_eq!(buffer.value_count(), 0);
    }
}
