// src/utils/endian.rs
use crate::error::{Result, SeisError};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order of every multi-byte field and sample in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    Big,
    Little,
}

impl Endianness {
    /// Byte order of the running machine
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    pub fn is_big(&self) -> bool {
        *self == Endianness::Big
    }

    pub fn read_i16(&self, buf: &[u8]) -> i16 {
        match self {
            Endianness::Big => BigEndian::read_i16(buf),
            Endianness::Little => LittleEndian::read_i16(buf),
        }
    }

    pub fn read_u16(&self, buf: &[u8]) -> u16 {
        match self {
            Endianness::Big => BigEndian::read_u16(buf),
            Endianness::Little => LittleEndian::read_u16(buf),
        }
    }

    pub fn read_i32(&self, buf: &[u8]) -> i32 {
        match self {
            Endianness::Big => BigEndian::read_i32(buf),
            Endianness::Little => LittleEndian::read_i32(buf),
        }
    }

    pub fn read_u32(&self, buf: &[u8]) -> u32 {
        match self {
            Endianness::Big => BigEndian::read_u32(buf),
            Endianness::Little => LittleEndian::read_u32(buf),
        }
    }

    pub fn read_i64(&self, buf: &[u8]) -> i64 {
        match self {
            Endianness::Big => BigEndian::read_i64(buf),
            Endianness::Little => LittleEndian::read_i64(buf),
        }
    }

    pub fn read_u64(&self, buf: &[u8]) -> u64 {
        match self {
            Endianness::Big => BigEndian::read_u64(buf),
            Endianness::Little => LittleEndian::read_u64(buf),
        }
    }

    pub fn read_f32(&self, buf: &[u8]) -> f32 {
        match self {
            Endianness::Big => BigEndian::read_f32(buf),
            Endianness::Little => LittleEndian::read_f32(buf),
        }
    }

    pub fn read_f64(&self, buf: &[u8]) -> f64 {
        match self {
            Endianness::Big => BigEndian::read_f64(buf),
            Endianness::Little => LittleEndian::read_f64(buf),
        }
    }

    pub fn write_i16(&self, buf: &mut [u8], v: i16) {
        match self {
            Endianness::Big => BigEndian::write_i16(buf, v),
            Endianness::Little => LittleEndian::write_i16(buf, v),
        }
    }

    pub fn write_u16(&self, buf: &mut [u8], v: u16) {
        match self {
            Endianness::Big => BigEndian::write_u16(buf, v),
            Endianness::Little => LittleEndian::write_u16(buf, v),
        }
    }

    pub fn write_i32(&self, buf: &mut [u8], v: i32) {
        match self {
            Endianness::Big => BigEndian::write_i32(buf, v),
            Endianness::Little => LittleEndian::write_i32(buf, v),
        }
    }

    pub fn write_u32(&self, buf: &mut [u8], v: u32) {
        match self {
            Endianness::Big => BigEndian::write_u32(buf, v),
            Endianness::Little => LittleEndian::write_u32(buf, v),
        }
    }

    pub fn write_i64(&self, buf: &mut [u8], v: i64) {
        match self {
            Endianness::Big => BigEndian::write_i64(buf, v),
            Endianness::Little => LittleEndian::write_i64(buf, v),
        }
    }

    pub fn write_u64(&self, buf: &mut [u8], v: u64) {
        match self {
            Endianness::Big => BigEndian::write_u64(buf, v),
            Endianness::Little => LittleEndian::write_u64(buf, v),
        }
    }

    pub fn write_f32(&self, buf: &mut [u8], v: f32) {
        match self {
            Endianness::Big => BigEndian::write_f32(buf, v),
            Endianness::Little => LittleEndian::write_f32(buf, v),
        }
    }

    pub fn write_f64(&self, buf: &mut [u8], v: f64) {
        match self {
            Endianness::Big => BigEndian::write_f64(buf, v),
            Endianness::Little => LittleEndian::write_f64(buf, v),
        }
    }
}

/// Value of the SEG-Y rev2 byte order marker (binary header bytes 3297-3300)
pub const SEGY_ENDIAN_MARKER: u32 = 0x0102_0304;

/// Resolve the byte order of a SEG-Y file from its raw binary header marker.
///
/// A zero marker predates rev2 and means big-endian. The pair-swapped marker
/// `0x02010403` is valid SEG-Y but not supported by this engine.
pub fn detect_segy(marker: [u8; 4]) -> Result<Endianness> {
    match BigEndian::read_u32(&marker) {
        0 => Ok(Endianness::Big),
        SEGY_ENDIAN_MARKER => Ok(Endianness::Big),
        0x0403_0201 => Ok(Endianness::Little),
        0x0201_0403 => Err(SeisError::UnknownEndianness(
            "pair-wise swapped byte order is not supported".to_string(),
        )),
        other => Err(SeisError::UnknownEndianness(format!(
            "byte order marker {:#010x}",
            other
        ))),
    }
}

/// Resolve the byte order of an SU file from its first trace header.
///
/// SU files carry no marker, so the order is the one whose sample count
/// (`ns`, bytes 115-116) makes whole traces tile the file. When both fit,
/// the machine's native order wins.
pub fn detect_su(first_header: &[u8], file_len: u64, header_len: usize, ns_offset: usize) -> Result<Endianness> {
    let fits = |order: Endianness| {
        let ns = order.read_u16(&first_header[ns_offset..ns_offset + 2]) as u64;
        let trace_len = header_len as u64 + ns * 4;
        ns > 0 && file_len % trace_len == 0
    };

    let native = Endianness::native();
    let other = match native {
        Endianness::Big => Endianness::Little,
        Endianness::Little => Endianness::Big,
    };

    if fits(native) {
        Ok(native)
    } else if fits(other) {
        Ok(other)
    } else {
        Err(SeisError::UnknownEndianness(
            "no byte order of the first trace's ns tiles the file".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_segy_markers() {
        assert_eq!(detect_segy([1, 2, 3, 4]).unwrap(), Endianness::Big);
        assert_eq!(detect_segy([4, 3, 2, 1]).unwrap(), Endianness::Little);
        assert_eq!(detect_segy([0, 0, 0, 0]).unwrap(), Endianness::Big);
        assert!(matches!(detect_segy([2, 1, 4, 3]), Err(SeisError::UnknownEndianness(_))));
        assert!(matches!(detect_segy([9, 9, 9, 9]), Err(SeisError::UnknownEndianness(_))));
    }

    #[test]
    fn test_detect_su() {
        let mut header = [0u8; 240];
        // ns = 10 little-endian; 3 traces of 240 + 40 bytes
        LittleEndian::write_u16(&mut header[114..116], 10);
        assert_eq!(detect_su(&header, 3 * 280, 240, 114).unwrap(), Endianness::Little);

        BigEndian::write_u16(&mut header[114..116], 10);
        assert_eq!(detect_su(&header, 3 * 280, 240, 114).unwrap(), Endianness::Big);

        assert!(detect_su(&header, 3 * 280 + 1, 240, 114).is_err());
    }

    #[test]
    fn test_read_write_symmetry() {
        let mut buf = [0u8; 8];
        for order in [Endianness::Big, Endianness::Little] {
            order.write_i32(&mut buf, -123456);
            assert_eq!(order.read_i32(&buf), -123456);
            order.write_f64(&mut buf, 2.5);
            assert_eq!(order.read_f64(&buf), 2.5);
        }
    }
}
