// src/sample/mod.rs
//! Sample codec: trace sample blocks to and from `f64`.
//!
//! Every supported [`NumericFormat`] decodes to double precision. 64-bit
//! integer samples beyond ±2^53 cannot be represented exactly in `f64` and
//! decode to the nearest double. Encoding to integer formats rounds to the
//! nearest integer and saturates at the format's range (NaN becomes 0).
//!
//! - [`decode`] / [`encode`] - whole-block conversions
//! - [`SampleBuffer`] - reusable encode buffer used by the writers
//! - [`SampleReader`] - reads and decodes a block from a stream
//!
//! # Example
//!
//! ```
//! use seisio::sample::{decode, encode};
//! use seisio::{Endianness, NumericFormat};
//!
//! let samples = vec![1.0, -2.5, 3.25];
//! let bytes = encode(&samples, NumericFormat::F32, Endianness::Big);
//! assert_eq!(bytes.len(), 12);
//!
//! let back = decode(&bytes, NumericFormat::F32, 3, Endianness::Big).unwrap();
//! assert_eq!(back, samples);
//! ```

mod buffer;
mod reader;
pub mod ibm;

pub use buffer::SampleBuffer;
pub use reader::SampleReader;

use crate::error::{Result, SeisError};
use crate::types::NumericFormat;
use crate::utils::Endianness;
use bytes::{BufMut, BytesMut};

/// Decode `count` samples of `format` from `raw`.
///
/// Fails with `BrokenFile` when `raw` holds fewer than `count` samples.
/// Extra trailing bytes are ignored.
pub fn decode(raw: &[u8], format: NumericFormat, count: usize, endianness: Endianness) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    decode_into(raw, format, count, endianness, &mut out)?;
    Ok(out)
}

/// Like [`decode`] but reuses `out`, which is cleared first.
pub fn decode_into(
    raw: &[u8],
    format: NumericFormat,
    count: usize,
    endianness: Endianness,
    out: &mut Vec<f64>,
) -> Result<()> {
    let size = format.size();
    let needed = count
        .checked_mul(size)
        .ok_or_else(|| SeisError::broken(format!("sample count {} overflows", count)))?;
    if raw.len() < needed {
        return Err(SeisError::broken(format!(
            "sample block truncated: need {} bytes, have {}",
            needed,
            raw.len()
        )));
    }

    out.clear();
    out.try_reserve_exact(count)
        .map_err(|_| SeisError::NoMem(count.saturating_mul(std::mem::size_of::<f64>())))?;

    let chunks = raw[..needed].chunks_exact(size);
    let e = endianness;
    match format {
        NumericFormat::I8 => out.extend(raw[..count].iter().map(|&b| b as i8 as f64)),
        NumericFormat::U8 => out.extend(raw[..count].iter().map(|&b| b as f64)),
        NumericFormat::I16 => out.extend(chunks.map(|c| e.read_i16(c) as f64)),
        NumericFormat::U16 => out.extend(chunks.map(|c| e.read_u16(c) as f64)),
        NumericFormat::I32 => out.extend(chunks.map(|c| e.read_i32(c) as f64)),
        NumericFormat::U32 => out.extend(chunks.map(|c| e.read_u32(c) as f64)),
        NumericFormat::I64 => out.extend(chunks.map(|c| e.read_i64(c) as f64)),
        NumericFormat::U64 => out.extend(chunks.map(|c| e.read_u64(c) as f64)),
        NumericFormat::F32 => out.extend(chunks.map(|c| e.read_f32(c) as f64)),
        NumericFormat::F64 if e == Endianness::native() => {
            out.extend(chunks.map(bytemuck::pod_read_unaligned::<f64>))
        }
        NumericFormat::F64 => out.extend(chunks.map(|c| e.read_f64(c))),
        NumericFormat::B64 => out.extend(chunks.map(|c| ibm::ibm_to_f64(e.read_u32(c)))),
    }
    Ok(())
}

/// Encode samples into a fresh buffer
pub fn encode(samples: &[f64], format: NumericFormat, endianness: Endianness) -> BytesMut {
    let mut out = BytesMut::with_capacity(samples.len() * format.size());
    encode_into(samples, format, endianness, &mut out);
    out
}

/// Append the encoded samples to `out`
pub fn encode_into(samples: &[f64], format: NumericFormat, endianness: Endianness, out: &mut BytesMut) {
    out.reserve(samples.len() * format.size());
    let big = endianness.is_big();

    match format {
        NumericFormat::I8 => samples.iter().for_each(|&v| out.put_i8(v.round() as i8)),
        NumericFormat::U8 => samples.iter().for_each(|&v| out.put_u8(v.round() as u8)),
        NumericFormat::I16 => samples.iter().for_each(|&v| {
            let v = v.round() as i16;
            if big { out.put_i16(v) } else { out.put_i16_le(v) }
        }),
        NumericFormat::U16 => samples.iter().for_each(|&v| {
            let v = v.round() as u16;
            if big { out.put_u16(v) } else { out.put_u16_le(v) }
        }),
        NumericFormat::I32 => samples.iter().for_each(|&v| {
            let v = v.round() as i32;
            if big { out.put_i32(v) } else { out.put_i32_le(v) }
        }),
        NumericFormat::U32 => samples.iter().for_each(|&v| {
            let v = v.round() as u32;
            if big { out.put_u32(v) } else { out.put_u32_le(v) }
        }),
        NumericFormat::I64 => samples.iter().for_each(|&v| {
            let v = v.round() as i64;
            if big { out.put_i64(v) } else { out.put_i64_le(v) }
        }),
        NumericFormat::U64 => samples.iter().for_each(|&v| {
            let v = v.round() as u64;
            if big { out.put_u64(v) } else { out.put_u64_le(v) }
        }),
        NumericFormat::F32 => samples.iter().for_each(|&v| {
            let v = v as f32;
            if big { out.put_f32(v) } else { out.put_f32_le(v) }
        }),
        NumericFormat::F64 if endianness == Endianness::native() => {
            out.extend_from_slice(bytemuck::cast_slice(samples))
        }
        NumericFormat::F64 => samples.iter().for_each(|&v| {
            if big { out.put_f64(v) } else { out.put_f64_le(v) }
        }),
        NumericFormat::B64 => samples.iter().for_each(|&v| {
            let w = ibm::f64_to_ibm(v);
            if big { out.put_u32(w) } else { out.put_u32_le(w) }
        }),
    }
}

/// Resolve a SEG-Y format code, failing with `UnsupportedFormat`
pub fn format_from_code(code: i16) -> Result<NumericFormat> {
    NumericFormat::from_segy_code(code).ok_or(SeisError::UnsupportedFormat(code))
}
