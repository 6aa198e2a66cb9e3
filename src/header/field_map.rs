// src/header/field_map.rs
use crate::error::{Result, SeisError};
use crate::header::{TraceHeader, TRACE_HEADER_SIZE};
use crate::sample::ibm;
use crate::types::{HeaderValue, NumericFormat};
use crate::utils::Endianness;
use std::collections::HashMap;
use std::sync::Arc;

/// Physical position of a trace header field.
///
/// `header` is the 1-based number of the 240-byte block within the trace
/// (1 is the standard header, 2.. are SEG-Y rev2 additional headers) and
/// `offset` is the zero-based byte offset inside that block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldLocator {
    pub header: u16,
    pub offset: u16,
}

impl FieldLocator {
    pub fn new(header: u16, offset: u16) -> Self {
        FieldLocator { header, offset }
    }

    /// A location inside the standard trace header
    pub fn standard(offset: u16) -> Self {
        FieldLocator { header: 1, offset }
    }

    /// Byte position of the field within the concatenated header blocks
    pub fn position(&self) -> usize {
        (self.header as usize - 1) * TRACE_HEADER_SIZE + self.offset as usize
    }
}

/// Name, location and numeric format of one trace header field
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderFieldSpec {
    pub name: Arc<str>,
    pub locator: FieldLocator,
    pub format: NumericFormat,
}

impl HeaderFieldSpec {
    fn validate(name: &str, locator: FieldLocator, format: NumericFormat) -> Result<()> {
        if locator.header == 0 {
            return Err(SeisError::InvalidLocator {
                field: name.to_string(),
                reason: "header numbers start at 1".to_string(),
            });
        }
        if locator.offset as usize + format.size() > TRACE_HEADER_SIZE {
            return Err(SeisError::InvalidLocator {
                field: name.to_string(),
                reason: format!(
                    "{} at offset {} does not fit a {}-byte header",
                    format, locator.offset, TRACE_HEADER_SIZE
                ),
            });
        }
        Ok(())
    }
}

use NumericFormat::{F32, I16, I32, U16};

const COMMON_FIELDS: &[(&str, u16, NumericFormat)] = &[
    ("tracl", 0, I32),
    ("tracr", 4, I32),
    ("fldr", 8, I32),
    ("tracf", 12, I32),
    ("ep", 16, I32),
    ("cdp", 20, I32),
    ("cdpt", 24, I32),
    ("trid", 28, I16),
    ("nvs", 30, I16),
    ("nhs", 32, I16),
    ("duse", 34, I16),
    ("offset", 36, I32),
    ("gelev", 40, I32),
    ("selev", 44, I32),
    ("sdepth", 48, I32),
    ("gdel", 52, I32),
    ("sdel", 56, I32),
    ("swdep", 60, I32),
    ("gwdep", 64, I32),
    ("scalel", 68, I16),
    ("scalco", 70, I16),
    ("sx", 72, I32),
    ("sy", 76, I32),
    ("gx", 80, I32),
    ("gy", 84, I32),
    ("counit", 88, I16),
    ("wevel", 90, I16),
    ("swevel", 92, I16),
    ("sut", 94, I16),
    ("gut", 96, I16),
    ("sstat", 98, I16),
    ("gstat", 100, I16),
    ("tstat", 102, I16),
    ("laga", 104, I16),
    ("lagb", 106, I16),
    ("delrt", 108, I16),
    ("muts", 110, I16),
    ("mute", 112, I16),
    ("ns", 114, U16),
    ("dt", 116, U16),
    ("gain", 118, I16),
    ("igc", 120, I16),
    ("igi", 122, I16),
    ("corr", 124, I16),
    ("sfs", 126, I16),
    ("sfe", 128, I16),
    ("slen", 130, I16),
    ("styp", 132, I16),
    ("stas", 134, I16),
    ("stae", 136, I16),
    ("tatyp", 138, I16),
    ("afilf", 140, I16),
    ("afils", 142, I16),
    ("nofilf", 144, I16),
    ("nofils", 146, I16),
    ("lcf", 148, I16),
    ("hcf", 150, I16),
    ("lcs", 152, I16),
    ("hcs", 154, I16),
    ("year", 156, I16),
    ("day", 158, I16),
    ("hour", 160, I16),
    ("minute", 162, I16),
    ("sec", 164, I16),
    ("timbas", 166, I16),
    ("trwf", 168, I16),
    ("grnors", 170, I16),
    ("grnofr", 172, I16),
    ("grnlof", 174, I16),
    ("gaps", 176, I16),
    ("otrav", 178, I16),
];

// SEG-Y rev1 bytes 181-240
const SEGY_FIELDS: &[(&str, u16, NumericFormat)] = &[
    ("cdpx", 180, I32),
    ("cdpy", 184, I32),
    ("iline", 188, I32),
    ("xline", 192, I32),
    ("sp", 196, I32),
    ("scalsp", 200, I16),
    ("trunit", 202, I16),
    ("trans_mant", 204, I32),
    ("trans_exp", 208, I16),
    ("trans_unit", 210, I16),
    ("dev_id", 212, I16),
    ("scalt", 214, I16),
    ("src_type", 216, I16),
    ("src_dir_v", 218, I16),
    ("src_dir_x", 220, I16),
    ("src_dir_i", 222, I16),
    ("src_meas_mant", 224, I32),
    ("src_meas_exp", 228, I16),
    ("src_meas_unit", 230, I16),
];

// Seismic Unix segy.h tail
const SU_FIELDS: &[(&str, u16, NumericFormat)] = &[
    ("d1", 180, F32),
    ("f1", 184, F32),
    ("d2", 188, F32),
    ("f2", 192, F32),
    ("ungpow", 196, F32),
    ("unscale", 200, F32),
    ("ntr", 204, I32),
    ("mark", 208, I16),
    ("shortpad", 210, I16),
];

/// Layout of the trace header fields of one session.
///
/// Field order is preserved: the standard fields first, then remapped
/// newcomers in the order they were added. When two fields overlap, the one
/// later in this order wins on encode.
#[derive(Debug, Clone)]
pub struct FieldMap {
    specs: HashMap<Arc<str>, HeaderFieldSpec>,
    order: Vec<Arc<str>>,
}

impl FieldMap {
    fn from_tables(tables: &[&[(&str, u16, NumericFormat)]]) -> Self {
        let mut map = FieldMap { specs: HashMap::new(), order: Vec::new() };
        for table in tables {
            for &(name, offset, format) in table.iter() {
                map.insert(name, FieldLocator::standard(offset), format);
            }
        }
        map
    }

    /// Standard SEG-Y rev1 trace header
    pub fn segy_standard() -> Self {
        Self::from_tables(&[COMMON_FIELDS, SEGY_FIELDS])
    }

    /// Seismic Unix trace header
    pub fn su_standard() -> Self {
        Self::from_tables(&[COMMON_FIELDS, SU_FIELDS])
    }

    fn insert(&mut self, name: &str, locator: FieldLocator, format: NumericFormat) {
        if let Some(spec) = self.specs.get_mut(name) {
            spec.locator = locator;
            spec.format = format;
            return;
        }
        let name: Arc<str> = Arc::from(name);
        self.order.push(name.clone());
        self.specs.insert(name.clone(), HeaderFieldSpec { name, locator, format });
    }

    /// Move an existing field or add a new one.
    ///
    /// Fails with `InvalidLocator` when the field does not fit inside its
    /// 240-byte block or names header 0.
    pub fn remap(&mut self, name: &str, locator: FieldLocator, format: NumericFormat) -> Result<()> {
        HeaderFieldSpec::validate(name, locator, format)?;
        log::debug!("remap {} -> header {} offset {} as {}", name, locator.header, locator.offset, format);
        self.insert(name, locator, format);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&HeaderFieldSpec> {
        self.specs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderFieldSpec> + '_ {
        self.order.iter().filter_map(move |name| self.specs.get(name))
    }

    /// Highest header number any field refers to
    pub fn max_header(&self) -> u16 {
        self.specs.values().map(|spec| spec.locator.header).max().unwrap_or(1)
    }

    /// Decode every field from the concatenated header blocks of one trace.
    ///
    /// Fields located in blocks beyond the end of `raw` are left out.
    pub fn decode(&self, raw: &[u8], endianness: Endianness) -> TraceHeader {
        let mut header = TraceHeader::new();
        for spec in self.iter() {
            let start = spec.locator.position();
            let Some(bytes) = raw.get(start..start + spec.format.size()) else {
                continue;
            };
            header.insert_shared(spec.name.clone(), read_value(bytes, spec.format, endianness));
        }
        header
    }

    /// Encode `header` into the concatenated header blocks in `raw`.
    ///
    /// Every value is checked before anything is written: an unknown name
    /// fails with `UnknownField`, a value of the wrong kind with
    /// `TypeMismatch`, an integer outside the field's range with
    /// `ValueOutOfRange`. Bytes of fields absent from `header` are left as
    /// they are.
    pub fn encode(&self, header: &TraceHeader, raw: &mut [u8], endianness: Endianness) -> Result<()> {
        for (name, value) in header.iter() {
            let spec = self.get(name).ok_or_else(|| SeisError::UnknownField(name.to_string()))?;
            check_value(spec, &value)?;
            let end = spec.locator.position() + spec.format.size();
            if end > raw.len() {
                return Err(SeisError::InvalidLocator {
                    field: name.to_string(),
                    reason: format!("header {} is not part of this trace", spec.locator.header),
                });
            }
        }

        for spec in self.iter() {
            if let Ok(value) = header.get(&spec.name) {
                let start = spec.locator.position();
                write_value(&mut raw[start..start + spec.format.size()], spec.format, value, endianness);
            }
        }
        Ok(())
    }
}

fn read_value(b: &[u8], format: NumericFormat, e: Endianness) -> HeaderValue {
    match format {
        NumericFormat::I8 => HeaderValue::Int(b[0] as i8 as i64),
        NumericFormat::U8 => HeaderValue::Int(b[0] as i64),
        NumericFormat::I16 => HeaderValue::Int(e.read_i16(b) as i64),
        NumericFormat::U16 => HeaderValue::Int(e.read_u16(b) as i64),
        NumericFormat::I32 => HeaderValue::Int(e.read_i32(b) as i64),
        NumericFormat::U32 => HeaderValue::Int(e.read_u32(b) as i64),
        NumericFormat::I64 => HeaderValue::Int(e.read_i64(b)),
        NumericFormat::U64 => HeaderValue::Int(i64::try_from(e.read_u64(b)).unwrap_or(i64::MAX)),
        NumericFormat::F32 => HeaderValue::Real(e.read_f32(b) as f64),
        NumericFormat::F64 => HeaderValue::Real(e.read_f64(b)),
        NumericFormat::B64 => HeaderValue::Real(ibm::ibm_to_f64(e.read_u32(b))),
    }
}

fn check_value(spec: &HeaderFieldSpec, value: &HeaderValue) -> Result<()> {
    match (value, spec.format.int_range()) {
        (HeaderValue::Int(v), Some((min, max))) => {
            if *v < min || *v > max {
                return Err(SeisError::ValueOutOfRange {
                    field: spec.name.to_string(),
                    format: spec.format.to_string(),
                    value: v.to_string(),
                });
            }
            Ok(())
        }
        (HeaderValue::Real(_), None) => Ok(()),
        (_, range) => Err(SeisError::TypeMismatch {
            field: spec.name.to_string(),
            expected: if range.is_some() { "integer" } else { "real" }.to_string(),
            found: value.kind().to_string(),
        }),
    }
}

// Values have passed check_value, so the integer casts are exact
fn write_value(b: &mut [u8], format: NumericFormat, value: HeaderValue, e: Endianness) {
    match (format, value) {
        (NumericFormat::I8, HeaderValue::Int(v)) => b[0] = v as i8 as u8,
        (NumericFormat::U8, HeaderValue::Int(v)) => b[0] = v as u8,
        (NumericFormat::I16, HeaderValue::Int(v)) => e.write_i16(b, v as i16),
        (NumericFormat::U16, HeaderValue::Int(v)) => e.write_u16(b, v as u16),
        (NumericFormat::I32, HeaderValue::Int(v)) => e.write_i32(b, v as i32),
        (NumericFormat::U32, HeaderValue::Int(v)) => e.write_u32(b, v as u32),
        (NumericFormat::I64, HeaderValue::Int(v)) => e.write_i64(b, v),
        (NumericFormat::U64, HeaderValue::Int(v)) => e.write_u64(b, v as u64),
        (NumericFormat::F32, HeaderValue::Real(v)) => e.write_f32(b, v as f32),
        (NumericFormat::F64, HeaderValue::Real(v)) => e.write_f64(b, v),
        (NumericFormat::B64, HeaderValue::Real(v)) => e.write_u32(b, ibm::f64_to_ibm(v)),
        _ => {}
    }
}
