// src/types.rs
use std::fmt;

/// Numeric representation of a trace header field or a sample.
///
/// The discriminants are the format numbers used by `remap_trace_header`
/// callers and are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NumericFormat {
    I8 = 0,
    U8 = 1,
    I16 = 2,
    U16 = 3,
    I32 = 4,
    U32 = 5,
    I64 = 6,
    U64 = 7,
    F32 = 8,
    F64 = 9,
    /// IBM System/360 single precision hexadecimal float (excess-64 exponent).
    B64 = 10,
}

impl NumericFormat {
    pub const IBM: NumericFormat = NumericFormat::B64;

    /// Size of one value in bytes
    pub fn size(&self) -> usize {
        match self {
            NumericFormat::I8 | NumericFormat::U8 => 1,
            NumericFormat::I16 | NumericFormat::U16 => 2,
            NumericFormat::I32 | NumericFormat::U32 | NumericFormat::F32 | NumericFormat::B64 => 4,
            NumericFormat::I64 | NumericFormat::U64 | NumericFormat::F64 => 8,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(NumericFormat::I8),
            1 => Some(NumericFormat::U8),
            2 => Some(NumericFormat::I16),
            3 => Some(NumericFormat::U16),
            4 => Some(NumericFormat::I32),
            5 => Some(NumericFormat::U32),
            6 => Some(NumericFormat::I64),
            7 => Some(NumericFormat::U64),
            8 => Some(NumericFormat::F32),
            9 => Some(NumericFormat::F64),
            10 => Some(NumericFormat::B64),
            _ => None,
        }
    }

    /// Map a SEG-Y binary header data sample format code.
    ///
    /// Codes 4 (fixed point with gain), 7 and 15 (24-bit integers) are
    /// recognised by the standard but not supported here.
    pub fn from_segy_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(NumericFormat::B64),
            2 => Some(NumericFormat::I32),
            3 => Some(NumericFormat::I16),
            5 => Some(NumericFormat::F32),
            6 => Some(NumericFormat::F64),
            8 => Some(NumericFormat::I8),
            9 => Some(NumericFormat::I64),
            10 => Some(NumericFormat::U32),
            11 => Some(NumericFormat::U16),
            12 => Some(NumericFormat::U64),
            16 => Some(NumericFormat::U8),
            _ => None,
        }
    }

    /// The SEG-Y data sample format code for this format
    pub fn segy_code(&self) -> i16 {
        match self {
            NumericFormat::B64 => 1,
            NumericFormat::I32 => 2,
            NumericFormat::I16 => 3,
            NumericFormat::F32 => 5,
            NumericFormat::F64 => 6,
            NumericFormat::I8 => 8,
            NumericFormat::I64 => 9,
            NumericFormat::U32 => 10,
            NumericFormat::U16 => 11,
            NumericFormat::U64 => 12,
            NumericFormat::U8 => 16,
        }
    }

    pub fn is_integer(&self) -> bool {
        !self.is_real()
    }

    pub fn is_real(&self) -> bool {
        matches!(self, NumericFormat::F32 | NumericFormat::F64 | NumericFormat::B64)
    }

    /// Inclusive range of integer values a field of this format can hold.
    ///
    /// `U64` is capped at `i64::MAX` because header values travel as `i64`.
    pub fn int_range(&self) -> Option<(i64, i64)> {
        match self {
            NumericFormat::I8 => Some((i8::MIN as i64, i8::MAX as i64)),
            NumericFormat::U8 => Some((0, u8::MAX as i64)),
            NumericFormat::I16 => Some((i16::MIN as i64, i16::MAX as i64)),
            NumericFormat::U16 => Some((0, u16::MAX as i64)),
            NumericFormat::I32 => Some((i32::MIN as i64, i32::MAX as i64)),
            NumericFormat::U32 => Some((0, u32::MAX as i64)),
            NumericFormat::I64 => Some((i64::MIN, i64::MAX)),
            NumericFormat::U64 => Some((0, i64::MAX)),
            NumericFormat::F32 | NumericFormat::F64 | NumericFormat::B64 => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NumericFormat::I8 => "i8",
            NumericFormat::U8 => "u8",
            NumericFormat::I16 => "i16",
            NumericFormat::U16 => "u16",
            NumericFormat::I32 => "i32",
            NumericFormat::U32 => "u32",
            NumericFormat::I64 => "i64",
            NumericFormat::U64 => "u64",
            NumericFormat::F32 => "f32",
            NumericFormat::F64 => "f64",
            NumericFormat::B64 => "ibm32",
        }
    }
}

impl fmt::Display for NumericFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded trace header value.
///
/// Integer-format fields always decode to `Int`, float-format fields to
/// `Real`; the variant is never inferred from the magnitude of the value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeaderValue {
    Int(i64),
    Real(f64),
}

impl HeaderValue {
    pub fn is_int(&self) -> bool {
        matches!(self, HeaderValue::Int(_))
    }

    pub fn is_real(&self) -> bool {
        matches!(self, HeaderValue::Real(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(v) => Some(*v),
            HeaderValue::Real(_) => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            HeaderValue::Real(v) => Some(*v),
            HeaderValue::Int(_) => None,
        }
    }

    /// Numeric value regardless of variant
    pub fn to_f64(&self) -> f64 {
        match self {
            HeaderValue::Int(v) => *v as f64,
            HeaderValue::Real(v) => *v,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HeaderValue::Int(_) => "integer",
            HeaderValue::Real(_) => "real",
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Int(v) => write!(f, "{}", v),
            HeaderValue::Real(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for HeaderValue {
    fn from(v: i64) -> Self {
        HeaderValue::Int(v)
    }
}

impl From<i32> for HeaderValue {
    fn from(v: i32) -> Self {
        HeaderValue::Int(v as i64)
    }
}

impl From<i16> for HeaderValue {
    fn from(v: i16) -> Self {
        HeaderValue::Int(v as i64)
    }
}

impl From<u16> for HeaderValue {
    fn from(v: u16) -> Self {
        HeaderValue::Int(v as i64)
    }
}

impl From<f64> for HeaderValue {
    fn from(v: f64) -> Self {
        HeaderValue::Real(v)
    }
}

impl From<f32> for HeaderValue {
    fn from(v: f32) -> Self {
        HeaderValue::Real(v as f64)
    }
}
