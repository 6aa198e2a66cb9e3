// src/sample/ibm.rs
//! IBM System/360 single precision hexadecimal floating point.
//!
//! Layout of the 32-bit word: 1 sign bit, 7-bit exponent (power of 16,
//! excess 64), 24-bit fraction with the radix point on its left. Value is
//! `(-1)^s * 0.f * 16^(e - 64)`.

const SIGN_MASK: u32 = 0x8000_0000;
const FRACTION_MASK: u32 = 0x00FF_FFFF;
const LARGEST: u32 = 0x7FFF_FFFF;

/// Convert an IBM word to `f64`. Exact: every IBM value is representable.
pub fn ibm_to_f64(word: u32) -> f64 {
    let fraction = word & FRACTION_MASK;
    if fraction == 0 {
        return 0.0;
    }
    let exponent = ((word >> 24) & 0x7F) as i32;
    let magnitude = fraction as f64 * 2f64.powi(4 * (exponent - 64) - 24);
    if word & SIGN_MASK != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Convert `f64` to the nearest IBM word.
///
/// Magnitudes beyond the IBM range saturate to the largest IBM value,
/// magnitudes below it flush to zero, NaN becomes zero.
pub fn f64_to_ibm(value: f64) -> u32 {
    if value == 0.0 || value.is_nan() {
        return 0;
    }

    let sign = if value.is_sign_negative() { SIGN_MASK } else { 0 };
    let mut magnitude = value.abs();
    if magnitude.is_infinite() {
        return sign | LARGEST;
    }

    // Normalise into [1/16, 1); scaling by 16 is exact in binary
    let mut exponent: i32 = 64;
    while magnitude >= 1.0 {
        magnitude /= 16.0;
        exponent += 1;
        if exponent > 127 {
            return sign | LARGEST;
        }
    }
    while magnitude < 0.0625 && exponent > 0 {
        magnitude *= 16.0;
        exponent -= 1;
    }

    let mut fraction = (magnitude * 16_777_216.0).round() as u32;
    if fraction > FRACTION_MASK {
        // rounding carried into a new hex digit
        fraction >>= 4;
        exponent += 1;
        if exponent > 127 {
            return sign | LARGEST;
        }
    }
    if fraction == 0 {
        return 0;
    }

    sign | ((exponent as u32) << 24) | fraction
}
