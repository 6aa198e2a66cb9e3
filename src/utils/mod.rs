// src/utils/mod.rs
pub mod endian;
pub mod string_encoding;

pub use endian::Endianness;
pub use string_encoding::{ascii_to_ebcdic, ebcdic_to_ascii};
