// src/writer/mod.rs
mod segy_writer;
mod su_writer;

pub use segy_writer::{SegyWriter, SegyWriterBuilder};
pub use su_writer::SuWriter;
