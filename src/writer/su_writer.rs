// src/writer/su_writer.rs
use crate::error::{Result, SeisError};
use crate::header::{FieldLocator, FieldMap, TRACE_HEADER_SIZE};
use crate::sample::SampleBuffer;
use crate::trace::Trace;
use crate::types::NumericFormat;
use crate::utils::Endianness;
use crate::writer::segy_writer::encode_header;
use bytes::BytesMut;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Append-only Seismic Unix writer.
///
/// Samples are always IEEE f32. Files are little-endian unless created with
/// [`create_with_endianness`](SuWriter::create_with_endianness).
pub struct SuWriter<W: Write> {
    out: Option<BufWriter<W>>,
    endianness: Endianness,
    field_map: FieldMap,
    io_started: bool,
    header_buf: BytesMut,
    samples: SampleBuffer,
    traces_written: u64,
}

impl SuWriter<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::create_with_endianness(path, Endianness::Little)
    }

    pub fn create_with_endianness(path: impl AsRef<Path>, endianness: Endianness) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| SeisError::FileOpen { path: path.to_path_buf(), source })?;
        log::debug!("creating SU file {} ({:?} endian)", path.display(), endianness);
        Ok(SuWriter::from_writer(file, endianness))
    }
}

impl<W: Write> SuWriter<W> {
    pub fn from_writer(sink: W, endianness: Endianness) -> Self {
        SuWriter {
            out: Some(BufWriter::new(sink)),
            endianness,
            field_map: FieldMap::su_standard(),
            io_started: false,
            header_buf: BytesMut::with_capacity(TRACE_HEADER_SIZE),
            samples: SampleBuffer::new(NumericFormat::F32, endianness),
            traces_written: 0,
        }
    }

    /// Relocate a trace header field, or add a new one. Only allowed before
    /// the first trace is written.
    pub fn remap_trace_header(&mut self, name: &str, offset: u16, format: NumericFormat) -> Result<()> {
        if self.io_started {
            return Err(SeisError::RemapAfterIo(name.to_string()));
        }
        self.field_map.remap(name, FieldLocator::standard(offset), format)
    }

    /// Encode and append one trace; `ns` is set from the sample count and
    /// must fit 16 bits.
    pub fn write_trace(&mut self, trace: &Trace) -> Result<()> {
        let out = self.out.as_mut().ok_or(SeisError::SessionClosed)?;
        self.io_started = true;

        self.header_buf.clear();
        self.header_buf.resize(TRACE_HEADER_SIZE, 0);
        encode_header(&self.field_map, trace.header(), trace.len(), &mut self.header_buf, self.endianness)?;
        self.samples.clear();
        self.samples.write_slice(trace.samples());

        out.write_all(&self.header_buf).map_err(SeisError::FileWrite)?;
        out.write_all(self.samples.as_bytes()).map_err(SeisError::FileWrite)?;
        log::trace!("wrote SU trace {} ({} samples)", self.traces_written, trace.len());
        self.traces_written += 1;
        Ok(())
    }

    /// Flush and release the file. Calling it again does nothing.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut out) = self.out.take() {
            out.flush().map_err(SeisError::FileWrite)?;
            log::debug!("closed SU writer after {} traces", self.traces_written);
        }
        Ok(())
    }

    /// Close and hand back the underlying sink
    pub fn finish(mut self) -> Result<W> {
        let out = self.out.take().ok_or(SeisError::SessionClosed)?;
        out.into_inner().map_err(|e| SeisError::FileWrite(e.into_error()))
    }

    pub fn is_closed(&self) -> bool {
        self.out.is_none()
    }

    pub fn traces_written(&self) -> u64 {
        self.traces_written
    }

    pub fn field_map(&self) -> &FieldMap {
        &self.field_map
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }
}

impl<W: Write> Drop for SuWriter<W> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::TraceHeader;

    #[test]
    fn test_layout() {
        let mut writer = SuWriter::from_writer(Vec::new(), Endianness::Little);
        let mut trace = Trace::from_parts(TraceHeader::new(), vec![1.0, -1.0]);
        trace.header_mut().set_int("tracl", 5);
        trace.header_mut().set_real("d1", 0.004);
        writer.write_trace(&trace).unwrap();
        let bytes = writer.finish().unwrap();

        assert_eq!(bytes.len(), TRACE_HEADER_SIZE + 8);
        assert_eq!(&bytes[0..4], &5i32.to_le_bytes());
        assert_eq!(&bytes[114..116], &2u16.to_le_bytes());
        assert_eq!(&bytes[180..184], &0.004f32.to_le_bytes());
        assert_eq!(&bytes[240..244], &1.0f32.to_le_bytes());
    }

    #[test]
    fn test_ns_must_fit_u16() {
        let mut writer = SuWriter::from_writer(Vec::new(), Endianness::Big);
        let err = writer.write_trace(&Trace::new(70_000)).unwrap_err();
        assert!(matches!(err, SeisError::ValueOutOfRange { field, .. } if field == "ns"));
        assert_eq!(writer.finish().unwrap().len(), 0);
    }

    #[test]
    fn test_remap_locked_after_write() {
        let mut writer = SuWriter::from_writer(Vec::new(), Endianness::Big);
        writer.remap_trace_header("fold", 232, NumericFormat::I32).unwrap();
        let mut trace = Trace::new(1);
        trace.header_mut().set_int("fold", 12);
        writer.write_trace(&trace).unwrap();
        assert!(matches!(
            writer.remap_trace_header("late", 0, NumericFormat::I8),
            Err(SeisError::RemapAfterIo(_))
        ));
        let bytes = writer.finish().unwrap();
        assert_eq!(&bytes[232..236], &12i32.to_be_bytes());
    }
}
