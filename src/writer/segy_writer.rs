// src/writer/segy_writer.rs
use crate::error::{Result, SeisError};
use crate::header::{
    BinaryHeader, FieldLocator, FieldMap, TextHeader, TraceHeader, BINARY_HEADER_SIZE, TEXT_HEADER_SIZE,
    TRACE_HEADER_SIZE,
};
use crate::options::ExtendedFieldPolicy;
use crate::sample::SampleBuffer;
use crate::trace::Trace;
use crate::types::NumericFormat;
use crate::utils::endian::SEGY_ENDIAN_MARKER;
use crate::utils::Endianness;
use bytes::BytesMut;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Collects everything that goes into a SEG-Y preamble before the file is
/// created.
///
/// # Example
///
/// ```no_run
/// use seisio::{BinaryHeader, NumericFormat, SegyWriter, TextHeader, Trace};
///
/// let mut writer = SegyWriter::builder()
///     .text_header(TextHeader::from_lines(["C 1 CLIENT: ACME", "C 2 LINE: 1001"]))
///     .binary_header(BinaryHeader { samp_int: 2000, samp_per_tr: 500, ..BinaryHeader::default() })
///     .remap_trace_header("shot_id", 1, 232, NumericFormat::I64)
///     .create("line.sgy")?;
///
/// let mut trace = Trace::new(500);
/// trace.header_mut().set_int("cdp", 1);
/// trace.header_mut().set_int("shot_id", 42);
/// writer.write_trace(&trace)?;
/// writer.close()?;
/// # Ok::<(), seisio::SeisError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SegyWriterBuilder {
    text_header: Option<TextHeader>,
    binary_header: Option<BinaryHeader>,
    endianness: Option<Endianness>,
    ext_text_headers: Vec<TextHeader>,
    trailer_stanzas: Vec<TextHeader>,
    remaps: Vec<(String, FieldLocator, NumericFormat)>,
}

impl SegyWriterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text_header(mut self, header: TextHeader) -> Self {
        self.text_header = Some(header);
        self
    }

    /// The binary header to write. `endianness`, `ext_text_headers_num` and
    /// `num_of_trailer_stanza` are overwritten to match the file.
    pub fn binary_header(mut self, header: BinaryHeader) -> Self {
        self.binary_header = Some(header);
        self
    }

    /// Byte order of the file, big-endian unless set
    pub fn endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = Some(endianness);
        self
    }

    pub fn add_ext_text_header(mut self, header: TextHeader) -> Self {
        self.ext_text_headers.push(header);
        self
    }

    /// Append a trailer stanza written after the last trace. Trailer
    /// stanzas make the file SEG-Y rev2.
    pub fn add_trailer_stanza(mut self, stanza: TextHeader) -> Self {
        self.trailer_stanzas.push(stanza);
        self
    }

    /// Relocate a trace header field, or add a new one. Checked on create.
    pub fn remap_trace_header(mut self, name: &str, header_num: u16, offset: u16, format: NumericFormat) -> Self {
        self.remaps.push((name.to_string(), FieldLocator::new(header_num, offset), format));
        self
    }

    /// Create the file and write the preamble
    pub fn create(self, path: impl AsRef<Path>) -> Result<SegyWriter<File>> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| SeisError::FileOpen { path: path.to_path_buf(), source })?;
        log::debug!("creating SEG-Y file {}", path.display());
        self.build(file)
    }

    /// Write the preamble to an arbitrary sink
    pub fn build<W: Write>(self, sink: W) -> Result<SegyWriter<W>> {
        let endianness = self.endianness.unwrap_or(Endianness::Big);
        let mut binary = self.binary_header.unwrap_or_default();
        binary.endianness = SEGY_ENDIAN_MARKER as i32;
        binary.ext_text_headers_num = i16::try_from(self.ext_text_headers.len())
            .map_err(|_| SeisError::broken("too many extended text headers"))?;
        binary.num_of_trailer_stanza = i32::try_from(self.trailer_stanzas.len())
            .map_err(|_| SeisError::broken("too many trailer stanzas"))?;
        if !self.trailer_stanzas.is_empty() && !binary.is_rev2() {
            log::debug!("trailer stanzas require SEG-Y rev2, upgrading from rev {}", binary.segy_rev_major_ver);
            binary.segy_rev_major_ver = 2;
            binary.segy_rev_minor_ver = 0;
        }

        let format = binary.sample_format()?;
        let fixed_samples = if binary.has_fixed_length_traces() {
            Some(binary.samples_per_trace(ExtendedFieldPolicy::PreferExtended)?)
        } else {
            None
        };
        // A variable-length trace with ns 0 reads back with the binary
        // header's samples per trace, so it must be 0 under either policy
        let empty_traces_allowed = [ExtendedFieldPolicy::PreferExtended, ExtendedFieldPolicy::PreferLegacy]
            .iter()
            .all(|policy| matches!(binary.samples_per_trace(*policy), Ok(0)));

        // header numbers are u16
        if binary.additional_trace_headers() >= u16::MAX as usize {
            return Err(SeisError::broken(format!(
                "{} additional trace headers per trace",
                binary.additional_trace_headers()
            )));
        }
        let header_len = (1 + binary.additional_trace_headers()) * TRACE_HEADER_SIZE;
        let mut field_map = FieldMap::segy_standard();
        for (name, locator, format) in &self.remaps {
            if locator.header as usize * TRACE_HEADER_SIZE > header_len {
                return Err(SeisError::InvalidLocator {
                    field: name.clone(),
                    reason: format!(
                        "header {} requested but traces carry {}",
                        locator.header,
                        header_len / TRACE_HEADER_SIZE
                    ),
                });
            }
            field_map.remap(name, *locator, *format)?;
        }

        let mut out = BufWriter::new(sink);
        let text = self.text_header.unwrap_or_default();
        let mut written = (TEXT_HEADER_SIZE + BINARY_HEADER_SIZE) as u64;
        out.write_all(&text.to_ebcdic()).map_err(SeisError::FileWrite)?;
        out.write_all(&binary.to_bytes(endianness)).map_err(SeisError::FileWrite)?;
        for ext in &self.ext_text_headers {
            out.write_all(&ext.to_ebcdic()).map_err(SeisError::FileWrite)?;
            written += TEXT_HEADER_SIZE as u64;
        }

        if binary.is_rev2() && binary.byte_off_of_first_tr != 0 {
            let gap = binary.byte_off_of_first_tr.checked_sub(written).ok_or_else(|| {
                SeisError::broken(format!(
                    "first trace offset {} overlaps the {}-byte preamble",
                    binary.byte_off_of_first_tr, written
                ))
            })?;
            std::io::copy(&mut std::io::repeat(0).take(gap), &mut out).map_err(SeisError::FileWrite)?;
        }

        log::debug!(
            "SEG-Y preamble written: rev {}, {:?} endian, {}, {} extended text headers",
            binary.segy_rev_major_ver,
            endianness,
            format,
            self.ext_text_headers.len()
        );

        Ok(SegyWriter {
            out: Some(out),
            endianness,
            binary,
            field_map,
            format,
            fixed_samples,
            header_len,
            empty_traces_allowed,
            trailer_stanzas: self.trailer_stanzas,
            header_buf: BytesMut::new(),
            samples: SampleBuffer::new(format, endianness),
            traces_written: 0,
        })
    }
}

/// Append-only SEG-Y writer.
///
/// Each trace is encoded completely in memory before it is written, so a
/// trace rejected for a bad header value leaves the file as it was. Trailer
/// stanzas are appended by [`close`](SegyWriter::close), which also runs on
/// drop.
pub struct SegyWriter<W: Write> {
    out: Option<BufWriter<W>>,
    endianness: Endianness,
    binary: BinaryHeader,
    field_map: FieldMap,
    format: NumericFormat,
    fixed_samples: Option<usize>,
    header_len: usize,
    empty_traces_allowed: bool,
    trailer_stanzas: Vec<TextHeader>,
    header_buf: BytesMut,
    samples: SampleBuffer,
    traces_written: u64,
}

impl SegyWriter<File> {
    pub fn builder() -> SegyWriterBuilder {
        SegyWriterBuilder::new()
    }

    /// Create a file with the default preamble
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        SegyWriterBuilder::new().create(path)
    }
}

impl<W: Write> SegyWriter<W> {
    /// Encode and append one trace.
    ///
    /// `ns` is set from the sample count. In fixed-length files a count too
    /// large for the `ns` field is stored as 0; readers take it from the
    /// binary header. Every header field must exist in the field map and
    /// fit its format.
    pub fn write_trace(&mut self, trace: &Trace) -> Result<()> {
        let out = self.out.as_mut().ok_or(SeisError::SessionClosed)?;
        let ns = trace.len();
        let ns_field = match self.fixed_samples {
            Some(fixed) if ns != fixed => {
                return Err(SeisError::broken(format!(
                    "trace has {} samples but the file declares {} per trace",
                    ns, fixed
                )));
            }
            Some(_) if !ns_fits(&self.field_map, ns) => 0,
            Some(_) => ns,
            None if ns == 0 && !self.empty_traces_allowed => {
                return Err(SeisError::broken(
                    "an empty trace would read back with the binary header's samples per trace",
                ));
            }
            None => ns,
        };

        self.header_buf.clear();
        self.header_buf.resize(self.header_len, 0);
        encode_header(&self.field_map, trace.header(), ns_field, &mut self.header_buf, self.endianness)?;
        self.samples.clear();
        self.samples.write_slice(trace.samples());

        out.write_all(&self.header_buf).map_err(SeisError::FileWrite)?;
        out.write_all(self.samples.as_bytes()).map_err(SeisError::FileWrite)?;
        log::trace!("wrote trace {} ({} samples)", self.traces_written, ns);
        self.traces_written += 1;
        Ok(())
    }

    /// Write one trace per header/samples pair
    pub fn write_traces<'a>(&mut self, traces: impl IntoIterator<Item = &'a Trace>) -> Result<()> {
        for trace in traces {
            self.write_trace(trace)?;
        }
        Ok(())
    }

    /// Append trailer stanzas, flush and release the file. Calling it again
    /// does nothing.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut out) = self.out.take() {
            finish_stream(&mut out, &self.trailer_stanzas)?;
            log::debug!("closed SEG-Y writer after {} traces", self.traces_written);
        }
        Ok(())
    }

    /// Close and hand back the underlying sink
    pub fn finish(mut self) -> Result<W> {
        let mut out = self.out.take().ok_or(SeisError::SessionClosed)?;
        finish_stream(&mut out, &self.trailer_stanzas)?;
        out.into_inner().map_err(|e| SeisError::FileWrite(e.into_error()))
    }

    pub fn is_closed(&self) -> bool {
        self.out.is_none()
    }

    pub fn traces_written(&self) -> u64 {
        self.traces_written
    }

    /// The binary header as written to the file
    pub fn binary_header(&self) -> &BinaryHeader {
        &self.binary
    }

    pub fn field_map(&self) -> &FieldMap {
        &self.field_map
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }
}

impl<W: Write> Drop for SegyWriter<W> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn ns_fits(field_map: &FieldMap, ns: usize) -> bool {
    match field_map.get("ns").and_then(|spec| spec.format.int_range()) {
        Some((_, max)) => i64::try_from(ns).map_or(false, |ns| ns <= max),
        None => false,
    }
}

fn finish_stream<W: Write>(out: &mut BufWriter<W>, trailers: &[TextHeader]) -> Result<()> {
    for stanza in trailers {
        out.write_all(&stanza.to_ebcdic()).map_err(SeisError::FileWrite)?;
    }
    out.flush().map_err(SeisError::FileWrite)
}

/// Encode a trace header plus its sample count into the zeroed blocks at the
/// front of `buf`
pub(crate) fn encode_header(
    field_map: &FieldMap,
    header: &TraceHeader,
    ns: usize,
    buf: &mut [u8],
    endianness: Endianness,
) -> Result<()> {
    field_map.encode(header, buf, endianness)?;
    let mut count = TraceHeader::new();
    count.set_int("ns", ns as i64);
    field_map.encode(&count, buf, endianness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReaderOptions;
    use crate::reader::SegyReader;
    use std::io::Cursor;

    fn trace(cdp: i64, samples: Vec<f64>) -> Trace {
        let mut trace = Trace::from_parts(TraceHeader::new(), samples);
        trace.header_mut().set_int("cdp", cdp);
        trace
    }

    #[test]
    fn test_default_preamble() {
        let writer = SegyWriterBuilder::new().build(Vec::new()).unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes.len(), 3600);
        assert_eq!(bytes[0], 0xC3);
        assert_eq!(&bytes[3200 + 96..3200 + 100], &[1, 2, 3, 4]);
        assert_eq!(&bytes[3200 + 24..3200 + 26], &[0, 5]);
    }

    #[test]
    fn test_roundtrip_with_trailers() {
        let writer = SegyWriterBuilder::new()
            .endianness(Endianness::Little)
            .add_ext_text_header(TextHeader::from_lines(["C41 EXTENDED"]))
            .add_trailer_stanza(TextHeader::from_lines(["TRAILER ONE"]))
            .build(Vec::new())
            .unwrap();
        let mut writer = writer;
        writer.write_trace(&trace(1, vec![1.0, 2.0])).unwrap();
        writer.write_trace(&trace(2, vec![3.0, 4.0, 5.0])).unwrap();
        assert_eq!(writer.binary_header().segy_rev_major_ver, 2);
        let bytes = writer.finish().unwrap();

        let mut reader = SegyReader::from_reader(Cursor::new(bytes), ReaderOptions::default()).unwrap();
        assert_eq!(reader.endianness(), Endianness::Little);
        assert_eq!(reader.text_headers().len(), 2);
        assert_eq!(reader.trailer_stanzas()[0].lines().next().unwrap(), "TRAILER ONE");
        let first = reader.read_trace().unwrap();
        assert_eq!(first.samples(), &[1.0, 2.0]);
        assert_eq!(first.header().get_int("ns").unwrap(), 2);
        let second = reader.read_trace().unwrap();
        assert_eq!(second.header().get_int("cdp").unwrap(), 2);
        assert!(reader.end_of_data());
    }

    #[test]
    fn test_rejected_trace_leaves_stream_intact() {
        let mut writer = SegyWriterBuilder::new().build(Vec::new()).unwrap();
        writer.write_trace(&trace(1, vec![1.0])).unwrap();

        let mut bad = trace(2, vec![2.0]);
        bad.header_mut().set_real("cdp", 2.0);
        assert!(matches!(writer.write_trace(&bad), Err(SeisError::TypeMismatch { .. })));
        assert_eq!(writer.traces_written(), 1);

        let bytes = writer.finish().unwrap();
        assert_eq!(bytes.len(), 3600 + 240 + 4);
    }

    #[test]
    fn test_fixed_length_enforced() {
        let binary = BinaryHeader { fixed_tr_length: 1, samp_per_tr: 3, ..BinaryHeader::default() };
        let mut writer = SegyWriterBuilder::new().binary_header(binary).build(Vec::new()).unwrap();
        assert!(matches!(writer.write_trace(&Trace::new(2)), Err(SeisError::BrokenFile(_))));
        writer.write_trace(&Trace::new(3)).unwrap();
    }

    #[test]
    fn test_long_fixed_length_traces() {
        let binary = BinaryHeader {
            segy_rev_major_ver: 2,
            fixed_tr_length: 1,
            ext_samp_per_tr: 70_000,
            ..BinaryHeader::default()
        };
        let mut writer = SegyWriterBuilder::new().binary_header(binary).build(Vec::new()).unwrap();
        let samples: Vec<f64> = (0..70_000).map(|i| (i % 1000) as f64).collect();
        writer.write_trace(&Trace::from_parts(TraceHeader::new(), samples.clone())).unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes.len(), 3600 + 240 + 70_000 * 4);

        let mut reader = SegyReader::from_reader(Cursor::new(bytes), ReaderOptions::default()).unwrap();
        assert_eq!(reader.trace_count(), Some(1));
        let trace = reader.read_trace().unwrap();
        assert_eq!(trace.header().get_int("ns").unwrap(), 0);
        assert_eq!(trace.samples(), samples.as_slice());
    }

    #[test]
    fn test_empty_trace_rules() {
        // samples per trace in the binary header would be read for ns 0
        let binary = BinaryHeader { samp_per_tr: 500, ..BinaryHeader::default() };
        let mut writer = SegyWriterBuilder::new().binary_header(binary).build(Vec::new()).unwrap();
        assert!(matches!(writer.write_trace(&Trace::new(0)), Err(SeisError::BrokenFile(_))));
        writer.write_trace(&trace(1, vec![1.0, 2.0, 3.0])).unwrap();
        let bytes = writer.finish().unwrap();
        let mut reader = SegyReader::from_reader(Cursor::new(bytes), ReaderOptions::default()).unwrap();
        assert_eq!(reader.read_trace().unwrap().samples(), &[1.0, 2.0, 3.0]);
        assert!(reader.end_of_data());

        // default header: samples per trace is 0, so empty traces round trip
        let mut writer = SegyWriterBuilder::new().build(Vec::new()).unwrap();
        writer.write_trace(&Trace::new(0)).unwrap();
        writer.write_trace(&trace(2, vec![4.0])).unwrap();
        let bytes = writer.finish().unwrap();
        let mut reader = SegyReader::from_reader(Cursor::new(bytes), ReaderOptions::default()).unwrap();
        assert!(reader.read_trace().unwrap().is_empty());
        assert_eq!(reader.read_trace().unwrap().samples(), &[4.0]);
        assert!(reader.end_of_data());
    }

    #[test]
    fn test_absurd_additional_header_count() {
        let binary = BinaryHeader { segy_rev_major_ver: 2, max_num_add_tr_headers: i32::MAX, ..BinaryHeader::default() };
        let result = SegyWriterBuilder::new().binary_header(binary).build(Vec::new());
        assert!(matches!(result, Err(SeisError::BrokenFile(_))));
    }

    #[test]
    fn test_remap_beyond_trace_headers() {
        let result = SegyWriterBuilder::new()
            .remap_trace_header("extra", 2, 0, NumericFormat::I32)
            .build(Vec::new());
        assert!(matches!(result, Err(SeisError::InvalidLocator { .. })));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut writer = SegyWriterBuilder::new().build(Vec::new()).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(matches!(writer.write_trace(&Trace::new(1)), Err(SeisError::SessionClosed)));
    }
}
