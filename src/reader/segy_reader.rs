// src/reader/segy_reader.rs
use crate::error::{Result, SeisError};
use crate::header::{
    BinaryHeader, FieldLocator, FieldMap, TextHeader, TraceHeader, BINARY_HEADER_SIZE, TEXT_HEADER_SIZE,
    TRACE_HEADER_SIZE,
};
use crate::options::ReaderOptions;
use crate::reader::streaming::{HeaderIter, TraceIter, TraceStream};
use crate::reader::{HeaderBlocks, ReadSeek};
use crate::sample::SampleReader;
use crate::trace::Trace;
use crate::types::NumericFormat;
use crate::utils::Endianness;
use std::fs::File;
use std::io::{BufReader, Read, SeekFrom};
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::Mmap;
#[cfg(feature = "mmap")]
use std::io::Cursor;

const PREAMBLE_SIZE: u64 = (TEXT_HEADER_SIZE + BINARY_HEADER_SIZE) as u64;

/// Streaming SEG-Y reader.
///
/// The text, binary and extended text headers (and trailer stanzas) are
/// parsed once on open. Traces are then read one at a time from a forward
/// cursor; [`rewind`](SegyReader::rewind) moves the cursor back to the first
/// trace.
///
/// # Example
///
/// ```no_run
/// use seisio::SegyReader;
///
/// let mut reader = SegyReader::open("line.sgy")?;
/// println!("{} samples/trace", reader.binary_header().samp_per_tr);
///
/// while let Some(trace) = reader.next_trace()? {
///     let cdp = trace.header().get_int("cdp")?;
///     println!("cdp {} has {} samples", cdp, trace.len());
/// }
/// # Ok::<(), seisio::SeisError>(())
/// ```
#[derive(Debug)]
pub struct SegyReader<R: ReadSeek> {
    file: Option<R>,
    options: ReaderOptions,
    endianness: Endianness,
    binary: BinaryHeader,
    text_headers: Vec<TextHeader>,
    trailer_stanzas: Vec<TextHeader>,
    field_map: FieldMap,

    data_start: u64,
    data_end: u64,
    header_len: usize,
    fixed_samples: Option<usize>,
    declared_traces: Option<u64>,

    cursor: u64,
    position: u64,
    synced: bool,
    io_started: bool,
    header_buf: HeaderBlocks,
    samples: SampleReader,
}

/// Constructors for standard file I/O
impl SegyReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ReaderOptions::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SeisError::FileOpen { path: path.to_path_buf(), source })?;
        log::debug!("opening SEG-Y file {}", path.display());
        let capacity = options.buffer_capacity;
        SegyReader::from_reader(BufReader::with_capacity(capacity, file), options)
    }
}

/// Constructor for memory-mapped file I/O (requires "mmap" feature)
#[cfg(feature = "mmap")]
impl SegyReader<Cursor<Mmap>> {
    pub fn open_mmap(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let open_err = |source| SeisError::FileOpen { path: path.to_path_buf(), source };
        let file = File::open(path).map_err(open_err)?;
        let mmap = unsafe { Mmap::map(&file).map_err(open_err)? };
        SegyReader::from_reader(Cursor::new(mmap), ReaderOptions::default())
    }
}

impl<R: ReadSeek> SegyReader<R> {
    /// Parse the preamble of a SEG-Y stream positioned anywhere
    pub fn from_reader(mut file: R, options: ReaderOptions) -> Result<Self> {
        let file_len = file.seek(SeekFrom::End(0)).map_err(SeisError::read)?;
        if file_len < PREAMBLE_SIZE {
            return Err(SeisError::broken(format!(
                "{} bytes is too short for a SEG-Y preamble",
                file_len
            )));
        }
        file.seek(SeekFrom::Start(0)).map_err(SeisError::read)?;

        let mut preamble = vec![0u8; PREAMBLE_SIZE as usize];
        file.read_exact(&mut preamble).map_err(SeisError::read)?;
        let (text, binary_raw) = preamble.split_at(TEXT_HEADER_SIZE);

        let endianness = match options.endianness {
            Some(forced) => forced,
            None => BinaryHeader::detect_endianness(binary_raw)?,
        };
        let binary = BinaryHeader::parse(binary_raw, endianness)?;

        let mut text_headers = vec![TextHeader::from_disk(text)?];
        read_extended_text(&mut file, &binary, &mut text_headers)?;
        let ext_count = (text_headers.len() - 1) as u64;

        let data_start = if binary.is_rev2() && binary.byte_off_of_first_tr != 0 {
            binary.byte_off_of_first_tr
        } else {
            PREAMBLE_SIZE + ext_count * TEXT_HEADER_SIZE as u64
        };

        let trailer_count = if binary.is_rev2() { binary.num_of_trailer_stanza } else { 0 };
        if trailer_count < 0 {
            log::warn!("variable trailer stanza count is not supported, ignoring trailers");
        }
        let trailer_len = trailer_count.max(0) as u64 * TEXT_HEADER_SIZE as u64;
        let data_end = file_len
            .checked_sub(trailer_len)
            .filter(|end| *end >= data_start)
            .ok_or_else(|| {
                SeisError::broken(format!(
                    "trace data at {} and {} trailer bytes exceed file size {}",
                    data_start, trailer_len, file_len
                ))
            })?;

        let mut trailer_stanzas = Vec::new();
        if trailer_len > 0 {
            file.seek(SeekFrom::Start(data_end)).map_err(SeisError::read)?;
            let mut block = vec![0u8; TEXT_HEADER_SIZE];
            for _ in 0..trailer_count {
                file.read_exact(&mut block).map_err(SeisError::read)?;
                trailer_stanzas.push(TextHeader::from_disk(&block)?);
            }
        }

        let header_len = (1 + binary.additional_trace_headers())
            .checked_mul(TRACE_HEADER_SIZE)
            .ok_or_else(|| SeisError::broken("trace header count overflows"))?;
        if data_end > data_start && header_len as u64 > data_end - data_start {
            return Err(SeisError::broken(format!(
                "{} additional trace headers do not fit the {}-byte trace area",
                binary.additional_trace_headers(),
                data_end - data_start
            )));
        }
        let fixed_samples = if binary.has_fixed_length_traces() {
            Some(binary.samples_per_trace(options.extended_fields)?)
        } else {
            None
        };

        let declared_traces = if binary.is_rev2() && binary.num_of_tr_in_file > 0 {
            Some(binary.num_of_tr_in_file)
        } else {
            match (fixed_samples, binary.sample_format()) {
                (Some(ns), Ok(format)) => {
                    let trace_len = (header_len + ns * format.size()) as u64;
                    let area = data_end - data_start;
                    if area % trace_len != 0 {
                        log::warn!("ignoring {} trailing bytes after the last whole trace", area % trace_len);
                    }
                    Some(area / trace_len)
                }
                _ => None,
            }
        };

        log::debug!(
            "SEG-Y rev {}.{}: {:?} endian, format code {}, {} extended text headers, {} trailer stanzas, traces at {}",
            binary.segy_rev_major_ver,
            binary.segy_rev_minor_ver,
            endianness,
            binary.format_code,
            ext_count,
            trailer_stanzas.len(),
            data_start
        );

        Ok(SegyReader {
            file: Some(file),
            options,
            endianness,
            binary,
            text_headers,
            trailer_stanzas,
            field_map: FieldMap::segy_standard(),
            data_start,
            data_end,
            header_len,
            fixed_samples,
            declared_traces,
            cursor: data_start,
            position: 0,
            synced: false,
            io_started: false,
            header_buf: HeaderBlocks::new(),
            samples: SampleReader::new(),
        })
    }

    /// Read the next trace with its samples.
    ///
    /// Fails with `EndOfData` once every trace has been read.
    pub fn read_trace(&mut self) -> Result<Trace> {
        let (header, ns, format) = self.read_next_header()?;
        let file = self.file.as_mut().ok_or(SeisError::SessionClosed)?;
        let samples = self.samples.read_samples(file, format, ns, self.endianness)?;
        self.advance(ns, format);
        Ok(Trace::from_parts(header, samples))
    }

    /// Read the next trace header and skip over its samples
    pub fn read_header(&mut self) -> Result<TraceHeader> {
        let (header, ns, format) = self.read_next_header()?;
        let file = self.file.as_mut().ok_or(SeisError::SessionClosed)?;
        self.samples.skip_samples(file, format, ns)?;
        self.advance(ns, format);
        Ok(header)
    }

    /// Like [`read_trace`](Self::read_trace) but `Ok(None)` at the end
    pub fn next_trace(&mut self) -> Result<Option<Trace>> {
        if self.end_of_data() {
            return Ok(None);
        }
        self.read_trace().map(Some)
    }

    /// Like [`read_header`](Self::read_header) but `Ok(None)` at the end
    pub fn next_header(&mut self) -> Result<Option<TraceHeader>> {
        if self.end_of_data() {
            return Ok(None);
        }
        self.read_header().map(Some)
    }

    /// Iterate over the remaining traces
    pub fn traces(&mut self) -> TraceIter<'_, Self> {
        TraceIter::new(self)
    }

    /// Iterate over the remaining trace headers
    pub fn headers(&mut self) -> HeaderIter<'_, Self> {
        HeaderIter::new(self)
    }

    /// Whether the cursor is past the last trace
    pub fn end_of_data(&self) -> bool {
        match self.declared_traces {
            Some(count) => self.position >= count,
            None => self.cursor >= self.data_end,
        }
    }

    /// Move the cursor back to the first trace
    pub fn rewind(&mut self) {
        self.cursor = self.data_start;
        self.position = 0;
        self.synced = false;
    }

    /// Index of the next trace to be read
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Number of traces when the file declares or implies it
    pub fn trace_count(&self) -> Option<u64> {
        self.declared_traces
    }

    /// Relocate a trace header field, or add a new one.
    ///
    /// `header_num` is 1 for the standard trace header and 2.. for the
    /// additional headers the binary header announces. Only allowed before
    /// the first trace is read.
    pub fn remap_trace_header(&mut self, name: &str, header_num: u16, offset: u16, format: NumericFormat) -> Result<()> {
        if self.io_started {
            return Err(SeisError::RemapAfterIo(name.to_string()));
        }
        let blocks = self.header_len / TRACE_HEADER_SIZE;
        if header_num as usize > blocks {
            return Err(SeisError::InvalidLocator {
                field: name.to_string(),
                reason: format!("header {} requested but traces carry {}", header_num, blocks),
            });
        }
        self.field_map.remap(name, FieldLocator::new(header_num, offset), format)
    }

    /// Release the file handle. Further trace reads fail with `SessionClosed`.
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            log::debug!("closed SEG-Y reader after {} traces", self.position);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    pub fn binary_header(&self) -> &BinaryHeader {
        &self.binary
    }

    /// The primary text header followed by the extended ones
    pub fn text_headers(&self) -> &[TextHeader] {
        &self.text_headers
    }

    pub fn trailer_stanzas(&self) -> &[TextHeader] {
        &self.trailer_stanzas
    }

    pub fn field_map(&self) -> &FieldMap {
        &self.field_map
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn read_next_header(&mut self) -> Result<(TraceHeader, usize, NumericFormat)> {
        if self.file.is_none() {
            return Err(SeisError::SessionClosed);
        }
        if self.end_of_data() {
            return Err(SeisError::EndOfData);
        }
        let format = self.binary.sample_format()?;
        self.io_started = true;

        let file = self.file.as_mut().ok_or(SeisError::SessionClosed)?;
        if !self.synced {
            file.seek(SeekFrom::Start(self.cursor)).map_err(SeisError::read)?;
        }
        self.synced = false;

        if self.cursor + self.header_len as u64 > self.data_end {
            return Err(SeisError::broken(format!(
                "trace {} header at byte {} runs past the trace data end {}",
                self.position, self.cursor, self.data_end
            )));
        }
        self.header_buf.resize(self.header_len, 0);
        file.read_exact(&mut self.header_buf).map_err(SeisError::read)?;
        let header = self.field_map.decode(&self.header_buf, self.endianness);

        let ns = match self.fixed_samples {
            Some(ns) => ns,
            None => match header.get_int("ns") {
                Ok(ns) if ns > 0 => ns as usize,
                _ => {
                    let fallback = self.binary.samples_per_trace(self.options.extended_fields)?;
                    log::warn!("trace {} has no ns, using {} from the binary header", self.position, fallback);
                    fallback
                }
            },
        };

        let trace_end = self.cursor + (self.header_len + ns * format.size()) as u64;
        if trace_end > self.data_end {
            return Err(SeisError::broken(format!(
                "trace {} ends at byte {} beyond the trace data end {}",
                self.position, trace_end, self.data_end
            )));
        }
        Ok((header, ns, format))
    }

    fn advance(&mut self, ns: usize, format: NumericFormat) {
        log::trace!("read trace {} ({} samples) at byte {}", self.position, ns, self.cursor);
        self.cursor += (self.header_len + ns * format.size()) as u64;
        self.position += 1;
        self.synced = true;
    }
}

impl<R: ReadSeek> TraceStream for SegyReader<R> {
    fn next_trace(&mut self) -> Result<Option<Trace>> {
        SegyReader::next_trace(self)
    }

    fn next_header(&mut self) -> Result<Option<TraceHeader>> {
        SegyReader::next_header(self)
    }
}

impl<R: ReadSeek> Drop for SegyReader<R> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Read extended text headers following the binary header.
///
/// A count of -1 means the headers run until a `((SEG: EndText))` stanza,
/// which is kept as the last extended header.
fn read_extended_text<R: Read>(file: &mut R, binary: &BinaryHeader, out: &mut Vec<TextHeader>) -> Result<()> {
    let declared = binary.ext_text_headers_num;
    let mut block = vec![0u8; TEXT_HEADER_SIZE];

    if declared == -1 {
        loop {
            file.read_exact(&mut block).map_err(SeisError::read)?;
            let header = TextHeader::from_disk(&block)?;
            let done = header.is_end_text();
            out.push(header);
            if done {
                return Ok(());
            }
        }
    }

    if declared < 0 {
        return Err(SeisError::broken(format!("invalid extended text header count {}", declared)));
    }
    for _ in 0..declared {
        file.read_exact(&mut block).map_err(SeisError::read)?;
        out.push(TextHeader::from_disk(&block)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::encode;
    use std::io::Cursor;

    fn build_file(binary: &BinaryHeader, e: Endianness, traces: &[(i32, Vec<f64>)]) -> Vec<u8> {
        let mut bytes = TextHeader::default().to_ebcdic();
        bytes.extend_from_slice(&binary.to_bytes(e));
        let format = binary.sample_format().unwrap();
        for (cdp, samples) in traces {
            let mut header = [0u8; TRACE_HEADER_SIZE];
            e.write_i32(&mut header[20..24], *cdp);
            e.write_u16(&mut header[114..116], samples.len() as u16);
            bytes.extend_from_slice(&header);
            bytes.extend_from_slice(&encode(samples, format, e));
        }
        bytes
    }

    fn rev0_binary(ns: i16) -> BinaryHeader {
        BinaryHeader {
            segy_rev_major_ver: 0,
            samp_per_tr: ns,
            format_code: 5,
            endianness: 0,
            ..BinaryHeader::default()
        }
    }

    #[test]
    fn test_fixed_length_file() {
        let binary = rev0_binary(4);
        let data = build_file(&binary, Endianness::Big, &[(1, vec![1.0, 2.0, 3.0, 4.0]), (2, vec![5.0; 4])]);
        let mut reader = SegyReader::from_reader(Cursor::new(data), ReaderOptions::default()).unwrap();

        assert_eq!(reader.endianness(), Endianness::Big);
        assert_eq!(reader.trace_count(), Some(2));
        let first = reader.read_trace().unwrap();
        assert_eq!(first.samples(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(first.header().get_int("cdp").unwrap(), 1);
        assert!(!reader.end_of_data());
        reader.read_trace().unwrap();
        assert!(reader.end_of_data());
        assert!(matches!(reader.read_trace(), Err(SeisError::EndOfData)));
    }

    #[test]
    fn test_variable_length_uses_trace_ns() {
        let binary = BinaryHeader { samp_per_tr: 2, ..BinaryHeader::default() };
        let data = build_file(&binary, Endianness::Little, &[(7, vec![1.0, 2.0, 3.0]), (8, vec![4.0])]);
        let mut reader = SegyReader::from_reader(Cursor::new(data), ReaderOptions::default()).unwrap();

        assert_eq!(reader.endianness(), Endianness::Little);
        assert_eq!(reader.trace_count(), None);
        assert_eq!(reader.read_trace().unwrap().len(), 3);
        assert_eq!(reader.read_header().unwrap().get_int("cdp").unwrap(), 8);
        assert!(reader.end_of_data());
        assert!(reader.next_trace().unwrap().is_none());
    }

    #[test]
    fn test_remap_rules() {
        let data = build_file(&rev0_binary(1), Endianness::Big, &[(3, vec![0.0])]);
        let mut reader = SegyReader::from_reader(Cursor::new(data), ReaderOptions::default()).unwrap();

        assert!(matches!(
            reader.remap_trace_header("extra", 2, 0, NumericFormat::I32),
            Err(SeisError::InvalidLocator { .. })
        ));
        reader.remap_trace_header("cdp_copy", 1, 20, NumericFormat::I32).unwrap();
        let header = reader.read_header().unwrap();
        assert_eq!(header.get_int("cdp_copy").unwrap(), 3);
        assert!(matches!(
            reader.remap_trace_header("late", 1, 0, NumericFormat::I8),
            Err(SeisError::RemapAfterIo(_))
        ));
    }

    #[test]
    fn test_closed_reader() {
        let data = build_file(&rev0_binary(1), Endianness::Big, &[(1, vec![0.0])]);
        let mut reader = SegyReader::from_reader(Cursor::new(data), ReaderOptions::default()).unwrap();
        reader.close();
        reader.close();
        assert!(reader.is_closed());
        assert!(matches!(reader.read_trace(), Err(SeisError::SessionClosed)));
        assert_eq!(reader.binary_header().samp_per_tr, 1);
    }

    #[test]
    fn test_oversized_additional_headers_rejected() {
        let binary = BinaryHeader {
            segy_rev_major_ver: 2,
            max_num_add_tr_headers: i32::MAX,
            num_of_tr_in_file: 1,
            ..BinaryHeader::default()
        };
        let mut data = TextHeader::default().to_ebcdic();
        data.extend_from_slice(&binary.to_bytes(Endianness::Big));
        data.extend_from_slice(&[0u8; TRACE_HEADER_SIZE]);

        let err = SegyReader::from_reader(Cursor::new(data), ReaderOptions::default()).err().unwrap();
        assert!(matches!(err, SeisError::BrokenFile(_)));
    }

    #[test]
    fn test_declared_count_beyond_data() {
        // two traces declared, one present: the second header is past the end
        let binary = BinaryHeader { segy_rev_major_ver: 2, num_of_tr_in_file: 2, ..BinaryHeader::default() };
        let data = build_file(&binary, Endianness::Big, &[(1, vec![1.0])]);
        let mut reader = SegyReader::from_reader(Cursor::new(data), ReaderOptions::default()).unwrap();
        reader.read_trace().unwrap();
        assert!(!reader.end_of_data());
        assert!(matches!(reader.read_trace(), Err(SeisError::BrokenFile(_))));
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_short_file() {
        let err = SegyReader::from_reader(Cursor::new(vec![0u8; 100]), ReaderOptions::default()).unwrap_err();
        assert!(matches!(err, SeisError::BrokenFile(_)));
    }
}
