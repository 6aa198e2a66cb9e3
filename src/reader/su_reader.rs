// src/reader/su_reader.rs
use crate::error::{Result, SeisError};
use crate::header::{FieldLocator, FieldMap, TraceHeader, TRACE_HEADER_SIZE};
use crate::options::ReaderOptions;
use crate::reader::streaming::{HeaderIter, TraceIter, TraceStream};
use crate::reader::{HeaderBlocks, ReadSeek};
use crate::sample::SampleReader;
use crate::trace::Trace;
use crate::types::NumericFormat;
use crate::utils::{endian, Endianness};
use std::fs::File;
use std::io::{BufReader, SeekFrom};
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::Mmap;
#[cfg(feature = "mmap")]
use std::io::Cursor;

const NS_OFFSET: usize = 114;
const SAMPLE_FORMAT: NumericFormat = NumericFormat::F32;

/// Streaming Seismic Unix reader.
///
/// SU files are bare records of a 240-byte trace header followed by `ns`
/// IEEE floats. Without a file header, the byte order is inferred from the
/// first trace unless [`ReaderOptions::endianness`] forces it.
pub struct SuReader<R: ReadSeek> {
    file: Option<R>,
    endianness: Endianness,
    field_map: FieldMap,
    file_len: u64,
    cursor: u64,
    position: u64,
    synced: bool,
    io_started: bool,
    header_buf: HeaderBlocks,
    samples: SampleReader,
}

impl SuReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ReaderOptions::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SeisError::FileOpen { path: path.to_path_buf(), source })?;
        log::debug!("opening SU file {}", path.display());
        let capacity = options.buffer_capacity;
        SuReader::from_reader(BufReader::with_capacity(capacity, file), options)
    }
}

#[cfg(feature = "mmap")]
impl SuReader<Cursor<Mmap>> {
    pub fn open_mmap(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let open_err = |source| SeisError::FileOpen { path: path.to_path_buf(), source };
        let file = File::open(path).map_err(open_err)?;
        let mmap = unsafe { Mmap::map(&file).map_err(open_err)? };
        SuReader::from_reader(Cursor::new(mmap), ReaderOptions::default())
    }
}

impl<R: ReadSeek> SuReader<R> {
    pub fn from_reader(mut file: R, options: ReaderOptions) -> Result<Self> {
        let file_len = file.seek(SeekFrom::End(0)).map_err(SeisError::read)?;
        file.seek(SeekFrom::Start(0)).map_err(SeisError::read)?;

        let endianness = match options.endianness {
            Some(forced) => forced,
            None if file_len == 0 => Endianness::native(),
            None => {
                if file_len < TRACE_HEADER_SIZE as u64 {
                    return Err(SeisError::broken(format!("{} bytes is too short for an SU trace", file_len)));
                }
                let mut first = [0u8; TRACE_HEADER_SIZE];
                file.read_exact(&mut first).map_err(SeisError::read)?;
                file.seek(SeekFrom::Start(0)).map_err(SeisError::read)?;
                endian::detect_su(&first, file_len, TRACE_HEADER_SIZE, NS_OFFSET)?
            }
        };
        log::debug!("SU file of {} bytes, {:?} endian", file_len, endianness);

        Ok(SuReader {
            file: Some(file),
            endianness,
            field_map: FieldMap::su_standard(),
            file_len,
            cursor: 0,
            position: 0,
            synced: true,
            io_started: false,
            header_buf: HeaderBlocks::new(),
            samples: SampleReader::new(),
        })
    }

    /// Read the next trace with its samples.
    ///
    /// Fails with `EndOfData` once every trace has been read.
    pub fn read_trace(&mut self) -> Result<Trace> {
        let (header, ns) = self.read_next_header()?;
        let file = self.file.as_mut().ok_or(SeisError::SessionClosed)?;
        let samples = self.samples.read_samples(file, SAMPLE_FORMAT, ns, self.endianness)?;
        self.advance(ns);
        Ok(Trace::from_parts(header, samples))
    }

    pub fn read_header(&mut self) -> Result<TraceHeader> {
        let (header, ns) = self.read_next_header()?;
        let file = self.file.as_mut().ok_or(SeisError::SessionClosed)?;
        self.samples.skip_samples(file, SAMPLE_FORMAT, ns)?;
        self.advance(ns);
        Ok(header)
    }

    pub fn next_trace(&mut self) -> Result<Option<Trace>> {
        if self.end_of_data() {
            return Ok(None);
        }
        self.read_trace().map(Some)
    }

    pub fn next_header(&mut self) -> Result<Option<TraceHeader>> {
        if self.end_of_data() {
            return Ok(None);
        }
        self.read_header().map(Some)
    }

    pub fn traces(&mut self) -> TraceIter<'_, Self> {
        TraceIter::new(self)
    }

    pub fn headers(&mut self) -> HeaderIter<'_, Self> {
        HeaderIter::new(self)
    }

    /// Whether the cursor has reached the physical end of the file
    pub fn end_of_data(&self) -> bool {
        self.cursor >= self.file_len
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.position = 0;
        self.synced = false;
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Relocate a trace header field, or add a new one. Only allowed before
    /// the first trace is read.
    pub fn remap_trace_header(&mut self, name: &str, offset: u16, format: NumericFormat) -> Result<()> {
        if self.io_started {
            return Err(SeisError::RemapAfterIo(name.to_string()));
        }
        self.field_map.remap(name, FieldLocator::standard(offset), format)
    }

    pub fn close(&mut self) {
        if self.file.take().is_some() {
            log::debug!("closed SU reader after {} traces", self.position);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    pub fn field_map(&self) -> &FieldMap {
        &self.field_map
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    fn read_next_header(&mut self) -> Result<(TraceHeader, usize)> {
        if self.file.is_none() {
            return Err(SeisError::SessionClosed);
        }
        if self.end_of_data() {
            return Err(SeisError::EndOfData);
        }
        self.io_started = true;

        let file = self.file.as_mut().ok_or(SeisError::SessionClosed)?;
        if !self.synced {
            file.seek(SeekFrom::Start(self.cursor)).map_err(SeisError::read)?;
        }
        self.synced = false;

        self.header_buf.resize(TRACE_HEADER_SIZE, 0);
        file.read_exact(&mut self.header_buf).map_err(SeisError::read)?;
        let header = self.field_map.decode(&self.header_buf, self.endianness);

        let ns = match header.get_int("ns") {
            Ok(ns) if ns >= 0 => ns as usize,
            _ => return Err(SeisError::broken(format!("trace {} has no valid ns", self.position))),
        };
        Ok((header, ns))
    }

    fn advance(&mut self, ns: usize) {
        log::trace!("read SU trace {} ({} samples) at byte {}", self.position, ns, self.cursor);
        self.cursor += (TRACE_HEADER_SIZE + ns * SAMPLE_FORMAT.size()) as u64;
        self.position += 1;
        self.synced = true;
    }
}

impl<R: ReadSeek> TraceStream for SuReader<R> {
    fn next_trace(&mut self) -> Result<Option<Trace>> {
        SuReader::next_trace(self)
    }

    fn next_header(&mut self) -> Result<Option<TraceHeader>> {
        SuReader::next_header(self)
    }
}

impl<R: ReadSeek> Drop for SuReader<R> {
    fn drop(&mut self) {
        self.close();
    }
}
