// src/header/text.rs
use crate::error::{Result, SeisError};
use crate::header::{END_TEXT_STANZA, TEXT_HEADER_SIZE};
use crate::utils::string_encoding::{ascii_to_ebcdic, ebcdic_to_ascii, looks_like_ebcdic};
use std::fmt;

pub const LINE_WIDTH: usize = 80;
pub const LINE_COUNT: usize = 40;

/// One 3200-byte textual header block, held as ASCII.
///
/// The content is always 7-bit ASCII: non-ASCII input characters are
/// replaced with `?` on construction.
#[derive(Clone, PartialEq, Eq)]
pub struct TextHeader {
    bytes: Box<[u8; TEXT_HEADER_SIZE]>,
}

impl TextHeader {
    /// A block of spaces
    pub fn blank() -> Self {
        TextHeader { bytes: Box::new([b' '; TEXT_HEADER_SIZE]) }
    }

    /// Build from ASCII text.
    ///
    /// Text containing newlines is laid out one input line per 80-column
    /// card (lines are padded or cut to 80 columns, at most 40 cards).
    /// Text without newlines is copied as-is. The block is space padded.
    pub fn from_ascii(text: &str) -> Self {
        let mut header = Self::blank();
        if text.contains('\n') {
            for (i, line) in text.lines().take(LINE_COUNT).enumerate() {
                let start = i * LINE_WIDTH;
                header.put(start, LINE_WIDTH, line);
            }
        } else {
            header.put(0, TEXT_HEADER_SIZE, text);
        }
        header
    }

    /// Build from up to 40 card images
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut header = Self::blank();
        for (i, line) in lines.into_iter().take(LINE_COUNT).enumerate() {
            header.put(i * LINE_WIDTH, LINE_WIDTH, line.as_ref());
        }
        header
    }

    /// Decode an EBCDIC block read from disk
    pub fn from_ebcdic(block: &[u8]) -> Result<Self> {
        check_len(block)?;
        Ok(Self::from_ascii_bytes(&ebcdic_to_ascii(block)))
    }

    /// Decode a block read from disk, guessing between EBCDIC and ASCII
    pub fn from_disk(block: &[u8]) -> Result<Self> {
        check_len(block)?;
        if looks_like_ebcdic(block) {
            Self::from_ebcdic(block)
        } else {
            log::debug!("text header stored as ASCII");
            Ok(Self::from_ascii_bytes(block))
        }
    }

    /// The stanza that terminates a variable number of extended headers
    pub fn end_text() -> Self {
        Self::from_ascii(END_TEXT_STANZA)
    }

    pub fn is_end_text(&self) -> bool {
        self.bytes.starts_with(END_TEXT_STANZA.as_bytes())
    }

    /// EBCDIC image for writing
    pub fn to_ebcdic(&self) -> Vec<u8> {
        ascii_to_ebcdic(&self.bytes[..])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..]
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..]).unwrap_or_default()
    }

    /// The 40 card images with trailing blanks removed
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.as_str()
            .as_bytes()
            .chunks(LINE_WIDTH)
            .map(|card| std::str::from_utf8(card).unwrap_or_default().trim_end())
    }

    fn from_ascii_bytes(bytes: &[u8]) -> Self {
        let mut header = Self::blank();
        for (dst, &src) in header.bytes.iter_mut().zip(bytes) {
            *dst = sanitize(src);
        }
        header
    }

    fn put(&mut self, start: usize, width: usize, text: &str) {
        let dst = &mut self.bytes[start..start + width];
        for (d, c) in dst.iter_mut().zip(text.chars()) {
            *d = if c.is_ascii() { sanitize(c as u8) } else { b'?' };
        }
    }
}

fn sanitize(b: u8) -> u8 {
    if b.is_ascii() {
        b
    } else {
        b'?'
    }
}

fn check_len(block: &[u8]) -> Result<()> {
    if block.len() != TEXT_HEADER_SIZE {
        return Err(SeisError::broken(format!(
            "text header must be {} bytes, got {}",
            TEXT_HEADER_SIZE,
            block.len()
        )));
    }
    Ok(())
}

impl Default for TextHeader {
    fn default() -> Self {
        Self::from_lines(["C 1"])
    }
}

impl fmt::Debug for TextHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.lines().filter(|l| !l.is_empty())).finish()
    }
}

impl fmt::Display for TextHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
