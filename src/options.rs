// src/options.rs
use crate::utils::Endianness;

/// How rev2 wide binary header fields relate to their 16-bit predecessors.
///
/// Only consulted for files with `segy_rev_major_ver >= 2`; earlier
/// revisions always use the legacy fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtendedFieldPolicy {
    /// The extended value wins whenever it is non-zero
    #[default]
    PreferExtended,
    /// The legacy value wins whenever it is non-zero
    PreferLegacy,
}

/// Configuration for opening a reader
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Force a byte order instead of detecting it
    pub endianness: Option<Endianness>,
    pub extended_fields: ExtendedFieldPolicy,
    /// Capacity of the buffered file reader
    pub buffer_capacity: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            endianness: None,
            extended_fields: ExtendedFieldPolicy::default(),
            buffer_capacity: 65536,
        }
    }
}

impl ReaderOptions {
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = Some(endianness);
        self
    }

    pub fn with_extended_fields(mut self, policy: ExtendedFieldPolicy) -> Self {
        self.extended_fields = policy;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }
}
