// src/header/binary.rs
use crate::error::{Result, SeisError};
use crate::header::BINARY_HEADER_SIZE;
use crate::options::ExtendedFieldPolicy;
use crate::sample::format_from_code;
use crate::types::NumericFormat;
use crate::utils::endian::{self, Endianness, SEGY_ENDIAN_MARKER};

/// SEG-Y binary file header (file bytes 3201-3600)
///
/// Field names follow the layout table of the format; the `ext_*` fields are
/// the rev2 wide counterparts of the legacy 16-bit counters. Use the
/// accessor methods rather than the raw fields to get revision-aware values.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryHeader {
    pub job_id: i32,
    pub line_num: i32,
    pub reel_num: i32,
    pub tr_per_ens: i16,
    pub aux_per_ens: i16,
    pub samp_int: i16,
    pub samp_int_orig: i16,
    pub samp_per_tr: i16,
    pub samp_per_tr_orig: i16,
    pub format_code: i16,
    pub ens_fold: i16,
    pub sort_code: i16,
    pub vert_sum_code: i16,
    pub sw_freq_at_start: i16,
    pub sw_freq_at_end: i16,
    pub sw_length: i16,
    pub sw_type_code: i16,
    pub sw_ch_tr_num: i16,
    pub taper_at_start: i16,
    pub taper_at_end: i16,
    pub taper_type: i16,
    pub corr_traces: i16,
    pub bin_gain_recov: i16,
    pub amp_recov_meth: i16,
    pub measure_system: i16,
    pub impulse_sig_pol: i16,
    pub vib_pol_code: i16,
    pub ext_tr_per_ens: i32,
    pub ext_aux_per_ens: i32,
    pub ext_samp_per_tr: i32,
    pub ext_samp_int: f64,
    pub ext_samp_int_orig: f64,
    pub ext_samp_per_tr_orig: i32,
    pub ext_ens_fold: i32,
    /// Byte order marker as read with the resolved byte order
    pub endianness: i32,
    pub segy_rev_major_ver: u8,
    pub segy_rev_minor_ver: u8,
    pub fixed_tr_length: i16,
    /// Number of extended text headers; -1 means "until an EndText stanza"
    pub ext_text_headers_num: i16,
    pub max_num_add_tr_headers: i32,
    pub time_basis_code: i16,
    pub num_of_tr_in_file: u64,
    pub byte_off_of_first_tr: u64,
    pub num_of_trailer_stanza: i32,
}

impl Default for BinaryHeader {
    /// Minimal rev1 header: IEEE f32 samples, variable trace length
    fn default() -> Self {
        BinaryHeader {
            job_id: 0,
            line_num: 0,
            reel_num: 0,
            tr_per_ens: 0,
            aux_per_ens: 0,
            samp_int: 0,
            samp_int_orig: 0,
            samp_per_tr: 0,
            samp_per_tr_orig: 0,
            format_code: NumericFormat::F32.segy_code(),
            ens_fold: 0,
            sort_code: 0,
            vert_sum_code: 0,
            sw_freq_at_start: 0,
            sw_freq_at_end: 0,
            sw_length: 0,
            sw_type_code: 0,
            sw_ch_tr_num: 0,
            taper_at_start: 0,
            taper_at_end: 0,
            taper_type: 0,
            corr_traces: 0,
            bin_gain_recov: 0,
            amp_recov_meth: 0,
            measure_system: 0,
            impulse_sig_pol: 0,
            vib_pol_code: 0,
            ext_tr_per_ens: 0,
            ext_aux_per_ens: 0,
            ext_samp_per_tr: 0,
            ext_samp_int: 0.0,
            ext_samp_int_orig: 0.0,
            ext_samp_per_tr_orig: 0,
            ext_ens_fold: 0,
            endianness: SEGY_ENDIAN_MARKER as i32,
            segy_rev_major_ver: 1,
            segy_rev_minor_ver: 0,
            fixed_tr_length: 0,
            ext_text_headers_num: 0,
            max_num_add_tr_headers: 0,
            time_basis_code: 0,
            num_of_tr_in_file: 0,
            byte_off_of_first_tr: 0,
            num_of_trailer_stanza: 0,
        }
    }
}

impl BinaryHeader {
    /// Resolve the byte order of a raw 400-byte binary header block
    pub fn detect_endianness(bytes: &[u8]) -> Result<Endianness> {
        check_len(bytes)?;
        endian::detect_segy([bytes[96], bytes[97], bytes[98], bytes[99]])
    }

    /// Parse a 400-byte block.
    ///
    /// The sample format code is not validated here so that headers of
    /// unsupported files can still be inspected; see [`Self::sample_format`].
    pub fn parse(bytes: &[u8], e: Endianness) -> Result<Self> {
        check_len(bytes)?;
        let b = bytes;
        let i16_at = |off: usize| e.read_i16(&b[off..off + 2]);
        let i32_at = |off: usize| e.read_i32(&b[off..off + 4]);

        Ok(BinaryHeader {
            job_id: i32_at(0),
            line_num: i32_at(4),
            reel_num: i32_at(8),
            tr_per_ens: i16_at(12),
            aux_per_ens: i16_at(14),
            samp_int: i16_at(16),
            samp_int_orig: i16_at(18),
            samp_per_tr: i16_at(20),
            samp_per_tr_orig: i16_at(22),
            format_code: i16_at(24),
            ens_fold: i16_at(26),
            sort_code: i16_at(28),
            vert_sum_code: i16_at(30),
            sw_freq_at_start: i16_at(32),
            sw_freq_at_end: i16_at(34),
            sw_length: i16_at(36),
            sw_type_code: i16_at(38),
            sw_ch_tr_num: i16_at(40),
            taper_at_start: i16_at(42),
            taper_at_end: i16_at(44),
            taper_type: i16_at(46),
            corr_traces: i16_at(48),
            bin_gain_recov: i16_at(50),
            amp_recov_meth: i16_at(52),
            measure_system: i16_at(54),
            impulse_sig_pol: i16_at(56),
            vib_pol_code: i16_at(58),
            ext_tr_per_ens: i32_at(60),
            ext_aux_per_ens: i32_at(64),
            ext_samp_per_tr: i32_at(68),
            ext_samp_int: e.read_f64(&b[72..80]),
            ext_samp_int_orig: e.read_f64(&b[80..88]),
            ext_samp_per_tr_orig: i32_at(88),
            ext_ens_fold: i32_at(92),
            endianness: i32_at(96),
            segy_rev_major_ver: b[300],
            segy_rev_minor_ver: b[301],
            fixed_tr_length: i16_at(302),
            ext_text_headers_num: i16_at(304),
            max_num_add_tr_headers: i32_at(306),
            time_basis_code: i16_at(310),
            num_of_tr_in_file: e.read_u64(&b[312..320]),
            byte_off_of_first_tr: e.read_u64(&b[320..328]),
            num_of_trailer_stanza: i32_at(328),
        })
    }

    /// Serialize to the 400-byte on-disk block; unassigned bytes are zero
    pub fn to_bytes(&self, e: Endianness) -> [u8; BINARY_HEADER_SIZE] {
        let mut b = [0u8; BINARY_HEADER_SIZE];

        let i32_fields = [
            (0, self.job_id),
            (4, self.line_num),
            (8, self.reel_num),
            (60, self.ext_tr_per_ens),
            (64, self.ext_aux_per_ens),
            (68, self.ext_samp_per_tr),
            (88, self.ext_samp_per_tr_orig),
            (92, self.ext_ens_fold),
            (96, self.endianness),
            (306, self.max_num_add_tr_headers),
            (328, self.num_of_trailer_stanza),
        ];
        for (off, v) in i32_fields {
            e.write_i32(&mut b[off..off + 4], v);
        }

        let i16_fields = [
            (12, self.tr_per_ens),
            (14, self.aux_per_ens),
            (16, self.samp_int),
            (18, self.samp_int_orig),
            (20, self.samp_per_tr),
            (22, self.samp_per_tr_orig),
            (24, self.format_code),
            (26, self.ens_fold),
            (28, self.sort_code),
            (30, self.vert_sum_code),
            (32, self.sw_freq_at_start),
            (34, self.sw_freq_at_end),
            (36, self.sw_length),
            (38, self.sw_type_code),
            (40, self.sw_ch_tr_num),
            (42, self.taper_at_start),
            (44, self.taper_at_end),
            (46, self.taper_type),
            (48, self.corr_traces),
            (50, self.bin_gain_recov),
            (52, self.amp_recov_meth),
            (54, self.measure_system),
            (56, self.impulse_sig_pol),
            (58, self.vib_pol_code),
            (302, self.fixed_tr_length),
            (304, self.ext_text_headers_num),
            (310, self.time_basis_code),
        ];
        for (off, v) in i16_fields {
            e.write_i16(&mut b[off..off + 2], v);
        }

        e.write_f64(&mut b[72..80], self.ext_samp_int);
        e.write_f64(&mut b[80..88], self.ext_samp_int_orig);
        b[300] = self.segy_rev_major_ver;
        b[301] = self.segy_rev_minor_ver;
        e.write_u64(&mut b[312..320], self.num_of_tr_in_file);
        e.write_u64(&mut b[320..328], self.byte_off_of_first_tr);

        b
    }

    /// Sample format declared by `format_code`
    pub fn sample_format(&self) -> Result<NumericFormat> {
        format_from_code(self.format_code)
    }

    pub fn is_rev2(&self) -> bool {
        self.segy_rev_major_ver >= 2
    }

    /// Whether every trace has the binary header's sample count.
    ///
    /// Rev0 files always do; later revisions say so with `fixed_tr_length`.
    pub fn has_fixed_length_traces(&self) -> bool {
        self.segy_rev_major_ver == 0 || self.fixed_tr_length == 1
    }

    /// Additional 240-byte trace headers following each standard one
    pub fn additional_trace_headers(&self) -> usize {
        if self.is_rev2() {
            self.max_num_add_tr_headers.max(0) as usize
        } else {
            0
        }
    }

    pub fn samples_per_trace(&self, policy: ExtendedFieldPolicy) -> Result<usize> {
        let n = self.pick(self.samp_per_tr as i64, self.ext_samp_per_tr as i64, policy);
        usize::try_from(n).map_err(|_| SeisError::broken(format!("negative samples per trace: {}", n)))
    }

    pub fn samples_per_trace_orig(&self, policy: ExtendedFieldPolicy) -> i64 {
        self.pick(self.samp_per_tr_orig as i64, self.ext_samp_per_tr_orig as i64, policy)
    }

    /// Sample interval in microseconds (or Hz / m per the time basis)
    pub fn sample_interval(&self, policy: ExtendedFieldPolicy) -> f64 {
        self.pick_real(self.samp_int as f64, self.ext_samp_int, policy)
    }

    pub fn sample_interval_orig(&self, policy: ExtendedFieldPolicy) -> f64 {
        self.pick_real(self.samp_int_orig as f64, self.ext_samp_int_orig, policy)
    }

    pub fn traces_per_ensemble(&self, policy: ExtendedFieldPolicy) -> i64 {
        self.pick(self.tr_per_ens as i64, self.ext_tr_per_ens as i64, policy)
    }

    pub fn aux_traces_per_ensemble(&self, policy: ExtendedFieldPolicy) -> i64 {
        self.pick(self.aux_per_ens as i64, self.ext_aux_per_ens as i64, policy)
    }

    pub fn ensemble_fold(&self, policy: ExtendedFieldPolicy) -> i64 {
        self.pick(self.ens_fold as i64, self.ext_ens_fold as i64, policy)
    }

    fn pick(&self, legacy: i64, extended: i64, policy: ExtendedFieldPolicy) -> i64 {
        if !self.is_rev2() {
            return legacy;
        }
        match policy {
            ExtendedFieldPolicy::PreferExtended if extended != 0 => extended,
            ExtendedFieldPolicy::PreferExtended => legacy,
            ExtendedFieldPolicy::PreferLegacy if legacy != 0 => legacy,
            ExtendedFieldPolicy::PreferLegacy => extended,
        }
    }

    fn pick_real(&self, legacy: f64, extended: f64, policy: ExtendedFieldPolicy) -> f64 {
        if !self.is_rev2() {
            return legacy;
        }
        match policy {
            ExtendedFieldPolicy::PreferExtended if extended != 0.0 => extended,
            ExtendedFieldPolicy::PreferExtended => legacy,
            ExtendedFieldPolicy::PreferLegacy if legacy != 0.0 => legacy,
            ExtendedFieldPolicy::PreferLegacy => extended,
        }
    }
}

fn check_len(bytes: &[u8]) -> Result<()> {
    if bytes.len() != BINARY_HEADER_SIZE {
        return Err(SeisError::broken(format!(
            "binary header must be {} bytes, got {}",
            BINARY_HEADER_SIZE,
            bytes.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> BinaryHeader {
        BinaryHeader {
            job_id: 17,
            line_num: 1001,
            samp_int: 2000,
            samp_per_tr: 1500,
            format_code: 1,
            measure_system: 1,
            ext_samp_int: 0.25,
            segy_rev_major_ver: 2,
            ext_text_headers_num: 1,
            num_of_tr_in_file: 12_345_678_901,
            num_of_trailer_stanza: 2,
            ..BinaryHeader::default()
        }
    }

    #[test]
    fn test_roundtrip_both_orders() {
        let header = sample_header();
        for e in [Endianness::Big, Endianness::Little] {
            let bytes = header.to_bytes(e);
            assert_eq!(BinaryHeader::detect_endianness(&bytes).unwrap(), e);
            assert_eq!(BinaryHeader::parse(&bytes, e).unwrap(), header);
        }
    }

    #[test]
    fn test_known_offsets() {
        let bytes = sample_header().to_bytes(Endianness::Big);
        // format code at file bytes 3225-3226
        assert_eq!(&bytes[24..26], &[0, 1]);
        // samples per trace at 3221-3222
        assert_eq!(&bytes[20..22], &1500i16.to_be_bytes());
        assert_eq!(bytes[300], 2);
        assert_eq!(&bytes[96..100], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_wrong_length_is_broken_file() {
        let err = BinaryHeader::parse(&[0u8; 399], Endianness::Big).unwrap_err();
        assert!(matches!(err, SeisError::BrokenFile(_)));
    }

    #[test]
    fn test_unsupported_format_parses() {
        let header = BinaryHeader { format_code: 4, ..BinaryHeader::default() };
        let bytes = header.to_bytes(Endianness::Big);
        let parsed = BinaryHeader::parse(&bytes, Endianness::Big).unwrap();
        assert!(matches!(parsed.sample_format(), Err(SeisError::UnsupportedFormat(4))));
    }

    #[test]
    fn test_extended_field_policy() {
        let mut header = BinaryHeader {
            samp_per_tr: 100,
            ext_samp_per_tr: 70_000,
            segy_rev_major_ver: 2,
            ..BinaryHeader::default()
        };
        assert_eq!(header.samples_per_trace(ExtendedFieldPolicy::PreferExtended).unwrap(), 70_000);
        assert_eq!(header.samples_per_trace(ExtendedFieldPolicy::PreferLegacy).unwrap(), 100);

        header.samp_per_tr = 0;
        assert_eq!(header.samples_per_trace(ExtendedFieldPolicy::PreferLegacy).unwrap(), 70_000);

        header.segy_rev_major_ver = 1;
        assert_eq!(header.samples_per_trace(ExtendedFieldPolicy::PreferExtended).unwrap(), 0);
    }

    #[test]
    fn test_negative_samples_rejected() {
        let header = BinaryHeader { samp_per_tr: -5, ..BinaryHeader::default() };
        assert!(header.samples_per_trace(ExtendedFieldPolicy::default()).is_err());
    }

    #[test]
    fn test_sample_interval_prefers_extended() {
        let header = sample_header();
        assert_eq!(header.sample_interval(ExtendedFieldPolicy::PreferExtended), 0.25);
        assert_eq!(header.sample_interval(ExtendedFieldPolicy::PreferLegacy), 2000.0);
    }
}
