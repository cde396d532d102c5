//! Request types and the capacity/version selector.
//!
//! A [`SymbolRequest`] bundles everything the pipeline needs to know about
//! one generation call. [`select_version`] is the single gate through which
//! oversized input is rejected: it scans versions 1 to 40 against the
//! table-driven data capacities before any encoding work is done.

use crate::ecc;
use crate::error::QrError;

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum EcLevel {
    /// Tolerates ~7% erroneous codewords.
    L,
    /// Tolerates ~15% erroneous codewords.
    M,
    /// Tolerates ~25% erroneous codewords.
    Q,
    /// Tolerates ~30% erroneous codewords.
    H,
}

impl EcLevel {
    /// Returns an unsigned 2-bit integer (in the range 0 to 3) used to index
    /// the block structure tables.
    pub(crate) fn ordinal(self) -> usize {
        match self {
            EcLevel::L => 0,
            EcLevel::M => 1,
            EcLevel::Q => 2,
            EcLevel::H => 3,
        }
    }

    /// Returns the 2-bit value written into the format information.
    pub(crate) fn format_bits(self) -> u8 {
        match self {
            EcLevel::L => 1,
            EcLevel::M => 0,
            EcLevel::Q => 3,
            EcLevel::H => 2,
        }
    }

    /// Approximate fraction of modules that may be damaged and still
    /// recovered, in percent. Used to size the safe logo overlay square.
    pub(crate) fn repair_percent(self) -> u32 {
        match self {
            EcLevel::L => 7,
            EcLevel::M => 15,
            EcLevel::Q => 25,
            EcLevel::H => 30,
        }
    }
}

/// A concrete data encoding mode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Numeric,
    Alphanumeric,
    Byte,
}

/// The characters representable in alphanumeric mode, in value order.
pub(crate) static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

impl Mode {
    /// The 4-bit mode indicator placed at the start of the bitstream.
    pub(crate) fn indicator(self) -> u32 {
        match self {
            Mode::Numeric => 0x1,
            Mode::Alphanumeric => 0x2,
            Mode::Byte => 0x4,
        }
    }

    /// Bit width of the character count field for the given version.
    pub(crate) fn char_count_bits(self, version: Version) -> u8 {
        let range = match version.value() {
            1..=9 => 0,
            10..=26 => 1,
            _ => 2,
        };
        match self {
            Mode::Numeric => [10, 12, 14][range],
            Mode::Alphanumeric => [9, 11, 13][range],
            Mode::Byte => [8, 16, 16][range],
        }
    }

    /// Number of payload bits produced for `count` input characters.
    pub(crate) fn payload_bits(self, count: usize) -> usize {
        match self {
            Mode::Numeric => (count / 3) * 10 + [0, 4, 7][count % 3],
            Mode::Alphanumeric => (count / 2) * 11 + (count % 2) * 6,
            Mode::Byte => count * 8,
        }
    }
}

/// A caller's choice of encoding mode, possibly deferred to inspection of
/// the payload itself.
///
/// Forcing a concrete mode is a contract that every payload byte belongs
/// to that mode's character set (decimal digits for numeric, the 45-symbol
/// alphabet for alphanumeric); encoding panics if the payload breaks it.
/// [`ModeHint::Auto`] accepts any payload.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ModeHint {
    Numeric,
    Alphanumeric,
    Byte,
    /// Pick the densest mode whose character set covers the payload.
    #[default]
    Auto,
}

impl ModeHint {
    /// Resolves the hint against the payload bytes.
    pub fn resolve(self, payload: &[u8]) -> Mode {
        match self {
            ModeHint::Numeric => Mode::Numeric,
            ModeHint::Alphanumeric => Mode::Alphanumeric,
            ModeHint::Byte => Mode::Byte,
            ModeHint::Auto => {
                if payload.iter().all(|b| b.is_ascii_digit()) {
                    Mode::Numeric
                } else if payload
                    .iter()
                    .all(|&b| ALPHANUMERIC_CHARSET.as_bytes().contains(&b))
                {
                    Mode::Alphanumeric
                } else {
                    Mode::Byte
                }
            }
        }
    }
}

/// A QR code version (1-40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40].
    pub const fn new(ver: u8) -> Self {
        assert!(1 <= ver && ver <= 40, "Version number out of range");
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length of the module grid, `17 + 4 * version`.
    pub const fn side(self) -> usize {
        (self.0 as usize) * 4 + 17
    }
}

/// One generation request: payload bytes, error correction level, and mode.
///
/// Immutable once constructed. The engine holds no state between requests,
/// so two identical requests always produce bit-identical output.
#[derive(Clone, Debug)]
pub struct SymbolRequest {
    payload: Vec<u8>,
    level: EcLevel,
    mode: ModeHint,
}

impl SymbolRequest {
    /// Builds a request. A concrete `mode` obliges the payload to stay
    /// within that mode's character set; see [`ModeHint`].
    pub fn new(payload: impl Into<Vec<u8>>, level: EcLevel, mode: ModeHint) -> Self {
        Self {
            payload: payload.into(),
            level,
            mode,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn level(&self) -> EcLevel {
        self.level
    }

    pub fn mode(&self) -> ModeHint {
        self.mode
    }
}

/// Picks the smallest version whose data capacity holds `payload_len`
/// characters in `mode` at the given error correction level.
///
/// The required bit count includes the 4-bit mode indicator and the
/// character count field, whose width itself depends on the candidate
/// version. This is the only place the pipeline can reject input; it runs
/// before any encoding work.
pub fn select_version(payload_len: usize, mode: Mode, level: EcLevel) -> Result<Version, QrError> {
    let mut required_bits = 0;
    for v in Version::MIN.value()..=Version::MAX.value() {
        let version = Version::new(v);
        let ccbits = mode.char_count_bits(version);
        let capacity_bits = ecc::data_codeword_count(version, level) * 8;
        // The count field must be able to represent the character count at all.
        if payload_len >> ccbits != 0 {
            required_bits = capacity_bits + 1;
            continue;
        }
        required_bits = 4 + usize::from(ccbits) + mode.payload_bits(payload_len);
        if required_bits <= capacity_bits {
            log::debug!(
                "selected version {v} for {payload_len} chars in {mode:?} at {level:?} \
                 ({required_bits}/{capacity_bits} bits)"
            );
            return Ok(version);
        }
    }
    Err(QrError::CapacityExceeded {
        required_bits,
        capacity_bits: ecc::data_codeword_count(Version::MAX, level) * 8,
        level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_auto_mode_by_charset() {
        assert_eq!(ModeHint::Auto.resolve(b"1234567890"), Mode::Numeric);
        assert_eq!(ModeHint::Auto.resolve(b"HELLO WORLD"), Mode::Alphanumeric);
        assert_eq!(ModeHint::Auto.resolve(b"Hello World"), Mode::Byte);
        assert_eq!(ModeHint::Byte.resolve(b"123"), Mode::Byte);
    }

    #[test]
    fn hello_alphanumeric_medium_is_version_1() {
        let v = select_version(5, Mode::Alphanumeric, EcLevel::M).unwrap();
        assert_eq!(v, Version::new(1));
    }

    #[test]
    fn selection_is_monotonic_in_length() {
        let mut last = 0u8;
        for len in 0..=1000 {
            let v = select_version(len, Mode::Byte, EcLevel::Q).unwrap();
            assert!(v.value() >= last, "version shrank at len {len}");
            last = v.value();
        }
    }

    #[test]
    fn byte_capacity_boundary_at_version_1() {
        // Version 1 at L holds 19 data codewords; byte mode overhead is
        // 4 + 8 bits, leaving room for exactly 17 payload bytes.
        assert_eq!(select_version(17, Mode::Byte, EcLevel::L).unwrap(), Version::new(1));
        assert_eq!(select_version(18, Mode::Byte, EcLevel::L).unwrap(), Version::new(2));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let err = select_version(3000, Mode::Byte, EcLevel::L).unwrap_err();
        match err {
            QrError::CapacityExceeded { level, .. } => assert_eq!(level, EcLevel::L),
        }
    }

    #[test]
    fn version_40_byte_boundary_at_low() {
        // 2956 data codewords minus 2 bytes of header (16-bit count field)
        // leaves 2953 payload bytes at the limit.
        assert_eq!(
            select_version(2953, Mode::Byte, EcLevel::L).unwrap(),
            Version::new(40)
        );
        assert!(select_version(2954, Mode::Byte, EcLevel::L).is_err());
    }
}
