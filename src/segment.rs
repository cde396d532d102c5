//! Data codeword encoder.
//!
//! Packs the payload into the fixed-length codeword stream for the selected
//! version: mode indicator, character count, payload bits per mode,
//! terminator, byte alignment, and the alternating `0xEC 0x11` pad bytes.

use crate::ecc;
use crate::types::{EcLevel, Mode, Version, ALPHANUMERIC_CHARSET};

/// An append-only bit sequence, most significant bit first within each byte.
pub(crate) struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            length: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    /// Appends the `len` low bits of `val`, most significant first.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 31 && (val >> len) == 0);
        for i in (0..len).rev() {
            let bit = ((val >> i) as u8) & 1;
            let shift = 7 - ((self.length as u8) & 7);
            if shift == 7 {
                self.data.push(bit << shift);
            } else {
                *self.data.last_mut().unwrap() |= bit << shift;
            }
            self.length += 1;
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Encodes the payload into the exact data codeword count for
/// `(version, level)`.
///
/// The caller must have chosen `version` via
/// [`select_version`](crate::select_version); a payload that does not fit is
/// an internal invariant violation here, not a user-facing error.
///
/// # Panics
///
/// Panics if the payload contains characters outside the chosen mode's
/// character set, or if the bitstream overruns the table capacity.
pub(crate) fn build_codewords(
    payload: &[u8],
    mode: Mode,
    version: Version,
    level: EcLevel,
) -> Vec<u8> {
    let capacity_bits = ecc::data_codeword_count(version, level) * 8;
    let mut bb = BitBuffer::new();
    bb.append_bits(mode.indicator(), 4);
    bb.append_bits(payload.len() as u32, mode.char_count_bits(version));
    match mode {
        Mode::Numeric => append_numeric(&mut bb, payload),
        Mode::Alphanumeric => append_alphanumeric(&mut bb, payload),
        Mode::Byte => {
            for &b in payload {
                bb.append_bits(b.into(), 8);
            }
        }
    }
    assert!(bb.len() <= capacity_bits, "payload overruns table capacity");

    // Add terminator and pad up to a byte if applicable
    let numzerobits = 4.min(capacity_bits - bb.len());
    bb.append_bits(0, numzerobits as u8);
    let numzerobits = bb.len().wrapping_neg() & 7;
    bb.append_bits(0, numzerobits as u8);
    debug_assert_eq!(bb.len() % 8, 0);

    // Pad with alternating bytes until data capacity is reached
    for &padbyte in [0xec, 0x11].iter().cycle() {
        if bb.len() >= capacity_bits {
            break;
        }
        bb.append_bits(padbyte, 8);
    }
    debug_assert_eq!(bb.len(), capacity_bits);
    bb.into_bytes()
}

/// Digits in groups of 3 become 10 bits; 2 or 1 leftover digits become
/// 7 or 4 bits.
fn append_numeric(bb: &mut BitBuffer, payload: &[u8]) {
    let mut accumdata: u32 = 0;
    let mut accumcount: u8 = 0;
    for &b in payload {
        assert!(b.is_ascii_digit(), "payload contains non-numeric characters");
        accumdata = accumdata * 10 + u32::from(b - b'0');
        accumcount += 1;
        if accumcount == 3 {
            bb.append_bits(accumdata, 10);
            accumdata = 0;
            accumcount = 0;
        }
    }
    if accumcount > 0 {
        bb.append_bits(accumdata, accumcount * 3 + 1);
    }
}

/// Character pairs become 11 bits over the 45-symbol alphabet; a lone
/// trailing character becomes 6 bits.
fn append_alphanumeric(bb: &mut BitBuffer, payload: &[u8]) {
    let mut accumdata: u32 = 0;
    let mut accumcount: u8 = 0;
    for &b in payload {
        let i = ALPHANUMERIC_CHARSET
            .bytes()
            .position(|c| c == b)
            .expect("payload contains unencodable characters in alphanumeric mode");
        accumdata = accumdata * 45 + i as u32;
        accumcount += 1;
        if accumcount == 2 {
            bb.append_bits(accumdata, 11);
            accumdata = 0;
            accumcount = 0;
        }
    }
    if accumcount > 0 {
        bb.append_bits(accumdata, 6);
    }
}
